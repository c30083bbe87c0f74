use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use schemars::{JsonSchema, Schema, SchemaGenerator, json_schema};
use semver::Version;
use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::validation::{ManifestIssue, ValidationError};

/// Current supported fieldmap specification version.
pub const CURRENT_SPEC_VERSION: &str = "0.1.0";
/// Constant identifier for this spec.
pub const SPEC_IDENT: &str = "fieldmap";
/// Value written for placeholders whose cell cannot be resolved.
pub const DEFAULT_SENTINEL: &str = "N/A";

static LAYOUT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9-]{1,62}[a-z0-9]$").expect("layout id regex must compile")
});

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{\{[^{}]+\}\}$").expect("token regex must compile"));

/// Canonical layout table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[schemars(
    title = "Fieldmap layout table",
    description = "Declares which spreadsheet cell fills each `{{placeholder}}` token of a document template."
)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Identifier for this specification (must be `fieldmap`).
    pub spec: String,
    pub spec_version: SpecVersion,
    /// Human-facing metadata describing the layout.
    pub layout: LayoutMeta,
    /// How the worksheet is cut into a header and data rows.
    #[serde(default)]
    pub source: SourceSpec,
    #[serde(default, skip_serializing_if = "ExtractOptionsSpec::is_default")]
    pub options: ExtractOptionsSpec,
    /// Ordered placeholder locators.
    pub fields: Vec<FieldSpec>,
}

impl Manifest {
    /// Construct a manifest by reading YAML from any reader.
    pub fn from_yaml_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }

    /// Construct a manifest from a YAML string slice.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize this manifest to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Normalize the manifest in-place for deterministic comparison.
    ///
    /// - Fields are sorted by token.
    /// - Tags (if any) are sorted and deduplicated.
    /// - Synonym lists drop repeated names, keeping the first occurrence so
    ///   lookup order is unchanged.
    pub fn normalize(&mut self) {
        if let Some(tags) = &mut self.layout.tags {
            tags.sort();
            tags.dedup();
        }

        self.fields.sort_by(|a, b| a.token.cmp(&b.token));

        for field in &mut self.fields {
            if let ColumnSpec::AnyOf(names) = &mut field.column {
                let mut seen = HashSet::new();
                names.retain(|n| seen.insert(n.clone()));
            }
        }
    }

    /// Return a normalized copy of the manifest.
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// Sentinel configured for this layout, or [`DEFAULT_SENTINEL`].
    pub fn sentinel(&self) -> &str {
        self.options.sentinel.as_deref().unwrap_or(DEFAULT_SENTINEL)
    }

    pub fn empty_cell(&self) -> EmptyCellPolicy {
        self.options.empty_cell.unwrap_or_default()
    }

    /// `true` when any field looks its column up by header text.
    pub fn uses_column_names(&self) -> bool {
        self.fields.iter().any(|f| !matches!(f.column, ColumnSpec::Index(_)))
    }

    /// Validate the manifest and return every failed invariant at once.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.spec != SPEC_IDENT {
            issues.push(ManifestIssue::new(
                "spec",
                format!(
                    "expected spec identifier `{}`, found `{}`",
                    SPEC_IDENT, self.spec
                ),
            ));
        }

        let current_major = Version::parse(CURRENT_SPEC_VERSION)
            .map(|v| v.major)
            .unwrap_or_default();
        if self.spec_version.0.major != current_major {
            issues.push(ManifestIssue::new(
                "spec_version",
                format!(
                    "incompatible major version `{}` (expected `{}`)",
                    self.spec_version, current_major
                ),
            ));
        }

        if !LAYOUT_ID.is_match(&self.layout.id) {
            issues.push(ManifestIssue::new(
                "layout.id",
                "id must be lowercase alphanumeric with hyphens, 3-64 chars",
            ));
        }
        if self.layout.name.trim().is_empty() {
            issues.push(ManifestIssue::new("layout.name", "name must not be blank"));
        }
        if let Some(sheet) = &self.source.sheet {
            if sheet.trim().is_empty() {
                issues.push(ManifestIssue::new(
                    "source.sheet",
                    "sheet name must not be blank; omit it to use the first sheet",
                ));
            }
        }

        let csv = &self.source.csv;
        if !csv.delimiter.is_ascii() || matches!(csv.delimiter, '"' | '\n' | '\r') {
            issues.push(ManifestIssue::new(
                "source.csv.delimiter",
                format!(
                    "delimiter {:?} must be a single ASCII character other than a quote or line break",
                    csv.delimiter
                ),
            ));
        }
        if csv.dates && !csv.infer_types {
            issues.push(ManifestIssue::new(
                "source.csv.dates",
                "date parsing requires `infer_types`",
            ));
        }

        if self.fields.is_empty() {
            issues.push(ManifestIssue::new(
                "fields",
                "layout must define at least one field",
            ));
        }

        let mut seen_tokens = HashSet::new();
        for (idx, field) in self.fields.iter().enumerate() {
            let token_path = format!("fields[{idx}].token");
            if !TOKEN.is_match(&field.token) {
                issues.push(ManifestIssue::new(
                    &token_path,
                    format!(
                        "token `{}` must look like `{{{{Name}}}}` with no nested braces",
                        field.token
                    ),
                ));
            }
            if !seen_tokens.insert(field.token.as_str()) {
                issues.push(ManifestIssue::new(
                    &token_path,
                    format!("duplicate token `{}`", field.token),
                ));
            }

            let column_path = format!("fields[{idx}].column");
            match &field.column {
                ColumnSpec::Index(_) => {}
                ColumnSpec::Name(name) => check_column_name(&column_path, name, &mut issues),
                ColumnSpec::AnyOf(names) => {
                    if names.is_empty() {
                        issues.push(ManifestIssue::new(
                            &column_path,
                            "synonym list must name at least one column",
                        ));
                    }
                    for (n, name) in names.iter().enumerate() {
                        check_column_name(&format!("{column_path}[{n}]"), name, &mut issues);
                    }
                }
            }
            if !matches!(field.column, ColumnSpec::Index(_)) && self.source.header_row.is_none() {
                issues.push(ManifestIssue::new(
                    &column_path,
                    "column names require `source.header_row`",
                ));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

/// Header cells are trimmed when read, so a padded name could never match.
fn check_column_name(path: &str, name: &str, issues: &mut Vec<ManifestIssue>) {
    if name.trim().is_empty() {
        issues.push(ManifestIssue::new(path, "column name must not be blank"));
    } else if name.trim() != name {
        issues.push(ManifestIssue::new(
            path,
            format!("column name `{name}` has leading or trailing whitespace"),
        ));
    }
}

impl std::str::FromStr for Manifest {
    type Err = serde_yaml::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Manifest::from_yaml_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LayoutMeta {
    /// Lowercase, hyphenated identifier used to select the layout.
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SourceSpec {
    /// Worksheet to read. Omitted selects the first sheet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet: Option<String>,
    /// Rows dropped from the top before the header is located.
    #[serde(default)]
    pub skip_rows: usize,
    /// Header row index counted after `skip_rows`. Omitted means no header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_row: Option<usize>,
    /// Parsing options used when the spreadsheet is a CSV file.
    #[serde(default, skip_serializing_if = "CsvSpec::is_default")]
    pub csv: CsvSpec,
}

/// How a CSV source is split into cells. Ignored for workbook formats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CsvSpec {
    /// Single ASCII field separator, e.g. `;` for pt-BR exports.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Strip spaces around every field.
    #[serde(default)]
    pub trim: bool,
    /// Read numbers and booleans as typed values. `false` keeps every field as text.
    #[serde(default = "default_infer_types")]
    pub infer_types: bool,
    /// Also read ISO dates (`2023-03-01`) as dates.
    #[serde(default)]
    pub dates: bool,
}

fn default_delimiter() -> char {
    ','
}

fn default_infer_types() -> bool {
    true
}

impl Default for CsvSpec {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            trim: false,
            infer_types: default_infer_types(),
            dates: false,
        }
    }
}

impl CsvSpec {
    fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ExtractOptionsSpec {
    /// Replacement for values that cannot be resolved. Defaults to `N/A`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentinel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_cell: Option<EmptyCellPolicy>,
}

impl ExtractOptionsSpec {
    fn is_default(&self) -> bool {
        self == &Self::default()
    }
}

/// What an empty cell renders as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCellPolicy {
    /// Empty string.
    #[default]
    Blank,
    /// The layout's sentinel.
    Sentinel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Literal token including delimiters, e.g. `{{Municipio}}`.
    pub token: String,
    /// 0-based data row.
    pub row: usize,
    pub column: ColumnSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Column identifier: a 0-based index, a header name, or header synonyms
/// tried in order.
///
/// A header that looks like a number must be quoted in YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ColumnSpec {
    Index(usize),
    Name(String),
    AnyOf(Vec<String>),
}

impl fmt::Display for ColumnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSpec::Index(i) => write!(f, "#{i}"),
            ColumnSpec::Name(n) => write!(f, "`{n}`"),
            ColumnSpec::AnyOf(names) => {
                let quoted: Vec<String> = names.iter().map(|n| format!("`{n}`")).collect();
                write!(f, "any of [{}]", quoted.join(", "))
            }
        }
    }
}

/// Wrapper around semver::Version for serde compatibility.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpecVersion(pub Version);

impl SpecVersion {
    pub fn new(version: Version) -> Self {
        Self(version)
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for SpecVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for SpecVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct VersionVisitor;

        impl<'de> Visitor<'de> for VersionVisitor {
            type Value = SpecVersion;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("semantic version string (e.g. 0.1.0)")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Version::parse(v)
                    .map(SpecVersion)
                    .map_err(|err| de::Error::custom(format!("invalid spec_version: {err}")))
            }
        }

        deserializer.deserialize_str(VersionVisitor)
    }
}

impl JsonSchema for SpecVersion {
    fn schema_name() -> Cow<'static, str> {
        "SpecVersion".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": "string",
            "pattern": r"^[0-9]+\.[0-9]+\.[0-9]+(?:-[0-9A-Za-z-.]+)?(?:\+[0-9A-Za-z-.]+)?$"
        })
    }
}
