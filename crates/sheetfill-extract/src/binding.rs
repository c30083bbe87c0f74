use crate::error::ExtractError;
use crate::extract::{EmptyCell, ExtractOptions};
use fieldmap_spec::{ColumnSpec, CsvSpec, EmptyCellPolicy, FieldSpec, Manifest};
use sheetfill_workbook::{CsvReadOptions, CsvTrim, CsvTypeInference, SourceOptions};
use std::fmt;

/// Column half of a [`Locator`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// 0-based position.
    Index(usize),
    /// Exact header text.
    Name(String),
    /// Header synonyms, first present wins.
    AnyOf(Vec<String>),
}

impl ColumnRef {
    pub fn uses_header(&self) -> bool {
        !matches!(self, ColumnRef::Index(_))
    }
}

impl From<&ColumnSpec> for ColumnRef {
    fn from(spec: &ColumnSpec) -> Self {
        match spec {
            ColumnSpec::Index(i) => ColumnRef::Index(*i),
            ColumnSpec::Name(n) => ColumnRef::Name(n.clone()),
            ColumnSpec::AnyOf(names) => ColumnRef::AnyOf(names.clone()),
        }
    }
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{i}"),
            ColumnRef::Name(n) => write!(f, "`{n}`"),
            ColumnRef::AnyOf(names) => write!(f, "any of {names:?}"),
        }
    }
}

/// One cell address: data row plus column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    pub row: usize,
    pub column: ColumnRef,
}

impl Locator {
    pub fn new(row: usize, column: impl Into<ColumnRef>) -> Self {
        Self {
            row,
            column: column.into(),
        }
    }
}

/// A placeholder token bound to its locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding {
    pub index: usize,
    pub token: String,
    pub description: Option<String>,
    pub locator: Locator,
}

impl FieldBinding {
    pub fn new(token: impl Into<String>, row: usize, column: impl Into<ColumnRef>) -> Self {
        Self {
            index: 0,
            token: token.into(),
            description: None,
            locator: Locator::new(row, column),
        }
    }

    fn bind(index: usize, field: &FieldSpec) -> Self {
        Self {
            index,
            token: field.token.clone(),
            description: field.description.clone(),
            locator: Locator {
                row: field.row,
                column: ColumnRef::from(&field.column),
            },
        }
    }
}

/// Validated layout along with pre-resolved field bindings.
#[derive(Debug, Clone)]
pub struct LayoutBindings {
    manifest: Manifest,
    source: SourceOptions,
    options: ExtractOptions,
    bindings: Vec<FieldBinding>,
}

impl LayoutBindings {
    /// Validate and bind a layout into runtime-friendly structures.
    pub fn new(manifest: Manifest) -> Result<Self, ExtractError> {
        manifest.validate()?;
        let bindings = manifest
            .fields
            .iter()
            .enumerate()
            .map(|(idx, field)| FieldBinding::bind(idx, field))
            .collect();
        let source = SourceOptions {
            sheet: manifest.source.sheet.clone(),
            skip_rows: manifest.source.skip_rows,
            header_row: manifest.source.header_row,
            csv: csv_options(&manifest.source.csv),
        };
        let options = ExtractOptions {
            sentinel: manifest.sentinel().to_string(),
            empty_cell: match manifest.empty_cell() {
                EmptyCellPolicy::Blank => EmptyCell::Blank,
                EmptyCellPolicy::Sentinel => EmptyCell::Sentinel,
            },
        };
        Ok(Self {
            manifest,
            source,
            options,
            bindings,
        })
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn layout_id(&self) -> &str {
        &self.manifest.layout.id
    }

    /// How the worksheet is sliced for this layout.
    pub fn source_options(&self) -> &SourceOptions {
        &self.source
    }

    pub fn extract_options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Bound fields in declaration order.
    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    pub fn get(&self, token: &str) -> Option<&FieldBinding> {
        self.bindings.iter().find(|b| b.token == token)
    }

}

/// `spec` has passed validation, so the delimiter is ASCII.
fn csv_options(spec: &CsvSpec) -> CsvReadOptions {
    CsvReadOptions {
        delimiter: u8::try_from(spec.delimiter).unwrap_or(b','),
        trim: if spec.trim { CsvTrim::All } else { CsvTrim::None },
        type_inference: match (spec.infer_types, spec.dates) {
            (false, _) => CsvTypeInference::Off,
            (true, false) => CsvTypeInference::Basic,
            (true, true) => CsvTypeInference::BasicWithDates,
        },
    }
}
