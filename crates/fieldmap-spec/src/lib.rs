//! Fieldmap layout tables.
//!
//! A layout table says which spreadsheet cell fills each `{{placeholder}}`
//! token of a document template. Tables are YAML, versioned with `spec_version`,
//! and selected by `layout.id`.

mod manifest;
mod registry;
mod validation;

pub use manifest::{
    CURRENT_SPEC_VERSION, ColumnSpec, CsvSpec, DEFAULT_SENTINEL, EmptyCellPolicy, ExtractOptionsSpec,
    FieldSpec, LayoutMeta, Manifest, SPEC_IDENT, SourceSpec, SpecVersion,
};
pub use registry::{
    BUILTIN_LAYOUTS, LayoutError, LayoutRegistry, load_layout_path, load_layout_str,
};
pub use validation::{ManifestIssue, ValidationError};

/// JSON Schema for [`Manifest`] as a JSON value.
pub fn generate_schema_value() -> serde_json::Value {
    let schema = schemars::schema_for!(Manifest);
    serde_json::to_value(&schema).unwrap_or(serde_json::Value::Null)
}

/// Pretty-printed JSON Schema for [`Manifest`].
pub fn generate_schema_json_pretty() -> String {
    serde_json::to_string_pretty(&generate_schema_value()).unwrap_or_default()
}
