//! Field extraction.
//!
//! Links [`fieldmap_spec::Manifest`] layouts to tabular data read by
//! `sheetfill-workbook` and produces the [`PlaceholderMap`] a document template
//! is filled from. Extraction never fails per field: anything unresolvable
//! becomes the layout's sentinel.

mod binding;
mod context;
mod error;
mod extract;
mod runtime;

pub use binding::{ColumnRef, FieldBinding, LayoutBindings, Locator};
pub use context::LayoutContext;
pub use error::ExtractError;
pub use extract::{
    EmptyCell, ExtractOptions, ExtractOutcome, FieldOutcome, FieldStatus, SentinelReason, extract,
    extract_with_outcome, resolve_column,
};
pub use runtime::LayoutRuntime;
pub use sheetfill_common::PlaceholderMap;
