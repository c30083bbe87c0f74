use fieldmap_spec::ValidationError;
use sheetfill_workbook::IoError;
use thiserror::Error;

/// Failures that stop extraction before any value is produced.
///
/// Per-field problems (row past the end, unknown column) are not errors; they
/// resolve to the sentinel and show up in [`ExtractOutcome`](crate::ExtractOutcome).
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    InvalidLayout(#[from] ValidationError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("layout `{layout}` reads sheet `{sheet}`, which the workbook does not contain")]
    MissingSheet { layout: String, sheet: String },
    #[error("field `{token}` is unresolvable: {reason}")]
    Unresolvable { token: String, reason: String },
}
