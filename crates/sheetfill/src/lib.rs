//! Meta crate that wires the sheetfill building blocks into one pipeline:
//! read a spreadsheet, resolve a layout's fields, and fill a Word template.
//! The underlying crates stay reachable for callers that need one layer only.

mod pipeline;

pub use fieldmap_spec;
pub use sheetfill_docx as docx;
pub use sheetfill_extract as extract;
pub use sheetfill_workbook as workbook;

pub use fieldmap_spec::{LayoutError, LayoutRegistry, Manifest};
pub use pipeline::{FillError, FillResult, fill, report};
#[cfg(any(feature = "calamine", feature = "csv"))]
pub use pipeline::{fill_files, open_for_layout};
pub use sheetfill_common::PlaceholderMap;
pub use sheetfill_docx::{DOCX_MEDIA_TYPE, DocxPackage, RESULT_FILE_NAME, SubstitutionReport};
pub use sheetfill_extract::ExtractOutcome;
pub use sheetfill_workbook::{CsvReadOptions, SourceOptions};
#[cfg(any(feature = "calamine", feature = "csv"))]
pub use sheetfill_workbook::{WorkbookSource, open_workbook_auto, open_workbook_with};

