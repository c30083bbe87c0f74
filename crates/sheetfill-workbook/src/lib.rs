pub mod backends;
pub mod error;
#[cfg(any(feature = "calamine", feature = "csv"))]
pub mod source;
pub mod table;
pub mod traits;

#[cfg(feature = "calamine")]
pub use backends::CalamineAdapter;
#[cfg(feature = "csv")]
pub use backends::CsvAdapter;
pub use error::IoError;
#[cfg(any(feature = "calamine", feature = "csv"))]
pub use source::{SourceFormat, WorkbookSource, open_workbook_auto, open_workbook_with};
pub use table::{CsvReadOptions, CsvTrim, CsvTypeInference, SourceOptions, TabularSource};
pub use traits::{SheetData, SpreadsheetReader};

// Re-export for convenience
pub use sheetfill_common::{CellErrorKind, CellValue};
