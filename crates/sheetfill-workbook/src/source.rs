use crate::error::IoError;
use crate::table::CsvReadOptions;
use crate::traits::{SheetData, SpreadsheetReader};
use std::io::Read;
use std::path::Path;

#[cfg(feature = "calamine")]
use crate::backends::CalamineAdapter;
#[cfg(feature = "csv")]
use crate::backends::CsvAdapter;

/// Input formats understood by [`WorkbookSource`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// Any format calamine detects from content: xlsx, xlsm, xlsb, xls, ods.
    Workbook,
    Csv,
}

impl SourceFormat {
    /// Pick a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Some(SourceFormat::Workbook),
            "csv" | "txt" => Some(SourceFormat::Csv),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// A spreadsheet opened through whichever backend fits its format.
pub enum WorkbookSource {
    #[cfg(feature = "calamine")]
    Calamine(CalamineAdapter),
    #[cfg(feature = "csv")]
    Csv(CsvAdapter),
}

impl WorkbookSource {
    pub fn format(&self) -> SourceFormat {
        match self {
            #[cfg(feature = "calamine")]
            WorkbookSource::Calamine(_) => SourceFormat::Workbook,
            #[cfg(feature = "csv")]
            WorkbookSource::Csv(_) => SourceFormat::Csv,
        }
    }

    pub fn open_bytes_as(data: Vec<u8>, format: SourceFormat) -> Result<Self, IoError> {
        Self::open_bytes_with(data, format, &CsvReadOptions::default())
    }

    /// Like [`WorkbookSource::open_bytes_as`], splitting CSV input with `csv`.
    pub fn open_bytes_with(
        data: Vec<u8>,
        format: SourceFormat,
        #[allow(unused_variables)] csv: &CsvReadOptions,
    ) -> Result<Self, IoError> {
        match format {
            #[cfg(feature = "calamine")]
            SourceFormat::Workbook => Ok(WorkbookSource::Calamine(CalamineAdapter::open_bytes(data)?)),
            #[cfg(feature = "csv")]
            SourceFormat::Csv => Ok(WorkbookSource::Csv(CsvAdapter::open_bytes_with_options(
                data,
                csv.clone(),
            )?)),
            #[allow(unreachable_patterns)]
            other => Err(IoError::Unsupported {
                feature: format!("{other:?}"),
                context: "backend not compiled in".to_string(),
            }),
        }
    }
}

/// Open a spreadsheet file, choosing the backend from its extension.
pub fn open_workbook_auto<P: AsRef<Path>>(path: P) -> Result<WorkbookSource, IoError> {
    open_workbook_with(path, &CsvReadOptions::default())
}

/// [`open_workbook_auto`] with explicit CSV parsing options.
pub fn open_workbook_with<P: AsRef<Path>>(
    path: P,
    csv: &CsvReadOptions,
) -> Result<WorkbookSource, IoError> {
    let path = path.as_ref();
    let format = SourceFormat::from_path(path).ok_or_else(|| IoError::Unsupported {
        feature: "file extension".to_string(),
        context: path.display().to_string(),
    })?;
    let bytes = std::fs::read(path)?;
    WorkbookSource::open_bytes_with(bytes, format, csv)
}

impl SpreadsheetReader for WorkbookSource {
    type Error = IoError;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        match self {
            #[cfg(feature = "calamine")]
            WorkbookSource::Calamine(a) => a.sheet_names(),
            #[cfg(feature = "csv")]
            WorkbookSource::Csv(a) => a.sheet_names(),
        }
    }

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        open_workbook_auto(path)
    }

    /// Readers carry no file name, so content is treated as a workbook.
    fn open_reader(mut reader: Box<dyn Read + Send + Sync>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::open_bytes(bytes)
    }

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        Self::open_bytes_as(data, SourceFormat::Workbook)
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error> {
        match self {
            #[cfg(feature = "calamine")]
            WorkbookSource::Calamine(a) => a.read_sheet(sheet),
            #[cfg(feature = "csv")]
            WorkbookSource::Csv(a) => a.read_sheet(sheet),
        }
    }
}
