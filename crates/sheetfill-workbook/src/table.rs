use crate::error::IoError;
use crate::traits::{SheetData, SpreadsheetReader};
use sheetfill_common::CellValue;

/// How a worksheet is cut into a header and data rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceOptions {
    /// Worksheet name. `None` selects the first sheet.
    pub sheet: Option<String>,
    /// Rows dropped from the top of the sheet before anything else.
    pub skip_rows: usize,
    /// Index of the header row, counted after `skip_rows`.
    pub header_row: Option<usize>,
    pub csv: CsvReadOptions,
}

impl SourceOptions {
    pub fn with_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.sheet = Some(sheet.into());
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = Some(header_row);
        self
    }

    pub fn with_csv(mut self, csv: CsvReadOptions) -> Self {
        self.csv = csv;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsvTrim {
    #[default]
    None,
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CsvTypeInference {
    /// Do not infer: treat all non-empty fields as text.
    Off,
    /// Infer booleans + numbers when unambiguous.
    #[default]
    Basic,
    /// Like `Basic`, plus conservative date/date-time parsing.
    BasicWithDates,
}

/// CSV parsing knobs. Workbook formats ignore them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvReadOptions {
    /// Field delimiter as a single byte. Use `b';'` for exports from pt-BR locales.
    pub delimiter: u8,
    pub trim: CsvTrim,
    pub type_inference: CsvTypeInference,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            trim: CsvTrim::None,
            type_inference: CsvTypeInference::Basic,
        }
    }
}

/// Read-only rows and columns of one worksheet.
///
/// Data rows are indexed from 0. Every row has [`TabularSource::width`] cells;
/// missing cells are [`CellValue::Empty`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabularSource {
    headers: Option<Vec<String>>,
    rows: Vec<Vec<CellValue>>,
    width: usize,
}

impl TabularSource {
    /// Build from already-split headers and rows. Short rows are padded.
    pub fn from_rows(headers: Option<Vec<String>>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = rows
            .iter()
            .map(Vec::len)
            .chain(headers.iter().map(Vec::len))
            .max()
            .unwrap_or(0);
        let rows = rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, CellValue::Empty);
                r
            })
            .collect();
        Self { headers, rows, width }
    }

    pub fn from_sheet(sheet: &SheetData, options: &SourceOptions) -> Self {
        let mut rows: Vec<Vec<CellValue>> = sheet.to_rows().into_iter().skip(options.skip_rows).collect();

        let headers = match options.header_row {
            Some(h) if h < rows.len() => {
                let data = rows.split_off(h + 1);
                let header = rows.pop().unwrap_or_default();
                rows = data;
                Some(header.iter().map(CellValue::to_header_string).collect())
            }
            Some(_h) => {
                // Header beyond the data: nothing to name, nothing below it.
                #[cfg(feature = "tracing")]
                tracing::warn!(header_row = _h, rows = rows.len(), "header row past end of sheet");
                rows.clear();
                None
            }
            None => None,
        };

        Self::from_rows(headers, rows)
    }

    /// Read the configured sheet (or the first one) and slice it.
    pub fn from_reader<R>(reader: &mut R, options: &SourceOptions) -> Result<Self, IoError>
    where
        R: SpreadsheetReader<Error = IoError>,
    {
        let sheet = match &options.sheet {
            Some(name) => name.clone(),
            None => reader.first_sheet()?.ok_or(IoError::NoSheets)?,
        };
        let data = reader.read_sheet(&sheet)?;
        Ok(Self::from_sheet(&data, options))
    }

    pub fn headers(&self) -> Option<&[String]> {
        self.headers.as_deref()
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Position of the first header exactly equal to `name`. Headers are
    /// stored trimmed, so `name` must carry no surrounding whitespace.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.as_ref()?.iter().position(|h| h == name)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row)?.get(col)
    }

    /// Column labels for display: header text, or the spreadsheet letter when
    /// there is no header or the header cell is blank.
    pub fn column_labels(&self) -> Vec<String> {
        (0..self.width)
            .map(|i| {
                self.headers
                    .as_ref()
                    .and_then(|h| h.get(i))
                    .filter(|h| !h.is_empty())
                    .cloned()
                    .unwrap_or_else(|| sheetfill_common::column_to_letters(i as u32))
            })
            .collect()
    }
}
