use crate::error::IoError;
use crate::traits::{SheetData, SpreadsheetReader};
use sheetfill_common::{CellErrorKind, CellValue, DateSystem};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use std::path::Path;

use calamine::{Data, Range, Reader, Sheets, open_workbook_auto_from_rs};
use quick_xml::events::Event;

/// Reader over xlsx / xlsm / xlsb / xls / ods workbooks.
///
/// The whole file is buffered in memory, so path, reader, and byte inputs all
/// share one code path and the format is sniffed from content, not extension.
pub struct CalamineAdapter {
    workbook: Sheets<Cursor<Vec<u8>>>,
    date_system: DateSystem,
}

impl CalamineAdapter {
    fn convert_value(data: &Data, date_system: DateSystem) -> CellValue {
        match data {
            Data::Empty => CellValue::Empty,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Float(f) => CellValue::Number(*f),
            Data::Int(i) => CellValue::Int(*i),
            Data::Bool(b) => CellValue::Boolean(*b),
            Data::Error(e) => {
                let kind = match e {
                    calamine::CellErrorType::Div0 => CellErrorKind::Div,
                    calamine::CellErrorType::NA => CellErrorKind::Na,
                    calamine::CellErrorType::Name => CellErrorKind::Name,
                    calamine::CellErrorType::Null => CellErrorKind::Null,
                    calamine::CellErrorType::Num => CellErrorKind::Num,
                    calamine::CellErrorType::Ref => CellErrorKind::Ref,
                    calamine::CellErrorType::GettingData => CellErrorKind::GettingData,
                    _ => CellErrorKind::Value,
                };
                CellValue::Error(kind)
            }
            Data::DateTime(dt) => CellValue::from_serial_number(dt.as_f64(), date_system),
            Data::DateTimeIso(s) => CellValue::Text(s.clone()),
            Data::DurationIso(s) => CellValue::Text(s.clone()),
        }
    }

    fn range_to_sheet(range: &Range<Data>, date_system: DateSystem) -> SheetData {
        let mut cells = BTreeMap::new();

        let (start_row, start_col) = range.start().unwrap_or_default();
        let (end_row, end_col) = range.end().unwrap_or_default();

        for (row, col, val) in range.used_cells() {
            // Calamine uses 0-based indexing relative to the range start.
            let excel_row = row as u32 + start_row + 1;
            let excel_col = col as u32 + start_col + 1;

            let value = match val {
                Data::Empty => None,
                Data::String(s) if s.is_empty() => None,
                _ => Some(Self::convert_value(val, date_system)),
            };

            if let Some(value) = value {
                cells.insert((excel_row, excel_col), value);
            }
        }

        // Anchor dimensions at A1 so row offsets in layouts stay absolute.
        let dimensions = if range.is_empty() {
            None
        } else {
            Some((end_row + 1, end_col + 1))
        };

        SheetData { cells, dimensions }
    }
}

impl SpreadsheetReader for CalamineAdapter {
    type Error = IoError;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(self.workbook.sheet_names())
    }

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        let bytes = std::fs::read(path)?;
        Self::open_bytes(bytes)
    }

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
        let date_system = detect_date_system(&data);
        let workbook = open_workbook_auto_from_rs(Cursor::new(data))
            .map_err(|e| IoError::from_backend("calamine", e))?;
        Ok(Self {
            workbook,
            date_system,
        })
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error> {
        if !self.workbook.sheet_names().iter().any(|s| s == sheet) {
            return Err(IoError::SheetNotFound(sheet.to_string()));
        }
        let range = self
            .workbook
            .worksheet_range(sheet)
            .map_err(|e| IoError::from_backend("calamine", e))?;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            sheet,
            height = range.height(),
            width = range.width(),
            "read worksheet"
        );

        Ok(Self::range_to_sheet(&range, self.date_system))
    }
}

/// Date system declared by an xlsx/xlsm `workbookPr`. Other formats, and
/// anything unreadable here, fall back to the 1900 system.
fn detect_date_system(data: &[u8]) -> DateSystem {
    let Ok(mut archive) = zip::ZipArchive::new(Cursor::new(data)) else {
        return DateSystem::Excel1900;
    };
    let mut xml = String::new();
    match archive.by_name("xl/workbook.xml") {
        Ok(mut part) => {
            if part.read_to_string(&mut xml).is_err() {
                return DateSystem::Excel1900;
            }
        }
        Err(_) => return DateSystem::Excel1900,
    }

    let mut reader = quick_xml::Reader::from_str(&xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"workbookPr" => {
                let is_1904 = e.attributes().flatten().any(|attr| {
                    attr.key.local_name().as_ref() == b"date1904"
                        && matches!(attr.value.as_ref(), b"1" | b"true")
                });
                #[cfg(feature = "tracing")]
                tracing::debug!(is_1904, "workbook date system");
                return if is_1904 {
                    DateSystem::Excel1904
                } else {
                    DateSystem::Excel1900
                };
            }
            Ok(Event::Eof) | Err(_) => return DateSystem::Excel1900,
            Ok(_) => {}
        }
    }
}
