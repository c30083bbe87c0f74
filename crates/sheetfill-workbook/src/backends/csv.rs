use crate::error::IoError;
use crate::table::{CsvReadOptions, CsvTrim, CsvTypeInference};
use crate::traits::{SheetData, SpreadsheetReader};
use sheetfill_common::CellValue;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// CSV backend adapter.
///
/// Semantics:
/// - A CSV file is treated as a single-sheet workbook (sheet name: `Sheet1`).
/// - UTF-8 only.
/// - Every record is loaded as a plain row; header handling belongs to
///   [`SourceOptions`](crate::SourceOptions) so CSV and xlsx inputs share one layout.
pub struct CsvAdapter {
    sheet_name: String,
    cells: BTreeMap<(u32, u32), CellValue>,
    max_row: u32,
    max_col: u32,
    read_options: CsvReadOptions,
}

impl CsvAdapter {
    fn empty(read_options: CsvReadOptions) -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            cells: BTreeMap::new(),
            max_row: 0,
            max_col: 0,
            read_options,
        }
    }

    pub fn open_path_with_options<P: AsRef<Path>>(
        path: P,
        read_options: CsvReadOptions,
    ) -> Result<Self, IoError> {
        let file = File::open(path.as_ref())?;
        Self::open_reader_with_options(Box::new(BufReader::new(file)), read_options)
    }

    pub fn open_reader_with_options(
        reader: Box<dyn Read + Send + Sync>,
        read_options: CsvReadOptions,
    ) -> Result<Self, IoError> {
        let mut adapter = Self::empty(read_options);
        adapter.load(reader)?;
        Ok(adapter)
    }

    pub fn open_bytes_with_options(
        bytes: Vec<u8>,
        read_options: CsvReadOptions,
    ) -> Result<Self, IoError> {
        Self::open_reader_with_options(Box::new(std::io::Cursor::new(bytes)), read_options)
    }

    fn load(&mut self, reader: Box<dyn Read + Send + Sync>) -> Result<(), IoError> {
        let mut rb = csv::ReaderBuilder::new();
        rb.delimiter(self.read_options.delimiter)
            .has_headers(false)
            // Allow ragged rows; missing trailing cells read as empty.
            .flexible(true);

        match self.read_options.trim {
            CsvTrim::None => rb.trim(csv::Trim::None),
            CsvTrim::All => rb.trim(csv::Trim::All),
        };

        let mut rdr = rb.from_reader(reader);
        let mut row: u32 = 1;
        for rec in rdr.records() {
            let rec = rec.map_err(|e| IoError::from_backend("csv", e))?;
            self.max_row = self.max_row.max(row);
            self.max_col = self.max_col.max(rec.len() as u32);

            for (ci, field) in rec.iter().enumerate() {
                let col = (ci as u32) + 1;
                if let Some(v) = infer_field(field, self.read_options.type_inference) {
                    self.cells.insert((row, col), v);
                }
            }
            row += 1;
        }
        Ok(())
    }

    fn bounds(&self) -> Option<(u32, u32)> {
        if self.max_row == 0 || self.max_col == 0 {
            None
        } else {
            Some((self.max_row, self.max_col))
        }
    }
}

impl SpreadsheetReader for CsvAdapter {
    type Error = IoError;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error> {
        Ok(vec![self.sheet_name.clone()])
    }

    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        Self::open_path_with_options(path, CsvReadOptions::default())
    }

    fn open_reader(reader: Box<dyn Read + Send + Sync>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        Self::open_reader_with_options(reader, CsvReadOptions::default())
    }

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized,
    {
        Self::open_bytes_with_options(data, CsvReadOptions::default())
    }

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error> {
        if sheet != self.sheet_name {
            return Err(IoError::SheetNotFound(sheet.to_string()));
        }
        Ok(SheetData {
            cells: self.cells.clone(),
            dimensions: self.bounds(),
        })
    }
}

fn infer_field(field: &str, mode: CsvTypeInference) -> Option<CellValue> {
    if field.is_empty() {
        return None;
    }
    if mode == CsvTypeInference::Off {
        return Some(CellValue::Text(field.to_string()));
    }

    if let Some(b) = parse_bool(field) {
        return Some(CellValue::Boolean(b));
    }
    if let Some(i) = parse_unambiguous_i64(field) {
        return Some(CellValue::Int(i));
    }
    if let Some(n) = parse_unambiguous_f64(field) {
        return Some(CellValue::Number(n));
    }
    if mode == CsvTypeInference::BasicWithDates {
        if let Some(d) = parse_date(field) {
            return Some(CellValue::Date(d));
        }
        if let Some(dt) = parse_datetime(field) {
            return Some(CellValue::DateTime(dt));
        }
    }
    Some(CellValue::Text(field.to_string()))
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn parse_unambiguous_i64(s: &str) -> Option<i64> {
    // Conservative: reject leading zeros (except exactly "0" or "-0"). IBGE
    // municipality codes like "0123" must stay text.
    let bytes = s.as_bytes();
    if bytes.is_empty() {
        return None;
    }
    let (sign, digits) = match bytes[0] {
        b'+' => (1i64, &s[1..]),
        b'-' => (-1i64, &s[1..]),
        _ => (1i64, s),
    };
    if digits.is_empty() {
        return None;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    if !digits.as_bytes().iter().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let parsed: i64 = digits.parse().ok()?;
    Some(sign * parsed)
}

fn parse_unambiguous_f64(s: &str) -> Option<f64> {
    // Only consider float if it actually looks like one (contains '.' or exponent).
    if !(s.contains('.') || s.contains('e') || s.contains('E')) {
        return None;
    }
    let s2 = s.strip_prefix('+').unwrap_or(s);
    let s2 = s2.strip_prefix('-').unwrap_or(s2);
    if s2.len() > 1 && s2.starts_with('0') && !s2.starts_with("0.") {
        return None;
    }
    let n: f64 = s.parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    Some(n)
}

fn parse_date(s: &str) -> Option<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn parse_datetime(s: &str) -> Option<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(input: &[u8], opts: CsvReadOptions) -> SheetData {
        let mut adapter = CsvAdapter::open_bytes_with_options(input.to_vec(), opts).unwrap();
        adapter.read_sheet("Sheet1").unwrap()
    }

    #[test]
    fn infers_numbers_and_booleans() {
        let sheet = read(b"1,2,hello\n3,4.5,FALSE\n", CsvReadOptions::default());
        assert_eq!(sheet.dimensions, Some((2, 3)));
        assert_eq!(sheet.get(1, 1), Some(&CellValue::Int(1)));
        assert_eq!(sheet.get(2, 2), Some(&CellValue::Number(4.5)));
        assert_eq!(sheet.get(2, 3), Some(&CellValue::Boolean(false)));
        assert_eq!(sheet.get(1, 3), Some(&CellValue::from("hello")));
    }

    #[test]
    fn leading_zero_codes_stay_text() {
        let sheet = read(b"0123,01.5\n", CsvReadOptions::default());
        assert_eq!(sheet.get(1, 1), Some(&CellValue::from("0123")));
        assert_eq!(sheet.get(1, 2), Some(&CellValue::from("01.5")));
    }

    #[test]
    fn semicolon_delimiter_and_quotes() {
        let opts = CsvReadOptions {
            delimiter: b';',
            type_inference: CsvTypeInference::Off,
            ..CsvReadOptions::default()
        };
        let sheet = read("Município;Valor\n\"Tucano, BA\";12345\n".as_bytes(), opts);
        assert_eq!(sheet.get(1, 1), Some(&CellValue::from("Município")));
        assert_eq!(sheet.get(2, 1), Some(&CellValue::from("Tucano, BA")));
        assert_eq!(sheet.get(2, 2), Some(&CellValue::from("12345")));
    }

    #[test]
    fn ragged_rows_extend_bounds() {
        let sheet = read(b"a,b,c\n1,2\n3,4,5,6\n", CsvReadOptions::default());
        assert_eq!(sheet.dimensions, Some((3, 4)));
        assert_eq!(sheet.get(2, 3), None);
    }

    #[test]
    fn dates_only_with_date_inference() {
        let basic = read(b"2023-03-01\n", CsvReadOptions::default());
        assert_eq!(basic.get(1, 1), Some(&CellValue::from("2023-03-01")));

        let opts = CsvReadOptions {
            type_inference: CsvTypeInference::BasicWithDates,
            ..CsvReadOptions::default()
        };
        let dated = read(b"2023-03-01\n", opts);
        assert_eq!(
            dated.get(1, 1),
            Some(&CellValue::Date(chrono::NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()))
        );
    }

    #[test]
    fn trim_all_strips_whitespace() {
        let opts = CsvReadOptions {
            trim: CsvTrim::All,
            ..CsvReadOptions::default()
        };
        let sheet = read(b"  x  , 7 \n", opts);
        assert_eq!(sheet.get(1, 1), Some(&CellValue::from("x")));
        assert_eq!(sheet.get(1, 2), Some(&CellValue::Int(7)));
    }

    #[test]
    fn rejects_non_utf8() {
        let bytes = vec![0xff, b',', b'1', b'\n'];
        let err = CsvAdapter::open_bytes_with_options(bytes, CsvReadOptions::default())
            .err()
            .unwrap();
        match err {
            IoError::Backend { backend, .. } => assert_eq!(backend, "csv"),
            other => panic!("expected backend error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_sheet_is_an_error() {
        let mut adapter = CsvAdapter::open_bytes(b"a\n".to_vec()).unwrap();
        assert!(matches!(
            adapter.read_sheet("Other"),
            Err(IoError::SheetNotFound(name)) if name == "Other"
        ));
    }
}
