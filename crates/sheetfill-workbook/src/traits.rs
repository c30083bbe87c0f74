use sheetfill_common::CellValue;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// Sparse contents of one worksheet.
///
/// Keys are 1-based `(row, col)` pairs; only non-empty cells are stored.
#[derive(Clone, Debug, Default)]
pub struct SheetData {
    pub cells: BTreeMap<(u32, u32), CellValue>,
    /// `(rows, cols)` of the used area, anchored at `A1`.
    pub dimensions: Option<(u32, u32)>,
}

impl SheetData {
    pub fn get(&self, row: u32, col: u32) -> Option<&CellValue> {
        self.cells.get(&(row, col))
    }

    /// Dense rows in sheet order, padded with [`CellValue::Empty`].
    pub fn to_rows(&self) -> Vec<Vec<CellValue>> {
        let Some((rows, cols)) = self.dimensions else {
            return Vec::new();
        };
        let mut out = vec![vec![CellValue::Empty; cols as usize]; rows as usize];
        for (&(r, c), v) in &self.cells {
            if r == 0 || c == 0 || r > rows || c > cols {
                continue;
            }
            out[(r - 1) as usize][(c - 1) as usize] = v.clone();
        }
        out
    }
}

pub trait SpreadsheetReader {
    type Error: std::error::Error + Send + Sync + 'static;

    fn sheet_names(&self) -> Result<Vec<String>, Self::Error>;

    /// Constructor variants for different environments
    fn open_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn open_reader(reader: Box<dyn Read + Send + Sync>) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn open_bytes(data: Vec<u8>) -> Result<Self, Self::Error>
    where
        Self: Sized;

    fn read_sheet(&mut self, sheet: &str) -> Result<SheetData, Self::Error>;

    /// First sheet in workbook order, if any.
    fn first_sheet(&self) -> Result<Option<String>, Self::Error> {
        Ok(self.sheet_names()?.into_iter().next())
    }
}
