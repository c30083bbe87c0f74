//! Builds under every feature combination, `--no-default-features` included.

use sheetfill_workbook::{CellValue, CsvReadOptions, SheetData, SourceOptions, TabularSource};

#[test]
fn tabular_view_needs_no_backend() {
    let mut sheet = SheetData::default();
    sheet.cells.insert((1, 1), CellValue::from("Município"));
    sheet.cells.insert((2, 1), CellValue::from("Tucano"));
    sheet.dimensions = Some((2, 1));

    let options = SourceOptions::default()
        .with_header_row(0)
        .with_csv(CsvReadOptions::default());
    let table = TabularSource::from_sheet(&sheet, &options);
    assert_eq!(table.column_index("Município"), Some(0));
    assert_eq!(table.cell(0, 0), Some(&CellValue::from("Tucano")));
}
