// Run with: `cargo test -p sheetfill-workbook --features calamine --test calamine`

use chrono::NaiveDate;
use sheetfill_testkit::{build_workbook, set_row, unzip_parts, zip_parts};
use sheetfill_workbook::{
    CalamineAdapter, CellValue, IoError, SourceOptions, SpreadsheetReader, TabularSource,
    WorkbookSource, open_workbook_auto,
};

#[test]
fn reads_values_with_absolute_positions() {
    let path = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        set_row(sh, 3, &["Município", "População"]);
        set_row(sh, 4, &["Tucano", "52418"]);
    });

    let mut backend = CalamineAdapter::open_path(&path).expect("open via calamine");
    let sheet = backend.read_sheet("Sheet1").expect("read sheet");

    // Rows 1-2 are empty but the used area is still anchored at A1.
    assert_eq!(sheet.dimensions, Some((4, 2)));
    assert_eq!(sheet.get(3, 1), Some(&CellValue::from("Município")));
    assert_eq!(sheet.get(4, 2).map(|v| v.to_string()), Some("52418".to_string()));
}

#[test]
fn date_serials_become_dates() {
    let path = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sh.get_cell_mut((1, 1)).set_value_number(44986.0);
        let _ = sh
            .get_style_mut("A1")
            .get_number_format_mut()
            .set_format_code(umya_spreadsheet::NumberingFormat::FORMAT_DATE_XLSX14);
    });

    let mut backend = CalamineAdapter::open_path(&path).unwrap();
    let sheet = backend.read_sheet("Sheet1").unwrap();
    match sheet.get(1, 1) {
        Some(CellValue::Date(d)) => assert_eq!(*d, NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()),
        other => panic!("expected date at A1, got {other:?}"),
    }
}

/// Re-zip an xlsx with `date1904="1"` on its `workbookPr`.
fn as_1904(xlsx: &[u8]) -> Vec<u8> {
    let parts: Vec<(String, Vec<u8>)> = unzip_parts(xlsx)
        .into_iter()
        .map(|(name, bytes)| {
            if name != "xl/workbook.xml" {
                return (name, bytes);
            }
            let xml = String::from_utf8(bytes).unwrap().replace(" date1904=\"0\"", "");
            let xml = if xml.contains("<workbookPr ") {
                xml.replacen("<workbookPr ", "<workbookPr date1904=\"1\" ", 1)
            } else if xml.contains("<workbookPr/>") {
                xml.replacen("<workbookPr/>", "<workbookPr date1904=\"1\"/>", 1)
            } else {
                xml.replacen("<sheets>", "<workbookPr date1904=\"1\"/><sheets>", 1)
            };
            (name, xml.into_bytes())
        })
        .collect();
    let borrowed: Vec<(&str, Vec<u8>)> = parts.iter().map(|(n, b)| (n.as_str(), b.clone())).collect();
    zip_parts(&borrowed)
}

#[test]
fn date_serials_follow_the_1904_system() {
    let path = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        // 2023-03-01 counted from 1904-01-01.
        sh.get_cell_mut((1, 1)).set_value_number(43524.0);
        let _ = sh
            .get_style_mut("A1")
            .get_number_format_mut()
            .set_format_code(umya_spreadsheet::NumberingFormat::FORMAT_DATE_XLSX14);
    });

    let bytes = as_1904(&std::fs::read(path.path()).unwrap());
    let mut backend = CalamineAdapter::open_bytes(bytes).unwrap();
    let sheet = backend.read_sheet("Sheet1").unwrap();
    assert_eq!(
        sheet.get(1, 1),
        Some(&CellValue::Date(NaiveDate::from_ymd_opt(2023, 3, 1).unwrap()))
    );
}

#[test]
fn missing_sheet_is_reported_by_name() {
    let path = build_workbook(|_| {});
    let mut backend = CalamineAdapter::open_path(&path).unwrap();
    match backend.read_sheet("Panorama") {
        Err(IoError::SheetNotFound(name)) => assert_eq!(name, "Panorama"),
        other => panic!("expected SheetNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn tabular_source_from_named_sheet() {
    let path = build_workbook(|book| {
        let _ = book.new_sheet("Panorama").unwrap();
        let sh = book.get_sheet_by_name_mut("Panorama").unwrap();
        set_row(sh, 1, &["Panorama municipal"]);
        set_row(sh, 2, &["Município", "Valor"]);
        set_row(sh, 3, &["Tucano", "12345"]);
    });

    let mut source = open_workbook_auto(path.path()).expect("auto open");
    assert_eq!(source.first_sheet().unwrap().as_deref(), Some("Sheet1"));

    let opts = SourceOptions::default()
        .with_sheet("Panorama")
        .with_skip_rows(1)
        .with_header_row(0);
    let table = TabularSource::from_reader(&mut source, &opts).unwrap();
    assert_eq!(table.column_index("Município"), Some(0));
    assert_eq!(table.cell(0, 1).map(|v| v.to_string()), Some("12345".to_string()));
}

#[test]
fn workbook_source_reads_bytes() {
    let path = build_workbook(|book| {
        let sh = book.get_sheet_by_name_mut("Sheet1").unwrap();
        set_row(sh, 1, &["a", "1.5"]);
    });
    let bytes = std::fs::read(path.path()).unwrap();
    let mut source = WorkbookSource::open_bytes(bytes).unwrap();
    let table = TabularSource::from_reader(&mut source, &SourceOptions::default()).unwrap();
    assert_eq!(table.row_count(), 1);
    assert_eq!(table.cell(0, 1), Some(&CellValue::Number(1.5)));
}
