//! Fixture builders shared by the sheetfill test suites.
//!
//! Workbooks are produced with `umya-spreadsheet` so readers are exercised
//! against files a real spreadsheet writer emitted. DOCX templates are
//! assembled part by part so tests control exactly how text is split into runs.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub use umya_spreadsheet;

/// A file on disk that lives as long as this value.
pub struct Fixture {
    _dir: TempDir,
    path: PathBuf,
}

impl Fixture {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsRef<Path> for Fixture {
    fn as_ref(&self) -> &Path {
        &self.path
    }
}

/// Write `bytes` to a fresh temp dir under `file_name`.
pub fn write_fixture(file_name: &str, bytes: &[u8]) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join(file_name);
    std::fs::write(&path, bytes).expect("write fixture");
    Fixture { _dir: dir, path }
}

/// Build an xlsx workbook starting from a single empty `Sheet1`.
pub fn build_workbook(f: impl FnOnce(&mut umya_spreadsheet::Spreadsheet)) -> Fixture {
    let mut book = umya_spreadsheet::new_file();
    f(&mut book);
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("fixture.xlsx");
    umya_spreadsheet::writer::xlsx::write(&book, &path).expect("write xlsx");
    Fixture { _dir: dir, path }
}

/// Write one row of values, 1-based, starting at column A.
///
/// Values that parse as numbers are stored as numbers; empty strings are skipped.
pub fn set_row(sheet: &mut umya_spreadsheet::Worksheet, row: u32, values: &[&str]) {
    for (i, v) in values.iter().enumerate() {
        if v.is_empty() {
            continue;
        }
        let cell = sheet.get_cell_mut((i as u32 + 1, row));
        match v.parse::<f64>() {
            Ok(n) => {
                cell.set_value_number(n);
            }
            Err(_) => {
                cell.set_value(*v);
            }
        }
    }
}

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Default Extension="png" ContentType="image/png"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/word/header1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml"/><Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/header" Target="header1.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/><Relationship Id="rId4" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.png"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style></w:styles>"#;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Bytes standing in for an embedded image; tests check they survive untouched.
pub const IMAGE_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDRsheetfill-fixture";

/// One run: text plus raw `<w:rPr>` children (empty for none).
#[derive(Clone, Debug)]
pub struct RunSpec {
    pub text: String,
    pub props: String,
}

impl RunSpec {
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            props: String::new(),
        }
    }

    pub fn styled(text: &str, props: &str) -> Self {
        Self {
            text: text.to_string(),
            props: props.to_string(),
        }
    }
}

/// Builder for a small Word document with body, header, and footer parts.
#[derive(Default)]
pub struct DocxBuilder {
    body: Vec<Vec<RunSpec>>,
    header: Vec<Vec<RunSpec>>,
    footer: Vec<Vec<RunSpec>>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Body paragraph of unformatted runs.
    pub fn paragraph(mut self, runs: &[&str]) -> Self {
        self.body.push(runs.iter().map(|t| RunSpec::plain(t)).collect());
        self
    }

    pub fn styled_paragraph(mut self, runs: Vec<RunSpec>) -> Self {
        self.body.push(runs);
        self
    }

    pub fn header(mut self, runs: &[&str]) -> Self {
        self.header.push(runs.iter().map(|t| RunSpec::plain(t)).collect());
        self
    }

    pub fn footer(mut self, runs: &[&str]) -> Self {
        self.footer.push(runs.iter().map(|t| RunSpec::plain(t)).collect());
        self
    }

    pub fn build(self) -> Vec<u8> {
        let parts: Vec<(&str, Vec<u8>)> = vec![
            ("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec()),
            ("_rels/.rels", ROOT_RELS.as_bytes().to_vec()),
            ("word/document.xml", document_xml(&self.body).into_bytes()),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes().to_vec()),
            ("word/styles.xml", STYLES.as_bytes().to_vec()),
            ("word/header1.xml", story_xml("hdr", &self.header).into_bytes()),
            ("word/footer1.xml", story_xml("ftr", &self.footer).into_bytes()),
            ("word/media/image1.png", IMAGE_BYTES.to_vec()),
        ];
        zip_parts(&parts)
    }

    pub fn write(self, file_name: &str) -> Fixture {
        let bytes = self.build();
        write_fixture(file_name, &bytes)
    }
}

/// Zip `(name, bytes)` pairs in order with deflate compression.
pub fn zip_parts(parts: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (name, bytes) in parts {
        zip.start_file(*name, options).expect("start zip entry");
        zip.write_all(bytes).expect("write zip entry");
    }
    zip.finish().expect("finish zip").into_inner()
}

/// Every `(name, bytes)` entry of a zipped package, in archive order.
pub fn unzip_parts(package: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).expect("open zip");
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).expect("zip entry");
            let mut out = Vec::new();
            std::io::copy(&mut file, &mut out).expect("read zip entry");
            (file.name().to_string(), out)
        })
        .collect()
}

/// Read one part back out of a zipped package.
pub fn read_part(package: &[u8], name: &str) -> Vec<u8> {
    let mut archive = zip::ZipArchive::new(Cursor::new(package)).expect("open zip");
    let mut file = archive.by_name(name).expect("zip entry");
    let mut out = Vec::new();
    std::io::copy(&mut file, &mut out).expect("read zip entry");
    out
}

fn paragraphs_xml(paragraphs: &[Vec<RunSpec>]) -> String {
    let mut xml = String::new();
    for runs in paragraphs {
        xml.push_str("<w:p>");
        for run in runs {
            xml.push_str("<w:r>");
            if !run.props.is_empty() {
                xml.push_str("<w:rPr>");
                xml.push_str(&run.props);
                xml.push_str("</w:rPr>");
            }
            let text = escape_text(&run.text);
            if run.text.starts_with(' ') || run.text.ends_with(' ') {
                xml.push_str(&format!("<w:t xml:space=\"preserve\">{text}</w:t>"));
            } else {
                xml.push_str(&format!("<w:t>{text}</w:t>"));
            }
            xml.push_str("</w:r>");
        }
        xml.push_str("</w:p>");
    }
    xml
}

fn document_xml(body: &[Vec<RunSpec>]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:document xmlns:w=\"{W_NS}\"><w:body>{}<w:sectPr/></w:body></w:document>",
        paragraphs_xml(body)
    )
}

fn story_xml(root: &str, paragraphs: &[Vec<RunSpec>]) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n<w:{root} xmlns:w=\"{W_NS}\">{}</w:{root}>",
        paragraphs_xml(paragraphs)
    )
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}
