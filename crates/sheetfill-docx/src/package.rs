use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use sheetfill_common::PlaceholderMap;

use crate::error::DocxError;
use crate::part::TextPart;
use crate::substitute::{SubstitutionReport, Substituter};

/// File name given to filled documents.
pub const RESULT_FILE_NAME: &str = "relatorio.docx";
/// Media type of a WordprocessingML document.
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

pub const MAIN_DOCUMENT_PART: &str = "word/document.xml";

/// Whether a part carries paragraphs that may hold placeholders.
pub fn is_text_part(name: &str) -> bool {
    if matches!(
        name,
        MAIN_DOCUMENT_PART | "word/footnotes.xml" | "word/endnotes.xml"
    ) {
        return true;
    }
    let Some(file) = name.strip_prefix("word/") else {
        return false;
    };
    !file.contains('/')
        && file.ends_with(".xml")
        && (file.starts_with("header") || file.starts_with("footer"))
}

/// All parts of a DOCX zip, in archive order.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DocxError> {
        Self::from_reader(Cursor::new(bytes))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocxError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self, DocxError> {
        let mut zip = zip::ZipArchive::new(reader)?;
        let mut parts = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut file = zip.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut buf = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut buf)?;
            parts.push((name, buf));
        }

        if !parts.iter().any(|(name, _)| name == MAIN_DOCUMENT_PART) {
            return Err(DocxError::MissingPart(MAIN_DOCUMENT_PART.to_string()));
        }
        Ok(Self { parts })
    }

    /// Build a package from parts given in archive order.
    pub fn from_parts(parts: Vec<(String, Vec<u8>)>) -> Result<Self, DocxError> {
        if !parts.iter().any(|(name, _)| name == MAIN_DOCUMENT_PART) {
            return Err(DocxError::MissingPart(MAIN_DOCUMENT_PART.to_string()));
        }
        Ok(Self { parts })
    }

    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.as_slice())
    }

    /// Replace a part's bytes, or append a new part.
    pub fn set_part(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        let name = name.into();
        match self.parts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = bytes,
            None => self.parts.push((name, bytes)),
        }
    }

    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(n, _)| n.as_str())
    }

    pub fn text_part_names(&self) -> impl Iterator<Item = &str> {
        self.part_names().filter(|n| is_text_part(n))
    }

    /// Scan one text part.
    pub fn text_part(&self, name: &str) -> Result<TextPart, DocxError> {
        let bytes = self
            .part(name)
            .ok_or_else(|| DocxError::MissingPart(name.to_string()))?;
        let xml = String::from_utf8(bytes.to_vec()).map_err(|_| DocxError::NotUtf8(name.to_string()))?;
        TextPart::parse(name, xml)
    }

    /// Paragraph texts of the main document part.
    pub fn document_texts(&self) -> Result<Vec<String>, DocxError> {
        Ok(self.text_part(MAIN_DOCUMENT_PART)?.document().texts())
    }

    /// Substitute placeholders in every text part. Parts without a change
    /// keep their original bytes.
    pub fn substitute(&mut self, map: &PlaceholderMap) -> Result<SubstitutionReport, DocxError> {
        let substituter = Substituter::new(map);
        let names: Vec<String> = self.text_part_names().map(str::to_string).collect();

        let mut report = SubstitutionReport::default();
        for name in names {
            let mut part = self.text_part(&name)?;
            let part_report = substituter.document(part.document_mut());

            #[cfg(feature = "tracing")]
            tracing::debug!(
                part = %name,
                replacements = part_report.total(),
                split_runs = part_report.split_runs,
                "substituted text part"
            );

            if part.is_modified() {
                self.set_part(name, part.into_xml().into_bytes());
            }
            report.merge(part_report);
        }
        Ok(report)
    }

    pub fn write_to<W: Write + Seek>(&self, w: W) -> Result<(), DocxError> {
        let mut zip = zip::ZipWriter::new(w);
        let options =
            zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        for (name, bytes) in &self.parts {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(bytes)?;
        }
        zip.finish()?;
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}
