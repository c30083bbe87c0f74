//! A minimal WordprocessingML package built from styled paragraphs.

use quick_xml::escape::escape;

use crate::error::DocxError;
use crate::package::{DocxPackage, MAIN_DOCUMENT_PART};

/// Paragraph style understood by the minimal package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Normal,
    Heading1,
    Heading2,
}

impl ParagraphStyle {
    fn style_id(self) -> Option<&'static str> {
        match self {
            ParagraphStyle::Normal => None,
            ParagraphStyle::Heading1 => Some("Heading1"),
            ParagraphStyle::Heading2 => Some("Heading2"),
        }
    }
}

/// Ordered single-run paragraphs for a new document.
#[derive(Debug, Clone, Default)]
pub struct MinimalDocx {
    paragraphs: Vec<(ParagraphStyle, String)>,
}

impl MinimalDocx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn heading(&mut self, level: u8, text: impl Into<String>) -> &mut Self {
        let style = if level <= 1 {
            ParagraphStyle::Heading1
        } else {
            ParagraphStyle::Heading2
        };
        self.paragraphs.push((style, text.into()));
        self
    }

    pub fn paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.paragraphs.push((ParagraphStyle::Normal, text.into()));
        self
    }

    pub fn paragraphs(&self) -> &[(ParagraphStyle, String)] {
        &self.paragraphs
    }

    pub fn to_package(&self) -> Result<DocxPackage, DocxError> {
        DocxPackage::from_parts(vec![
            ("[Content_Types].xml".to_string(), content_types_xml().into_bytes()),
            ("_rels/.rels".to_string(), rels_xml().into_bytes()),
            (MAIN_DOCUMENT_PART.to_string(), self.document_xml().into_bytes()),
            ("word/_rels/document.xml.rels".to_string(), document_rels_xml().into_bytes()),
            ("word/styles.xml".to_string(), styles_xml().into_bytes()),
        ])
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, DocxError> {
        self.to_package()?.to_bytes()
    }

    fn document_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#);
        out.push_str("<w:body>");
        for (style, text) in &self.paragraphs {
            out.push_str("<w:p>");
            if let Some(id) = style.style_id() {
                out.push_str(&format!(r#"<w:pPr><w:pStyle w:val="{id}"/></w:pPr>"#));
            }
            if !text.is_empty() {
                out.push_str("<w:r>");
                if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
                    out.push_str(r#"<w:t xml:space="preserve">"#);
                } else {
                    out.push_str("<w:t>");
                }
                out.push_str(&escape(text.as_str()));
                out.push_str("</w:t></w:r>");
            }
            out.push_str("</w:p>");
        }
        out.push_str(r#"<w:sectPr><w:pgSz w:w="11906" w:h="16838"/></w:sectPr>"#);
        out.push_str("</w:body></w:document>\n");
        out
    }
}

fn content_types_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
  <Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>
</Types>
"#
    .to_owned()
}

fn rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>
"#
    .to_owned()
}

fn document_rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
</Relationships>
"#
    .to_owned()
}

fn styles_xml() -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#);
    out.push('\n');
    out.push_str(r#"  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#);
    out.push('\n');
    for (id, name, size) in [("Heading1", "heading 1", 32), ("Heading2", "heading 2", 26)] {
        out.push_str(&format!(
            r#"  <w:style w:type="paragraph" w:styleId="{id}"><w:name w:val="{name}"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="60"/></w:pPr><w:rPr><w:b/><w:sz w:val="{size}"/></w:rPr></w:style>"#
        ));
        out.push('\n');
    }
    out.push_str("</w:styles>\n");
    out
}
