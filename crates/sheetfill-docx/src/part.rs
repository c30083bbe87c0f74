//! WordprocessingML text parts as [`Document`]s.
//!
//! A part is scanned once into paragraphs and runs while remembering where
//! each `<w:t>` lives in the source bytes. After substitution only the `<w:t>`
//! elements whose text changed are rewritten; all other bytes of the part are
//! kept as they were.
//!
//! Elements are matched by the `w:` prefix Word writes for its main namespace.

use quick_xml::Reader;
use quick_xml::escape::{escape, unescape};
use quick_xml::events::Event;

use crate::error::DocxError;
use crate::model::{Document, Paragraph, Run};

/// Location of one `<w:t>` in the part.
#[derive(Debug, Clone)]
struct TextSlot {
    /// Byte range of the start tag.
    open: (usize, usize),
    /// Byte range of the escaped content.
    content: (usize, usize),
    original: String,
}

/// A scanned text part: the document view plus its source.
#[derive(Debug, Clone)]
pub struct TextPart {
    name: String,
    xml: String,
    document: Document,
    slots: Vec<Vec<TextSlot>>,
}

struct OpenRun {
    format: String,
    props_start: Option<usize>,
    /// Depth of the run's direct children.
    child_depth: usize,
}

fn is_w(name: &[u8], local: &[u8]) -> bool {
    name.len() == local.len() + 2 && name.starts_with(b"w:") && &name[2..] == local
}

impl TextPart {
    pub fn parse(name: &str, xml: String) -> Result<Self, DocxError> {
        let xml_err = |e: &dyn std::fmt::Display| DocxError::Xml {
            part: name.to_string(),
            message: e.to_string(),
        };

        let mut document = Document::default();
        let mut slots: Vec<Vec<TextSlot>> = Vec::new();
        {
            let mut reader = Reader::from_str(&xml);
            let mut paragraphs: Vec<usize> = Vec::new();
            let mut runs: Vec<OpenRun> = Vec::new();
            let mut open_text: Option<(usize, usize)> = None;
            // Open elements; a start tag sits at the depth before it is counted.
            let mut depth = 0usize;

            loop {
                let event = reader.read_event().map_err(|e| xml_err(&e))?;
                let after = reader.buffer_position() as usize;
                // Markup never contains a raw `<`, so the tag just read starts
                // at the last one before `after`.
                let before = xml[..after].rfind('<').unwrap_or(0);

                match event {
                    Event::Start(e) => {
                        let name = e.name();
                        let name = name.as_ref();
                        let in_run = runs.last().is_some_and(|r| r.child_depth == depth);
                        if is_w(name, b"p") {
                            paragraphs.push(document.paragraphs.len());
                            document.paragraphs.push(Paragraph::default());
                            slots.push(Vec::new());
                        } else if is_w(name, b"r") {
                            runs.push(OpenRun {
                                format: String::new(),
                                props_start: None,
                                child_depth: depth + 1,
                            });
                        } else if is_w(name, b"rPr") && in_run {
                            if let Some(run) = runs.last_mut() {
                                run.props_start = Some(before);
                            }
                        } else if is_w(name, b"t") && in_run && !paragraphs.is_empty() {
                            open_text = Some((before, after));
                        }
                        depth += 1;
                    }
                    Event::Empty(e) => {
                        let in_run = runs.last().is_some_and(|r| r.child_depth == depth);
                        if is_w(e.name().as_ref(), b"rPr") && in_run {
                            if let Some(run) = runs.last_mut() {
                                run.format = xml[before..after].to_string();
                            }
                        }
                    }
                    Event::End(e) => {
                        depth = depth.saturating_sub(1);
                        let name = e.name();
                        let name = name.as_ref();
                        let in_run = runs.last().is_some_and(|r| r.child_depth == depth);
                        if is_w(name, b"p") {
                            paragraphs.pop();
                        } else if is_w(name, b"r") {
                            runs.pop();
                        } else if is_w(name, b"rPr") && in_run {
                            if let Some(run) = runs.last_mut() {
                                if let Some(start) = run.props_start.take() {
                                    run.format = xml[start..after].to_string();
                                }
                            }
                        } else if is_w(name, b"t") && in_run {
                            if let (Some(open), Some(&p), Some(run)) =
                                (open_text.take(), paragraphs.last(), runs.last())
                            {
                                let content = (open.1, before);
                                let text = unescape(&xml[content.0..content.1])
                                    .map_err(|e| xml_err(&e))?
                                    .into_owned();
                                document.paragraphs[p]
                                    .runs
                                    .push(Run::with_format(text.clone(), run.format.clone()));
                                slots[p].push(TextSlot {
                                    open,
                                    content,
                                    original: text,
                                });
                            }
                        }
                    }
                    Event::Eof => break,
                    _ => {}
                }
            }
        }

        Ok(Self {
            name: name.to_string(),
            xml,
            document,
            slots,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Mutable view for substitution. Only run text edits are written back;
    /// adding or removing runs or paragraphs is not supported.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn is_modified(&self) -> bool {
        self.changed().next().is_some()
    }

    fn changed(&self) -> impl Iterator<Item = (&TextSlot, &str)> {
        self.document
            .paragraphs
            .iter()
            .zip(&self.slots)
            .flat_map(|(p, slots)| p.runs.iter().zip(slots))
            .filter(|(run, slot)| run.text != slot.original)
            .map(|(run, slot)| (slot, run.text.as_str()))
    }

    /// Part XML with changed runs spliced in.
    pub fn to_xml(&self) -> String {
        let mut edits: Vec<((usize, usize), String)> = Vec::new();
        for (slot, text) in self.changed() {
            let open_tag = &self.xml[slot.open.0..slot.open.1];
            if needs_preserve(text) && !open_tag.contains("xml:space") {
                edits.push((slot.open, "<w:t xml:space=\"preserve\">".to_string()));
            }
            edits.push((slot.content, escape(text).into_owned()));
        }
        edits.sort_by(|a, b| b.0.0.cmp(&a.0.0));

        let mut out = self.xml.clone();
        for ((start, end), replacement) in edits {
            out.replace_range(start..end, &replacement);
        }
        out
    }

    pub fn into_xml(self) -> String {
        if self.is_modified() { self.to_xml() } else { self.xml }
    }
}

fn needs_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
        r#"<w:p><w:pPr><w:rPr><w:b/></w:rPr></w:pPr>"#,
        r#"<w:r><w:rPr><w:i/></w:rPr><w:t xml:space="preserve">Município: {{Nom</w:t></w:r>"#,
        r#"<w:r><w:t>e}} &amp; cia</w:t></w:r></w:p>"#,
        r#"<w:p><w:del><w:r><w:delText>{{Velho}}</w:delText></w:r></w:del>"#,
        r#"<w:r><w:instrText> PAGE </w:instrText></w:r><w:r><w:t>fim</w:t></w:r></w:p>"#,
        r#"</w:body></w:document>"#,
    );

    #[test]
    fn scans_paragraphs_runs_and_formats() {
        let part = TextPart::parse("word/document.xml", BODY.to_string()).unwrap();
        let doc = part.document();
        assert_eq!(doc.texts(), vec!["Município: {{Nome}} & cia", "fim"]);
        assert_eq!(doc.paragraphs[0].runs[0].format.0, "<w:rPr><w:i/></w:rPr>");
        assert!(doc.paragraphs[0].runs[1].format.is_plain());
        assert!(!part.is_modified());
        assert_eq!(part.clone().into_xml(), BODY);
    }

    #[test]
    fn splices_only_changed_text() {
        let mut part = TextPart::parse("word/document.xml", BODY.to_string()).unwrap();
        {
            let runs = &mut part.document_mut().paragraphs[0].runs;
            runs[0].text = "Município: A&B".to_string();
            runs[1].text = " & cia".to_string();
        }
        let xml = part.to_xml();
        assert!(xml.contains(r#"<w:t xml:space="preserve">Município: A&amp;B</w:t>"#));
        assert!(xml.contains(r#"<w:t xml:space="preserve"> &amp; cia</w:t>"#));
        assert!(xml.contains("<w:delText>{{Velho}}</w:delText>"));
        assert!(xml.contains("<w:t>fim</w:t>"));

        let reparsed = TextPart::parse("word/document.xml", xml).unwrap();
        assert_eq!(reparsed.document().texts()[0], "Município: A&B & cia");
    }

    #[test]
    fn text_box_paragraphs_are_separate() {
        let xml = concat!(
            r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>antes </w:t></w:r>"#,
            r#"<w:r><w:pict><w:txbxContent><w:p><w:r><w:t>{{Caixa}}</w:t></w:r></w:p></w:txbxContent></w:pict></w:r>"#,
            r#"<w:r><w:t>depois</w:t></w:r></w:p></w:body></w:document>"#,
        );
        let part = TextPart::parse("word/document.xml", xml.to_string()).unwrap();
        assert_eq!(part.document().texts(), vec!["antes depois", "{{Caixa}}"]);
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = TextPart::parse("word/header1.xml", "<w:hdr><w:p></w:hdr>".to_string())
            .unwrap_err();
        match err {
            DocxError::Xml { part, .. } => assert_eq!(part, "word/header1.xml"),
            other => panic!("expected xml error, got {other:?}"),
        }
    }
}
