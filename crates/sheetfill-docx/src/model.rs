//! Plain document model: paragraphs of runs.
//!
//! The model knows nothing about XML. A run's formatting is kept as an opaque
//! string so callers can carry whatever their format uses and get it back
//! untouched.

/// Opaque run formatting. For DOCX this is the raw `<w:rPr>` element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFormat(pub String);

impl RunFormat {
    pub fn is_plain(&self) -> bool {
        self.0.is_empty()
    }
}

/// A stretch of text sharing one formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub format: RunFormat,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: RunFormat::default(),
        }
    }

    pub fn with_format(text: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: RunFormat(format.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Paragraph {
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new(runs: Vec<Run>) -> Self {
        Self { runs }
    }

    /// One unformatted run per string.
    pub fn from_texts<S: AsRef<str>>(texts: &[S]) -> Self {
        Self::new(texts.iter().map(|t| Run::new(t.as_ref())).collect())
    }

    /// Concatenated run text.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self { paragraphs }
    }

    /// Paragraph texts in order.
    pub fn texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(Paragraph::text).collect()
    }
}
