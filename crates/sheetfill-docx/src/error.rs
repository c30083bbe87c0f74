use thiserror::Error;

/// Failures reading or writing a DOCX package.
///
/// All of these are parse-time errors: no filled document is produced.
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("not a valid DOCX package: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("package has no `{0}` part")]
    MissingPart(String),

    #[error("part `{part}` is not valid XML: {message}")]
    Xml { part: String, message: String },

    #[error("part `{0}` is not UTF-8 text")]
    NotUtf8(String),
}
