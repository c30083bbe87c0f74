use thiserror::Error;

/// Failures raised while opening or reading a spreadsheet.
///
/// These are parse-time errors: the input could not be turned into rows and
/// columns at all, so the request that supplied it cannot produce output.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("{backend} error: {message}")]
    Backend { backend: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unsupported {feature}: {context}")]
    Unsupported { feature: String, context: String },

    #[error("sheet not found: {0}")]
    SheetNotFound(String),

    #[error("workbook contains no sheets")]
    NoSheets,
}

impl IoError {
    pub fn from_backend<E: std::fmt::Display>(backend: &str, err: E) -> Self {
        IoError::Backend {
            backend: backend.to_string(),
            message: err.to_string(),
        }
    }
}
