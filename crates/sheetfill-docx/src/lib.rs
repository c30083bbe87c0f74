//! Fill `{{Placeholder}}` tokens in Word documents.
//!
//! [`substitute`] works on the format-free [`Document`] model and handles
//! tokens that Word split across several formatting runs. [`DocxPackage`]
//! applies it to the text parts of a `.docx` file and rewrites only the text
//! that changed.

pub mod error;
pub mod minimal;
pub mod model;
pub mod package;
pub mod part;
pub mod report;
pub mod substitute;

pub use error::DocxError;
pub use minimal::{MinimalDocx, ParagraphStyle};
pub use model::{Document, Paragraph, Run, RunFormat};
pub use package::{DOCX_MEDIA_TYPE, DocxPackage, RESULT_FILE_NAME, is_text_part};
pub use part::TextPart;
pub use report::{REPORT_FILE_NAME, REPORT_TITLE, build_report, report_bytes};
pub use substitute::{SubstitutionReport, Substituter, substitute, substitute_paragraph};

pub use sheetfill_common::PlaceholderMap;
