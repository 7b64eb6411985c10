//! Document input: PDF text extraction and PDF download.

pub mod fetch;
pub mod pdf;

pub use crate::types::TextStats;
pub use fetch::{download, validate_pdf_url};
pub use pdf::{extract_text, read_pdf};
