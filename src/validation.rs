//! Input checks performed at the call site, before the gateway is invoked.

use crate::ai::mime;
use crate::{Error, Result};

pub const EMPTY_DRUG_NAME: &str = "Please enter a drug name.";
pub const EMPTY_DRUG_CLASS: &str = "Please select a drug class.";
pub const EMPTY_PATIENT_CASE: &str = "Please enter a patient case description.";
pub const INVALID_PDF: &str = "Please upload a valid PDF file.";

fn required_text(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidInput(message.to_string()));
    }
    Ok(trimmed.to_string())
}

pub fn drug_name(value: &str) -> Result<String> {
    required_text(value, EMPTY_DRUG_NAME)
}

pub fn drug_class(value: &str) -> Result<String> {
    required_text(value, EMPTY_DRUG_CLASS)
}

pub fn patient_case(value: &str) -> Result<String> {
    required_text(value, EMPTY_PATIENT_CASE)
}

/// Accepts only documents carrying the PDF signature; returns their MIME type.
pub fn pdf_document(bytes: &[u8]) -> Result<&'static str> {
    if !mime::is_pdf(bytes) {
        tracing::warn!(
            detected = mime::detect_document_mime(bytes).unwrap_or("unknown"),
            size = bytes.len(),
            "Rejected non-PDF document"
        );
        return Err(Error::InvalidInput(INVALID_PDF.to_string()));
    }
    Ok(mime::PDF_MIME)
}
