pub const PDF_MIME: &str = "application/pdf";

/// Sniff a document's MIME type from its leading bytes.
pub fn detect_document_mime(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x25, 0x50, 0x44, 0x46, 0x2D, ..] => Some(PDF_MIME),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        _ => {
            tracing::debug!(
                "Unrecognized document format (first 5 bytes: {:02X?})",
                &bytes[..bytes.len().min(5)]
            );
            None
        }
    }
}

pub fn is_pdf(bytes: &[u8]) -> bool {
    detect_document_mime(bytes) == Some(PDF_MIME)
}
