use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PDF_MIME: &str = "application/pdf";
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Descriptor of the document the user picked. Only files that pass
/// validation become a `SelectedFile`; rejects never reach the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedFile {
    pub name: String,
    pub byte_size: u64,
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("Only PDF files are supported (got '{0}')")]
    UnsupportedType(String),

    #[error("File exceeds the 50 MiB upload limit ({0} bytes)")]
    TooLarge(u64),

    #[error("File is empty")]
    Empty,

    #[error("An upload is already in progress")]
    Busy,
}

impl SelectedFile {
    pub fn validate(name: &str, mime_type: &str, byte_size: u64) -> Result<Self, SelectionError> {
        if mime_type != PDF_MIME {
            return Err(SelectionError::UnsupportedType(mime_type.to_string()));
        }
        if byte_size == 0 {
            return Err(SelectionError::Empty);
        }
        if byte_size > MAX_FILE_BYTES {
            return Err(SelectionError::TooLarge(byte_size));
        }

        Ok(Self {
            name: name.to_string(),
            byte_size,
            mime_type: mime_type.to_string(),
        })
    }

    pub fn size_mb(&self) -> f64 {
        self.byte_size as f64 / (1024.0 * 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_pdf_within_limit() {
        let file = SelectedFile::validate("report.pdf", PDF_MIME, 2 * 1024 * 1024).unwrap();
        assert_eq!(file.name, "report.pdf");
        assert_eq!(file.byte_size, 2 * 1024 * 1024);
        assert!((file.size_mb() - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn accepts_file_at_exact_limit() {
        assert!(SelectedFile::validate("big.pdf", PDF_MIME, MAX_FILE_BYTES).is_ok());
    }

    #[test]
    fn rejects_non_pdf_mime() {
        let err = SelectedFile::validate("notes.txt", "text/plain", 100).unwrap_err();
        assert_eq!(err, SelectionError::UnsupportedType("text/plain".to_string()));
    }

    #[test]
    fn rejects_oversize_file() {
        let err = SelectedFile::validate("huge.pdf", PDF_MIME, MAX_FILE_BYTES + 1).unwrap_err();
        assert_eq!(err, SelectionError::TooLarge(MAX_FILE_BYTES + 1));
    }

    #[test]
    fn rejects_empty_file() {
        let err = SelectedFile::validate("empty.pdf", PDF_MIME, 0).unwrap_err();
        assert_eq!(err, SelectionError::Empty);
    }
}
