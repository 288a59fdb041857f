//! Input validation: check the user-supplied path before pdfium sees it.
//!
//! pdfium's error messages for a missing or non-PDF file are opaque
//! (`Unknown` error codes from the C++ layer). Validating existence, read
//! permission, and the `%PDF` magic bytes up front lets callers get a
//! meaningful error rather than a pdfium failure.

use crate::error::Pdf2EpubError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local PDF path: existence, readability, and magic bytes.
///
/// Returns the path unchanged on success so callers can chain it.
pub fn resolve_input(path_str: impl AsRef<Path>) -> Result<PathBuf, Pdf2EpubError> {
    let path = path_str.as_ref().to_path_buf();

    if !path.exists() {
        return Err(Pdf2EpubError::FileNotFound { path });
    }

    // Check read permission by attempting to open
    match std::fs::File::open(&path) {
        Ok(mut f) => {
            // Verify PDF magic bytes
            use std::io::Read;
            let mut magic = [0u8; 4];
            if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                return Err(Pdf2EpubError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(Pdf2EpubError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(Pdf2EpubError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_rejected() {
        let result = resolve_input("/definitely/not/a/real/file.pdf");
        assert!(matches!(result, Err(Pdf2EpubError::FileNotFound { .. })));
    }

    #[test]
    fn non_pdf_magic_is_rejected() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"hello, this is not a pdf").unwrap();

        let result = resolve_input(tmp.path());
        match result {
            Err(Pdf2EpubError::NotAPdf { magic, .. }) => assert_eq!(&magic, b"hell"),
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn pdf_magic_is_accepted() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3\n").unwrap();

        let resolved = resolve_input(tmp.path()).unwrap();
        assert_eq!(resolved, tmp.path());
    }

    #[test]
    fn short_file_is_accepted_for_pdfium_to_reject() {
        // A file shorter than 4 bytes cannot fail the magic check here;
        // pdfium reports it as corrupt later.
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"%P").unwrap();
        assert!(resolve_input(tmp.path()).is_ok());
    }
}
