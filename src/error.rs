//! Error types for the pdf2epub library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2EpubError`] — **Fatal**: the conversion of this file cannot
//!   proceed at all (bad input file, wrong password, output not writable).
//!   Returned as `Err(Pdf2EpubError)` from the top-level `convert*` functions.
//!
//! * [`PageError`] — **Non-fatal**: text extraction failed for a single page
//!   but all other pages are fine. Stored inside
//!   [`crate::output::PageText`] so callers can inspect partial success
//!   rather than losing the whole book to one bad page.
//!
//! In batch mode the CLI catches `Pdf2EpubError` per input file, logs it with
//! its suggestion, and continues with the remaining files.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pdf2epub library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageText`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Pdf2EpubError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    /// Some pages extracted but at least one failed.
    ///
    /// Returned by [`crate::output::ConversionOutput::into_result`] when the
    /// caller wants to treat any page failure as an error.
    #[error("{failed}/{total} pages failed during text extraction")]
    PagesFailed { failed: usize, total: usize },

    // ── Cover errors ──────────────────────────────────────────────────────
    /// A custom cover image was supplied but could not be read or decoded.
    #[error("Cannot read cover image '{path}': {detail}\nThe file must be a valid JPEG or PNG.")]
    CoverImageUnreadable { path: PathBuf, detail: String },

    /// A custom cover image decoded but is in a format EPUB readers reject.
    #[error("Unsupported cover image format for '{path}': {format}\nConvert it to JPEG or PNG first.")]
    UnsupportedCoverFormat { path: PathBuf, format: String },

    // ── Packaging errors ──────────────────────────────────────────────────
    /// The EPUB container could not be assembled.
    #[error("EPUB packaging failed: {0}")]
    EpubPackagingFailed(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output EPUB file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config / metadata errors ──────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A `--metadata` argument was not in `key=value` form.
    #[error("Invalid metadata pair '{pair}'\nExpected key=value, e.g. title=MyBook")]
    InvalidMetadataPair { pair: String },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
Install pdfium (https://github.com/bblanchon/pdfium-binaries) and either:\n\
  • Place libpdfium next to the pdf2epub binary, or\n\
  • Set PDFIUM_LIB_PATH=/path/to/dir containing libpdfium.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored alongside [`crate::output::PageText`] when a page fails.
/// The overall conversion continues with the remaining pages.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// pdfium could not load this page at all.
    #[error("Page {page}: failed to load: {detail}")]
    LoadFailed { page: usize, detail: String },

    /// Text extraction failed for this page.
    #[error("Page {page}: text extraction failed: {detail}")]
    ExtractionFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number this error belongs to.
    pub fn page(&self) -> usize {
        match self {
            PageError::LoadFailed { page, .. } => *page,
            PageError::ExtractionFailed { page, .. } => *page,
        }
    }
}
