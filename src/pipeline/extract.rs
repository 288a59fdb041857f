//! PDF reading: document metadata and per-page text via pdfium.
//!
//! ## Why pdfium for text?
//!
//! pdfium's text layer already resolves encodings, CID fonts, and reading
//! order — the failure modes that make naive content-stream extraction
//! produce mojibake. The rest of the pipeline only ever sees plain Rust
//! strings, so swapping the backend later means touching this module alone.
//!
//! Page-level failures are captured inside [`PageText`] rather than
//! propagated: one broken page must not sink the other N-1.

use crate::error::{Pdf2EpubError, PageError};
use crate::output::{DocumentMetadata, PageText};
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info, warn};

/// Bind to a pdfium library.
///
/// Resolution order: `PDFIUM_LIB_PATH` directory, the current directory,
/// then the system library path. Kept in one place so every pipeline stage
/// that needs pdfium reports the same setup hint on failure.
pub fn bind_pdfium() -> Result<Pdfium, Pdf2EpubError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(dir) if !dir.is_empty() => {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
        }
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| Pdf2EpubError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Load a PDF, mapping pdfium's password errors to precise variants.
///
/// The password lifetime is tied to the document because pdfium borrows it
/// for the lifetime of the loaded handle.
pub fn load_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, Pdf2EpubError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let err_str = format!("{:?}", e);
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                Pdf2EpubError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                Pdf2EpubError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            Pdf2EpubError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail: err_str,
            }
        }
    })
}

/// Load a PDF and determine whether it is actually encrypted.
///
/// pdfium opens unencrypted files regardless of any password argument, so a
/// supplied password alone says nothing about encryption. When a password is
/// given, the document is first probed without it: a clean open means the
/// file is unencrypted and the password was unnecessary.
pub fn load_document_detecting_encryption<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<(PdfDocument<'a>, bool), Pdf2EpubError> {
    if password.is_none() {
        return Ok((load_document(pdfium, pdf_path, None)?, false));
    }
    match load_document(pdfium, pdf_path, None) {
        Ok(document) => Ok((document, false)),
        Err(Pdf2EpubError::PasswordRequired { .. }) => {
            Ok((load_document(pdfium, pdf_path, password)?, true))
        }
        Err(e) => Err(e),
    }
}

/// Extract document metadata from a PDF without touching page content.
pub fn extract_metadata(
    pdf_path: &Path,
    password: Option<&str>,
) -> Result<DocumentMetadata, Pdf2EpubError> {
    let pdfium = bind_pdfium()?;
    let (document, encrypted) = load_document_detecting_encryption(&pdfium, pdf_path, password)?;
    Ok(document_metadata(&document, encrypted))
}

/// Read the information dictionary of an already-loaded document.
pub fn document_metadata(document: &PdfDocument<'_>, encrypted: bool) -> DocumentMetadata {
    let metadata = document.metadata();
    let pages = document.pages();

    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    DocumentMetadata {
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        subject: get_meta(PdfDocumentMetadataTagType::Subject),
        creator: get_meta(PdfDocumentMetadataTagType::Creator),
        producer: get_meta(PdfDocumentMetadataTagType::Producer),
        creation_date: get_meta(PdfDocumentMetadataTagType::CreationDate),
        modification_date: get_meta(PdfDocumentMetadataTagType::ModificationDate),
        page_count: pages.len() as usize,
        pdf_version: format!("{:?}", document.version()),
        is_encrypted: encrypted,
    }
}

/// Extract the text of the selected pages.
///
/// `page_indices` are 0-indexed; the returned [`PageText`] entries carry
/// 1-indexed page numbers. A page whose extraction fails yields an entry
/// with `error` set rather than aborting the run.
pub fn extract_pages(
    document: &PdfDocument<'_>,
    page_indices: &[usize],
) -> Vec<PageText> {
    let pages = document.pages();
    let total_pages = pages.len() as usize;
    info!("PDF loaded: {} pages", total_pages);

    let mut results = Vec::with_capacity(page_indices.len());

    for &idx in page_indices {
        if idx >= total_pages {
            warn!(
                "Skipping page {} (out of range, total={})",
                idx + 1,
                total_pages
            );
            continue;
        }

        let page_num = idx + 1;
        let entry = match pages.get(idx as u16) {
            Ok(page) => match page.text() {
                Ok(text) => {
                    let content = text.all();
                    debug!("Extracted page {} → {} chars", page_num, content.len());
                    PageText {
                        page_num,
                        text: content,
                        error: None,
                    }
                }
                Err(e) => PageText {
                    page_num,
                    text: String::new(),
                    error: Some(PageError::ExtractionFailed {
                        page: page_num,
                        detail: format!("{:?}", e),
                    }),
                },
            },
            Err(e) => PageText {
                page_num,
                text: String::new(),
                error: Some(PageError::LoadFailed {
                    page: page_num,
                    detail: format!("{:?}", e),
                }),
            },
        };

        if let Some(ref e) = entry.error {
            warn!("{}", e);
        }
        results.push(entry);
    }

    results
}
