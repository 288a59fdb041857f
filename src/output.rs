//! Result types: document metadata, per-page text, book metadata, and stats.
//!
//! [`DocumentMetadata`] is what the PDF says about itself; [`BookMetadata`]
//! is what the EPUB will say, after user overrides and fallbacks have been
//! applied. Keeping the two separate makes the resolution order testable and
//! lets `--inspect-only` report the raw PDF view without any EPUB concerns.

use crate::error::{Pdf2EpubError, PageError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Metadata read from the PDF document information dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
    pub producer: Option<String>,
    pub creation_date: Option<String>,
    pub modification_date: Option<String>,
    pub page_count: usize,
    pub pdf_version: String,
    pub is_encrypted: bool,
}

/// Extracted text for one PDF page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageText {
    /// 1-indexed page number in the source PDF.
    pub page_num: usize,
    /// Cleaned extracted text; empty when the page has no text layer.
    pub text: String,
    /// Extraction failure, if any. `text` is empty when this is set.
    pub error: Option<PageError>,
}

impl PageText {
    /// True when extraction succeeded but found no text (scanned page,
    /// image-only page). Distinct from `error.is_some()`.
    pub fn is_empty(&self) -> bool {
        self.error.is_none() && self.text.trim().is_empty()
    }
}

/// Resolved Dublin Core metadata that will be written into the EPUB.
///
/// Resolution order for every field: user override → PDF metadata →
/// built-in fallback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookMetadata {
    /// `dc:title`. Fallback: the input file stem.
    pub title: String,
    /// `dc:creator`. Fallback: "Unknown".
    pub author: String,
    /// `dc:language` (BCP 47).
    pub language: String,
    /// `dc:identifier`, also the OPF `unique-identifier`. Generated as a
    /// `urn:uuid:` v4 unless overridden.
    pub identifier: String,
    /// `dc:date`, if known.
    pub date: Option<String>,
    /// `dc:description`, if known. Falls back to the PDF subject line.
    pub description: Option<String>,
    /// Additional Dublin Core elements from user overrides
    /// (`subject`, `publisher`, `rights`, …), in sorted key order.
    pub extra: Vec<(String, String)>,
}

impl BookMetadata {
    /// Resolve EPUB metadata from PDF metadata plus user overrides.
    ///
    /// `overrides` keys are expected lowercased (the config builder and
    /// [`crate::config::parse_metadata_pairs`] both guarantee this).
    pub fn resolve(
        doc: &DocumentMetadata,
        overrides: &BTreeMap<String, String>,
        source: &Path,
        language: &str,
    ) -> Self {
        let file_stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_string());

        let title = overrides
            .get("title")
            .cloned()
            .or_else(|| doc.title.clone())
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(file_stem);

        let author = overrides
            .get("author")
            .or_else(|| overrides.get("creator"))
            .cloned()
            .or_else(|| doc.author.clone())
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string());

        let identifier = overrides
            .get("identifier")
            .cloned()
            .unwrap_or_else(|| format!("urn:uuid:{}", uuid::Uuid::new_v4()));

        let date = overrides
            .get("date")
            .cloned()
            .or_else(|| doc.creation_date.as_deref().and_then(normalise_pdf_date));

        let description = overrides
            .get("description")
            .cloned()
            .or_else(|| doc.subject.clone())
            .filter(|d| !d.trim().is_empty());

        let language = overrides
            .get("language")
            .map(String::as_str)
            .unwrap_or(language)
            .to_string();

        const CONSUMED: &[&str] = &[
            "title",
            "author",
            "creator",
            "identifier",
            "date",
            "description",
            "language",
        ];
        let extra: Vec<(String, String)> = overrides
            .iter()
            .filter(|(k, _)| !CONSUMED.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            title,
            author,
            language,
            identifier,
            date,
            description,
            extra,
        }
    }
}

/// Convert a PDF info-dictionary date (`D:YYYYMMDDHHmmSS…`) to `YYYY-MM-DD`.
///
/// Returns `None` when the string is too short or not numeric; `dc:date`
/// is better omitted than invalid.
fn normalise_pdf_date(raw: &str) -> Option<String> {
    let digits = raw.strip_prefix("D:").unwrap_or(raw);
    if digits.len() < 8 || !digits[..8].bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!(
        "{}-{}-{}",
        &digits[..4],
        &digits[4..6],
        &digits[6..8]
    ))
}

/// What kind of cover, if any, ended up in the EPUB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverKind {
    /// Thumbnail rendered from the first PDF page.
    Generated,
    /// User-supplied image embedded as-is.
    Custom,
    /// No cover (generation failed or page 1 unavailable).
    None,
}

/// Statistics describing a single conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages in the source PDF.
    pub total_pages: usize,
    /// Pages the [`crate::config::PageSelection`] picked.
    pub selected_pages: usize,
    /// Pages whose text extraction succeeded with non-empty text.
    pub extracted_pages: usize,
    /// Pages that extracted successfully but contained no text.
    pub empty_pages: usize,
    /// Pages whose extraction failed outright.
    pub failed_pages: usize,
    /// Total characters of cleaned text across all chapters.
    pub total_chars: usize,
    /// Which cover ended up in the book.
    pub cover: CoverKind,
    /// Size of the produced EPUB in bytes.
    pub epub_bytes: usize,
    /// Wall-clock duration of the whole conversion.
    pub total_duration_ms: u64,
    /// Time spent in pdfium extraction (text + metadata + cover render).
    pub extract_duration_ms: u64,
    /// Time spent assembling and zipping the EPUB container.
    pub package_duration_ms: u64,
}

/// The result of a successful conversion.
///
/// "Successful" means an EPUB was produced; individual pages may still have
/// failed (`stats.failed_pages > 0`). Use [`ConversionOutput::into_result`]
/// to treat any page failure as a hard error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The complete EPUB container, ready to be written to disk.
    #[serde(skip)]
    pub epub: Vec<u8>,
    /// Per-page extraction results, sorted by page number.
    pub pages: Vec<PageText>,
    /// Raw metadata read from the PDF.
    pub document: DocumentMetadata,
    /// Resolved metadata written into the EPUB.
    pub book: BookMetadata,
    /// Run statistics.
    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Strict view: `Err` if any selected page failed to extract.
    pub fn into_result(self) -> Result<Self, Pdf2EpubError> {
        if self.stats.failed_pages > 0 {
            return Err(Pdf2EpubError::PagesFailed {
                failed: self.stats.failed_pages,
                total: self.stats.selected_pages,
            });
        }
        Ok(self)
    }
}

/// Outcome of one file within a batch run.
#[derive(Debug)]
pub struct BatchItem {
    /// The input PDF path.
    pub input: std::path::PathBuf,
    /// The output EPUB path (set even on failure, for reporting).
    pub output: std::path::PathBuf,
    /// Stats on success, the fatal error otherwise.
    pub result: Result<ConversionStats, Pdf2EpubError>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn doc_with(title: Option<&str>, author: Option<&str>) -> DocumentMetadata {
        DocumentMetadata {
            title: title.map(String::from),
            author: author.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn title_falls_back_to_file_stem() {
        let meta = BookMetadata::resolve(
            &doc_with(None, None),
            &BTreeMap::new(),
            Path::new("/books/annual report.pdf"),
            "en",
        );
        assert_eq!(meta.title, "annual report");
        assert_eq!(meta.author, "Unknown");
    }

    #[test]
    fn override_beats_pdf_metadata() {
        let mut overrides = BTreeMap::new();
        overrides.insert("title".to_string(), "Better Title".to_string());
        let meta = BookMetadata::resolve(
            &doc_with(Some("PDF Title"), Some("PDF Author")),
            &overrides,
            Path::new("x.pdf"),
            "en",
        );
        assert_eq!(meta.title, "Better Title");
        assert_eq!(meta.author, "PDF Author");
    }

    #[test]
    fn blank_pdf_title_is_ignored() {
        let meta = BookMetadata::resolve(
            &doc_with(Some("   "), None),
            &BTreeMap::new(),
            Path::new("real-name.pdf"),
            "en",
        );
        assert_eq!(meta.title, "real-name");
    }

    #[test]
    fn identifier_is_urn_uuid_unless_overridden() {
        let meta = BookMetadata::resolve(
            &doc_with(None, None),
            &BTreeMap::new(),
            Path::new("x.pdf"),
            "en",
        );
        assert!(meta.identifier.starts_with("urn:uuid:"));

        let mut overrides = BTreeMap::new();
        overrides.insert("identifier".to_string(), "isbn:123".to_string());
        let meta =
            BookMetadata::resolve(&doc_with(None, None), &overrides, Path::new("x.pdf"), "en");
        assert_eq!(meta.identifier, "isbn:123");
    }

    #[test]
    fn unconsumed_overrides_become_extra_elements() {
        let mut overrides = BTreeMap::new();
        overrides.insert("publisher".to_string(), "ACME".to_string());
        overrides.insert("title".to_string(), "T".to_string());
        let meta =
            BookMetadata::resolve(&doc_with(None, None), &overrides, Path::new("x.pdf"), "en");
        assert_eq!(meta.extra, vec![("publisher".to_string(), "ACME".to_string())]);
    }

    #[test]
    fn pdf_dates_are_normalised() {
        assert_eq!(
            normalise_pdf_date("D:20240131120000Z"),
            Some("2024-01-31".to_string())
        );
        assert_eq!(normalise_pdf_date("2024"), None);
        assert_eq!(normalise_pdf_date("D:garbage"), None);
    }

    #[test]
    fn into_result_rejects_failed_pages() {
        let output = ConversionOutput {
            epub: vec![],
            pages: vec![],
            document: DocumentMetadata::default(),
            book: BookMetadata::resolve(
                &DocumentMetadata::default(),
                &BTreeMap::new(),
                &PathBuf::from("x.pdf"),
                "en",
            ),
            stats: ConversionStats {
                total_pages: 3,
                selected_pages: 3,
                extracted_pages: 2,
                empty_pages: 0,
                failed_pages: 1,
                total_chars: 100,
                cover: CoverKind::None,
                epub_bytes: 0,
                total_duration_ms: 0,
                extract_duration_ms: 0,
                package_duration_ms: 0,
            },
        };
        assert!(matches!(
            output.into_result(),
            Err(Pdf2EpubError::PagesFailed { failed: 1, total: 3 })
        ));
    }
}
