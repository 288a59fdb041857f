//! Conversion entry points.
//!
//! [`convert`] produces the EPUB in memory; [`convert_to_file`] writes it to
//! disk atomically; [`convert_batch`] runs a list of files sequentially with
//! per-file try/log semantics — one corrupt PDF never aborts the rest of the
//! batch. [`inspect`] reads metadata without converting anything.

use crate::config::{ChapterMode, ConversionConfig, PageSelection};
use crate::error::Pdf2EpubError;
use crate::output::{
    BatchItem, BookMetadata, ConversionOutput, ConversionStats, CoverKind, DocumentMetadata,
};
use crate::pipeline::{assemble, cover, extract, input, package, postprocess};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Convert a PDF file to an in-memory EPUB.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ConversionOutput)` on success, even if some pages failed to extract
/// (check `output.stats.failed_pages`, or call
/// [`ConversionOutput::into_result`] for strict handling).
///
/// # Errors
/// Returns `Err(Pdf2EpubError)` only for fatal errors:
/// - File not found / permission denied / not a PDF
/// - Missing or wrong password
/// - A custom cover that cannot be read
/// - Packaging failure
pub fn convert(
    input_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Pdf2EpubError> {
    let total_start = Instant::now();
    let input_path = input_path.as_ref();
    info!("Starting conversion: {}", input_path.display());

    // ── Step 1: Resolve and validate input ───────────────────────────────
    let pdf_path = input::resolve_input(input_path)?;

    // ── Step 2: Load the document ────────────────────────────────────────
    let extract_start = Instant::now();
    let pdfium = extract::bind_pdfium()?;
    let (document, encrypted) = extract::load_document_detecting_encryption(
        &pdfium,
        &pdf_path,
        config.password.as_deref(),
    )?;

    // ── Step 3: Read metadata ────────────────────────────────────────────
    let doc_meta = extract::document_metadata(&document, encrypted);
    let total_pages = doc_meta.page_count;
    info!("PDF has {} pages", total_pages);

    // ── Step 4: Compute page indices ─────────────────────────────────────
    let page_indices = config.pages.to_indices(total_pages);
    if page_indices.is_empty() {
        // Report the highest requested page so the error names the culprit.
        let requested = match &config.pages {
            PageSelection::Single(p) => *p,
            PageSelection::Range(start, _) => *start,
            PageSelection::Set(pages) => pages.iter().copied().max().unwrap_or(0),
            PageSelection::All => 0,
        };
        return Err(Pdf2EpubError::PageOutOfRange {
            page: requested,
            total: total_pages,
        });
    }
    debug!("Selected {} pages for conversion", page_indices.len());

    // ── Step 5: Extract and clean page text ──────────────────────────────
    let mut pages = extract::extract_pages(&document, &page_indices);
    for page in &mut pages {
        if page.error.is_none() {
            page.text = postprocess::clean_text(&page.text);
        }
    }
    pages.sort_by_key(|p| p.page_num);

    // ── Step 6: Cover — custom image, or first-page thumbnail ────────────
    let (cover_image, cover_kind) = match config.custom_cover {
        Some(ref path) => {
            let img = cover::load_custom_cover(path)?;
            info!("Using custom cover image: {}", path.display());
            (Some(img), CoverKind::Custom)
        }
        None => match cover::generate_cover(&document, config) {
            Ok(img) => (Some(img), CoverKind::Generated),
            Err(e) => {
                // A book without a cover is still a book.
                warn!("Cover generation failed, continuing without cover: {}", e);
                (None, CoverKind::None)
            }
        },
    };
    let extract_duration_ms = extract_start.elapsed().as_millis() as u64;

    // ── Step 7: Resolve book metadata ────────────────────────────────────
    let book = BookMetadata::resolve(&doc_meta, &config.metadata, &pdf_path, &config.language);

    // ── Step 8: Assemble chapters ────────────────────────────────────────
    let package_start = Instant::now();
    let chapters = assemble::build_chapters(&pages, config.chapters, &book.language);
    if chapters.is_empty() && config.chapters == ChapterMode::PerPage {
        // Every selected page failed; fall back to a single placeholder
        // chapter so the output is still a readable EPUB.
        warn!("All {} selected pages failed to extract", pages.len());
    }

    // ── Step 9: Package the EPUB container ───────────────────────────────
    let stylesheet = config
        .stylesheet
        .as_deref()
        .unwrap_or(crate::style::DEFAULT_STYLESHEET);
    let chapters = if chapters.is_empty() {
        assemble::build_chapters(
            &[crate::output::PageText {
                page_num: 1,
                text: String::new(),
                error: None,
            }],
            ChapterMode::Single,
            &book.language,
        )
    } else {
        chapters
    };
    let epub = package::package_epub(&book, &chapters, cover_image.as_ref(), stylesheet)?;
    let package_duration_ms = package_start.elapsed().as_millis() as u64;

    // ── Step 10: Compute stats ───────────────────────────────────────────
    let failed = pages.iter().filter(|p| p.error.is_some()).count();
    let empty = pages.iter().filter(|p| p.is_empty()).count();
    let extracted = pages.len() - failed - empty;
    let total_chars = pages.iter().map(|p| p.text.chars().count()).sum();

    let stats = ConversionStats {
        total_pages,
        selected_pages: page_indices.len(),
        extracted_pages: extracted,
        empty_pages: empty,
        failed_pages: failed,
        total_chars,
        cover: cover_kind,
        epub_bytes: epub.len(),
        total_duration_ms: total_start.elapsed().as_millis() as u64,
        extract_duration_ms,
        package_duration_ms,
    };

    info!(
        "Conversion complete: {}/{} pages, {} bytes EPUB, {}ms total",
        extracted + empty,
        page_indices.len(),
        stats.epub_bytes,
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        epub,
        pages,
        document: doc_meta,
        book,
        stats,
    })
}

/// Convert a PDF and write the EPUB to `output_path`.
///
/// Uses an atomic write (temp file in the target directory + rename) so a
/// crash never leaves a truncated `.epub` behind.
pub fn convert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionStats, Pdf2EpubError> {
    let output = convert(input_path, config)?;
    let path = output_path.as_ref();

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| Pdf2EpubError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    // Temp file in the same directory so the final rename stays on one
    // filesystem and remains atomic.
    let tmp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| {
        Pdf2EpubError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;
    std::fs::write(tmp.path(), &output.epub).map_err(|e| Pdf2EpubError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    tmp.persist(path)
        .map_err(|e| Pdf2EpubError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e.error,
        })?;

    info!("EPUB saved: {}", path.display());
    Ok(output.stats)
}

/// Convert many PDFs sequentially, one output file per input file.
///
/// Failures are logged and recorded in the returned
/// [`BatchItem`] list; the batch itself never fails. Output paths are
/// derived with [`default_output_path`].
pub fn convert_batch(inputs: &[PathBuf], config: &ConversionConfig) -> Vec<BatchItem> {
    let total = inputs.len();
    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(total);
    }

    let mut items = Vec::with_capacity(total);
    let mut succeeded = 0usize;

    for (i, input_path) in inputs.iter().enumerate() {
        let file_num = i + 1;
        let output_path = default_output_path(input_path);

        if let Some(ref cb) = config.progress_callback {
            cb.on_file_start(file_num, total, &input_path.display().to_string());
        }

        let result = convert_to_file(input_path, &output_path, config);
        match &result {
            Ok(stats) => {
                succeeded += 1;
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_complete(file_num, total, stats.epub_bytes);
                }
            }
            Err(e) => {
                error!("Failed to convert '{}': {}", input_path.display(), e);
                if let Some(ref cb) = config.progress_callback {
                    cb.on_file_error(file_num, total, &e.to_string());
                }
            }
        }

        items.push(BatchItem {
            input: input_path.clone(),
            output: output_path,
            result,
        });
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(total, succeeded);
    }

    items
}

/// Extract PDF metadata without converting content.
pub fn inspect(input_path: impl AsRef<Path>) -> Result<DocumentMetadata, Pdf2EpubError> {
    let pdf_path = input::resolve_input(input_path)?;
    extract::extract_metadata(&pdf_path, None)
}

/// Derive the default output path: the input with an `.epub` extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("epub")
}
