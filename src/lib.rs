//! # pdf2epub
//!
//! Convert PDF documents to EPUB e-books, with a cover thumbnail generated
//! from the first page.
//!
//! ## Why this crate?
//!
//! PDFs are fixed-layout: on a small e-reader screen they force panning and
//! zooming. This crate extracts the text layer, cleans up the extraction
//! artefacts (hyphenated line breaks, control characters, layout spacing),
//! and repackages the content as a reflowable EPUB 3 — with the first page
//! rasterised into a proper cover so the book is recognisable in a library
//! view.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input        validate path and %PDF magic bytes
//!  ├─ 2. Extract      metadata + per-page text via pdfium
//!  ├─ 3. Cover        rasterise page 1 → JPEG (or embed a custom image)
//!  ├─ 4. Postprocess  deterministic text cleanup (dehyphenation, whitespace)
//!  ├─ 5. Assemble     escaped XHTML chapters + placeholder for empty pages
//!  └─ 6. Package      OCF container: OPF, NCX, nav, stylesheet, cover
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf2epub::{convert_to_file, ConversionConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let stats = convert_to_file("document.pdf", "document.epub", &config)?;
//!     eprintln!(
//!         "{}/{} pages, {} bytes",
//!         stats.extracted_pages, stats.selected_pages, stats.epub_bytes
//!     );
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2epub` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdf2epub = { version = "0.2", default-features = false }
//! ```
//!
//! ## Runtime requirement
//!
//! Rendering and text extraction use the pdfium library, resolved at runtime
//! from `PDFIUM_LIB_PATH`, the current directory, or the system library path.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod style;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    parse_metadata_pairs, ChapterMode, ConversionConfig, ConversionConfigBuilder, PageSelection,
};
pub use convert::{convert, convert_batch, convert_to_file, default_output_path, inspect};
pub use error::{PageError, Pdf2EpubError};
pub use output::{
    BatchItem, BookMetadata, ConversionOutput, ConversionStats, CoverKind, DocumentMetadata,
    PageText,
};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
