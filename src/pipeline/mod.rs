//! Pipeline stages for PDF-to-EPUB conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the PDF backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ postprocess ──▶ assemble ──▶ package
//! (path)    (pdfium)    (cleanup)       (XHTML)      (EPUB zip)
//!               │
//!               └─▶ cover  (page 1 → JPEG thumbnail, or custom image)
//! ```
//!
//! 1. [`input`]   — validate the user-supplied path (existence, permission,
//!    `%PDF` magic bytes)
//! 2. [`extract`] — read document metadata and per-page text via pdfium
//! 3. [`cover`]   — rasterise page 1 into a JPEG thumbnail, or load the
//!    user-supplied cover image
//! 4. [`postprocess`] — deterministic cleanup of extraction artefacts
//!    (soft hyphens, control characters, broken line wraps)
//! 5. [`assemble`] — escape and wrap cleaned text into XHTML chapters
//! 6. [`package`] — write the OCF container: mimetype, OPF, NCX, nav,
//!    stylesheet, chapters, cover

pub mod assemble;
pub mod cover;
pub mod extract;
pub mod input;
pub mod package;
pub mod postprocess;
