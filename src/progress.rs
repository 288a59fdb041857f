//! Progress-callback trait for per-file batch events.
//!
//! Inject an [`Arc<dyn ConversionProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as [`crate::convert::convert_batch`] works through its inputs.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a log file, a GUI, or a terminal progress bar without
//! the library knowing anything about how the host application communicates.
//! The trait is `Send + Sync` so the same callback can be shared with other
//! threads that observe the run.

use std::sync::Arc;

/// Called by [`crate::convert::convert_batch`] as it processes each file.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Batch conversion is sequential, so calls for one
/// run never overlap; implementations still must be `Send + Sync` because
/// the callback is stored in the shareable [`crate::config::ConversionConfig`].
pub trait ConversionProgressCallback: Send + Sync {
    /// Called once before any file is converted.
    fn on_batch_start(&self, total_files: usize) {
        let _ = total_files;
    }

    /// Called just before conversion of a file begins.
    ///
    /// `file_num` is 1-indexed.
    fn on_file_start(&self, file_num: usize, total_files: usize, input: &str) {
        let _ = (file_num, total_files, input);
    }

    /// Called when a file converted successfully.
    ///
    /// `epub_bytes` is the size of the EPUB written for it.
    fn on_file_complete(&self, file_num: usize, total_files: usize, epub_bytes: usize) {
        let _ = (file_num, total_files, epub_bytes);
    }

    /// Called when a file failed to convert (the batch continues).
    fn on_file_error(&self, file_num: usize, total_files: usize, error: &str) {
        let _ = (file_num, total_files, error);
    }

    /// Called once after all files have been attempted.
    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let _ = (total_files, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ConversionProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn ConversionProgressCallback>;
