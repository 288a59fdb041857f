//! Configuration types for PDF-to-EPUB conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share a config across a whole batch run, serialise it for
//! logging, and diff two runs to understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::Pdf2EpubError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Configuration for a PDF-to-EPUB conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use pdf2epub::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .cover_dpi(150)
///     .language("fr")
///     .metadata_pair("title", "Mon Livre")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising page 1 for the cover. Range: 72–400. Default: 150.
    ///
    /// 150 DPI produces a cover that is sharp on e-reader screens while
    /// keeping the embedded JPEG well under 1 MB. Increase to 200–300 for
    /// covers with fine artwork; decrease to 96 when file size matters more.
    pub cover_dpi: u32,

    /// Maximum cover dimension (width or height) in pixels. Default: 2000.
    ///
    /// A safety cap independent of DPI. A 300-DPI render of an A0 poster
    /// could produce a 10 000+ px image and exhaust memory. This field caps
    /// either dimension, scaling the other proportionally.
    pub max_cover_pixels: u32,

    /// JPEG quality for the generated cover thumbnail (1–100). Default: 85.
    ///
    /// 85 is visually indistinguishable from lossless for rendered page art
    /// at typical e-reader resolutions, at roughly a third of the file size.
    pub cover_quality: u8,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Path to a custom cover image (JPEG or PNG) embedded instead of the
    /// rendered first-page thumbnail.
    pub custom_cover: Option<PathBuf>,

    /// Page selection. Default: All pages.
    pub pages: PageSelection,

    /// Chapter granularity. Default: one chapter per PDF page.
    pub chapters: ChapterMode,

    /// Book language (BCP 47 tag) for `dc:language` and `xml:lang`. Default: "en".
    pub language: String,

    /// Dublin Core metadata overrides, keyed by lowercased element name
    /// (`title`, `author`, `date`, `description`, …).
    ///
    /// Overrides win over metadata read from the PDF, which in turn wins
    /// over the built-in fallbacks (file stem as title, "Unknown" author).
    pub metadata: BTreeMap<String, String>,

    /// Custom CSS replacing [`crate::style::DEFAULT_STYLESHEET`].
    pub stylesheet: Option<String>,

    /// Optional callback receiving per-file events during batch conversion.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            cover_dpi: 150,
            max_cover_pixels: 2000,
            cover_quality: 85,
            password: None,
            custom_cover: None,
            pages: PageSelection::default(),
            chapters: ChapterMode::default(),
            language: "en".to_string(),
            metadata: BTreeMap::new(),
            stylesheet: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("cover_dpi", &self.cover_dpi)
            .field("max_cover_pixels", &self.max_cover_pixels)
            .field("cover_quality", &self.cover_quality)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("custom_cover", &self.custom_cover)
            .field("pages", &self.pages)
            .field("chapters", &self.chapters)
            .field("language", &self.language)
            .field("metadata", &self.metadata)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn callback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn cover_dpi(mut self, dpi: u32) -> Self {
        self.config.cover_dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_cover_pixels(mut self, px: u32) -> Self {
        self.config.max_cover_pixels = px.max(100);
        self
    }

    pub fn cover_quality(mut self, q: u8) -> Self {
        self.config.cover_quality = q.clamp(1, 100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn custom_cover(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.custom_cover = Some(path.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    pub fn chapters(mut self, mode: ChapterMode) -> Self {
        self.config.chapters = mode;
        self
    }

    pub fn language(mut self, lang: impl Into<String>) -> Self {
        self.config.language = lang.into();
        self
    }

    /// Add one Dublin Core override; the key is lowercased.
    pub fn metadata_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config
            .metadata
            .insert(key.into().to_lowercase(), value.into());
        self
    }

    /// Replace all Dublin Core overrides at once.
    pub fn metadata(mut self, pairs: BTreeMap<String, String>) -> Self {
        self.config.metadata = pairs
            .into_iter()
            .map(|(k, v)| (k.to_lowercase(), v))
            .collect();
        self
    }

    pub fn stylesheet(mut self, css: impl Into<String>) -> Self {
        self.config.stylesheet = Some(css.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Pdf2EpubError> {
        let c = &self.config;
        if c.cover_dpi < 72 || c.cover_dpi > 400 {
            return Err(Pdf2EpubError::InvalidConfig(format!(
                "cover DPI must be 72–400, got {}",
                c.cover_dpi
            )));
        }
        if c.cover_quality == 0 || c.cover_quality > 100 {
            return Err(Pdf2EpubError::InvalidConfig(format!(
                "cover quality must be 1–100, got {}",
                c.cover_quality
            )));
        }
        if c.language.trim().is_empty() {
            return Err(Pdf2EpubError::InvalidConfig(
                "language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// Specifies which pages of the PDF become chapters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Convert all pages (default).
    #[default]
    All,
    /// Convert a single page (1-indexed).
    Single(usize),
    /// Convert a contiguous range of pages (1-indexed, inclusive).
    Range(usize, usize),
    /// Convert specific pages (1-indexed, deduplicated).
    Set(Vec<usize>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 0-indexed page numbers.
    pub fn to_indices(&self, total_pages: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = match self {
            PageSelection::All => (0..total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![p - 1]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1) - 1;
                let e = (*end).min(total_pages);
                (s..e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .filter(|&&p| p >= 1 && p <= total_pages)
                .map(|p| p - 1)
                .collect(),
        };
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}

/// How extracted text is divided into XHTML chapters.
///
/// Per-page chapters give readers a real table of contents and let EPUB
/// engines lazy-load content, which matters for long documents. A single
/// chapter reproduces the flat structure most PDF-to-EPUB tools emit and
/// suits short documents where a page-based TOC is noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChapterMode {
    /// One XHTML chapter per selected PDF page (default).
    #[default]
    PerPage,
    /// All extracted text concatenated into a single "Content" chapter.
    Single,
}

/// Parse CLI-style `key=value` metadata pairs into an override map.
///
/// Keys are lowercased so `Title=` and `title=` collide deliberately.
/// A pair without `=` is rejected rather than silently dropped.
pub fn parse_metadata_pairs(
    pairs: &[String],
) -> Result<BTreeMap<String, String>, Pdf2EpubError> {
    let mut map = BTreeMap::new();
    for pair in pairs {
        match pair.split_once('=') {
            Some((k, v)) if !k.trim().is_empty() => {
                map.insert(k.trim().to_lowercase(), v.to_string());
            }
            _ => {
                return Err(Pdf2EpubError::InvalidMetadataPair { pair: pair.clone() });
            }
        }
    }
    Ok(map)
}
