//! Embedded stylesheet for generated EPUBs.
//!
//! Centralising the CSS here serves two purposes:
//!
//! 1. **Single source of truth** — tweaking the reading experience (margins,
//!    justification, cover sizing) means editing exactly one place.
//!
//! 2. **Testability** — packaging tests can assert the stylesheet lands in
//!    the container byte-for-byte without re-declaring it.
//!
//! Callers can override the sheet via
//! [`crate::config::ConversionConfigBuilder::stylesheet`]; the constant here
//! is used only when no override is provided.

/// Default stylesheet written to `OEBPS/style/stylesheet.css`.
///
/// Deliberately minimal: e-readers apply their own typography on top, and
/// heavy-handed CSS fights user font settings. Justified paragraphs with a
/// bottom margin mirror how print PDFs read; the cover rules keep the
/// thumbnail centred and fully visible on any screen size.
pub const DEFAULT_STYLESHEET: &str = "\
body {
    font-family: Arial, sans-serif;
    margin: 10px;
}
p {
    text-align: justify;
    margin-bottom: 1em;
}
body.cover {
    margin: 0;
    padding: 0;
    text-align: center;
}
img.cover {
    max-width: 100%;
    max-height: 100%;
}
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_covers_body_and_cover_rules() {
        assert!(DEFAULT_STYLESHEET.contains("body {"));
        assert!(DEFAULT_STYLESHEET.contains("text-align: justify"));
        assert!(DEFAULT_STYLESHEET.contains("img.cover"));
    }
}
