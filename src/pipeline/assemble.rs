//! Chapter assembly: cleaned page text → XHTML chapter documents.
//!
//! ## Paragraph model
//!
//! Extracted PDF text has two kinds of line break: hard breaks between
//! paragraphs (blank lines after cleanup) and soft breaks inside a paragraph
//! (where the PDF wrapped a line for layout). Blank-line-separated blocks
//! become `<p>` elements and soft breaks inside a block are joined with a
//! space, so text reflows properly on any screen width instead of preserving
//! the PDF's column shape.
//!
//! Pages whose extraction *failed* are omitted from the book; pages that
//! extracted successfully but contain no text (scanned pages) get a
//! placeholder paragraph so the spine stays aligned with the source pages.

use crate::config::ChapterMode;
use crate::output::PageText;

/// Placeholder for a page with no extractable text.
pub const EMPTY_PAGE_PLACEHOLDER: &str =
    "No textual content could be extracted from this PDF page.";

/// Placeholder for a document with no extractable text at all.
pub const EMPTY_DOCUMENT_PLACEHOLDER: &str =
    "No textual content could be extracted from this PDF.";

/// One XHTML content document in the EPUB.
#[derive(Debug, Clone)]
pub struct Chapter {
    /// Human-readable title used in the TOC and NCX.
    pub title: String,
    /// Path inside `OEBPS/`, e.g. `page_0001.xhtml`.
    pub file_name: String,
    /// Complete XHTML document.
    pub xhtml: String,
}

/// Build the chapter list from extracted pages.
pub fn build_chapters(pages: &[PageText], mode: ChapterMode, language: &str) -> Vec<Chapter> {
    match mode {
        ChapterMode::PerPage => pages
            .iter()
            .filter(|p| p.error.is_none())
            .map(|p| {
                let title = format!("Page {}", p.page_num);
                let body = if p.is_empty() {
                    EMPTY_PAGE_PLACEHOLDER.to_string()
                } else {
                    p.text.clone()
                };
                Chapter {
                    file_name: format!("page_{:04}.xhtml", p.page_num),
                    xhtml: chapter_xhtml(&title, language, &body),
                    title,
                }
            })
            .collect(),
        ChapterMode::Single => {
            let combined: String = pages
                .iter()
                .filter(|p| !p.is_empty() && p.error.is_none())
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            let body = if combined.trim().is_empty() {
                EMPTY_DOCUMENT_PLACEHOLDER.to_string()
            } else {
                combined
            };
            vec![Chapter {
                title: "Content".to_string(),
                file_name: "content.xhtml".to_string(),
                xhtml: chapter_xhtml("Content", language, &body),
            }]
        }
    }
}

/// Wrap body text into a complete XHTML document.
fn chapter_xhtml(title: &str, language: &str, body: &str) -> String {
    let mut doc = String::with_capacity(body.len() + 512);
    doc.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    doc.push_str("<!DOCTYPE html>\n");
    doc.push_str(&format!(
        "<html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"{}\">\n",
        xml_escape(language)
    ));
    doc.push_str("<head>\n");
    doc.push_str(&format!("  <title>{}</title>\n", xml_escape(title)));
    doc.push_str(
        "  <link rel=\"stylesheet\" type=\"text/css\" href=\"style/stylesheet.css\"/>\n",
    );
    doc.push_str("</head>\n<body>\n");
    for para in paragraphs(body) {
        doc.push_str(&format!("  <p>{}</p>\n", xml_escape(&para)));
    }
    doc.push_str("</body>\n</html>\n");
    doc
}

/// Split cleaned text into paragraphs: blank-line-separated blocks with
/// internal soft line breaks joined by a single space.
fn paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(|block| {
            block
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// Escape the five XML special characters.
///
/// Used for both element content and attribute values, so quotes are
/// escaped too.
pub fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageError;

    fn page(num: usize, text: &str) -> PageText {
        PageText {
            page_num: num,
            text: text.to_string(),
            error: None,
        }
    }

    fn failed_page(num: usize) -> PageText {
        PageText {
            page_num: num,
            text: String::new(),
            error: Some(PageError::ExtractionFailed {
                page: num,
                detail: "boom".into(),
            }),
        }
    }

    #[test]
    fn xml_escape_handles_all_five() {
        assert_eq!(
            xml_escape(r#"a & b < c > "d" 'e'"#),
            "a &amp; b &lt; c &gt; &quot;d&quot; &apos;e&apos;"
        );
    }

    #[test]
    fn paragraphs_join_soft_breaks() {
        let text = "first line\nof paragraph one\n\nparagraph two\n";
        assert_eq!(
            paragraphs(text),
            vec!["first line of paragraph one", "paragraph two"]
        );
    }

    #[test]
    fn per_page_mode_emits_one_chapter_per_page() {
        let pages = vec![page(1, "alpha\n"), page(2, "beta\n")];
        let chapters = build_chapters(&pages, ChapterMode::PerPage, "en");
        assert_eq!(chapters.len(), 2);
        assert_eq!(chapters[0].title, "Page 1");
        assert_eq!(chapters[0].file_name, "page_0001.xhtml");
        assert!(chapters[0].xhtml.contains("<p>alpha</p>"));
        assert_eq!(chapters[1].file_name, "page_0002.xhtml");
    }

    #[test]
    fn failed_pages_are_omitted() {
        let pages = vec![page(1, "alpha\n"), failed_page(2), page(3, "gamma\n")];
        let chapters = build_chapters(&pages, ChapterMode::PerPage, "en");
        let names: Vec<&str> = chapters.iter().map(|c| c.file_name.as_str()).collect();
        assert_eq!(names, vec!["page_0001.xhtml", "page_0003.xhtml"]);
    }

    #[test]
    fn empty_page_gets_placeholder() {
        let pages = vec![page(1, "  \n")];
        let chapters = build_chapters(&pages, ChapterMode::PerPage, "en");
        assert!(chapters[0].xhtml.contains(EMPTY_PAGE_PLACEHOLDER));
    }

    #[test]
    fn single_mode_combines_pages() {
        let pages = vec![page(1, "alpha\n"), page(2, "beta\n")];
        let chapters = build_chapters(&pages, ChapterMode::Single, "en");
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].file_name, "content.xhtml");
        assert!(chapters[0].xhtml.contains("<p>alpha</p>"));
        assert!(chapters[0].xhtml.contains("<p>beta</p>"));
    }

    #[test]
    fn single_mode_empty_document_gets_placeholder() {
        let pages = vec![page(1, ""), failed_page(2)];
        let chapters = build_chapters(&pages, ChapterMode::Single, "en");
        assert_eq!(chapters.len(), 1);
        assert!(chapters[0].xhtml.contains(EMPTY_DOCUMENT_PLACEHOLDER));
    }

    #[test]
    fn chapter_content_is_escaped() {
        let pages = vec![page(1, "AT&T <works>\n")];
        let chapters = build_chapters(&pages, ChapterMode::PerPage, "en");
        assert!(chapters[0].xhtml.contains("AT&amp;T &lt;works&gt;"));
        assert!(!chapters[0].xhtml.contains("AT&T"));
    }

    #[test]
    fn chapter_is_well_formed_xhtml_shell() {
        let pages = vec![page(1, "text\n")];
        let chapters = build_chapters(&pages, ChapterMode::PerPage, "de");
        let doc = &chapters[0].xhtml;
        assert!(doc.starts_with("<?xml version=\"1.0\""));
        assert!(doc.contains("xml:lang=\"de\""));
        assert!(doc.contains("href=\"style/stylesheet.css\""));
        assert!(doc.ends_with("</html>\n"));
    }
}
