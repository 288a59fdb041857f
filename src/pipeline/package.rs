//! EPUB packaging: chapters + cover + metadata → OCF zip container.
//!
//! ## Container invariants
//!
//! The EPUB OCF spec constrains the zip layout in ways ordinary archives do
//! not: `mimetype` must be the *first* entry, *uncompressed*, with no extra
//! field, so reader apps can identify the format from the first 58 bytes.
//! Everything else is deflated. Every manifest item href corresponds to an
//! entry in the archive, and every spine idref to a manifest item — the
//! packaging tests read the archive back and check exactly that.
//!
//! ## Why hand-built XML?
//!
//! The OPF/NCX/nav documents are small, fixed-shape, and write-only; a
//! template with an escape helper is easier to audit against the spec than
//! an XML-builder API, and it keeps the dependency surface at just `zip`.

use crate::error::Pdf2EpubError;
use crate::output::BookMetadata;
use crate::pipeline::assemble::{xml_escape, Chapter};
use crate::pipeline::cover::CoverImage;
use std::io::{Cursor, Write};
use tracing::{debug, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Dublin Core 1.1 element names accepted as `dc:*` metadata.
///
/// The resolved core fields (title, creator, language, identifier, date,
/// description) are emitted separately; this list covers user-supplied
/// extras. Anything else becomes a generic `<meta name=…>` so arbitrary
/// `-m key=value` pairs are never silently dropped.
const DC_ELEMENTS: &[&str] = &[
    "subject",
    "publisher",
    "contributor",
    "type",
    "format",
    "source",
    "relation",
    "coverage",
    "rights",
];

/// Assemble the complete EPUB container in memory.
pub fn package_epub(
    book: &BookMetadata,
    chapters: &[Chapter],
    cover: Option<&CoverImage>,
    stylesheet: &str,
) -> Result<Vec<u8>, Pdf2EpubError> {
    if chapters.is_empty() {
        return Err(Pdf2EpubError::EpubPackagingFailed(
            "no chapters to package".into(),
        ));
    }

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    // mimetype MUST be first and stored uncompressed.
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_file(&mut zip, "mimetype", b"application/epub+zip", stored)?;
    add_file(
        &mut zip,
        "META-INF/container.xml",
        CONTAINER_XML.as_bytes(),
        deflated,
    )?;
    add_file(
        &mut zip,
        "OEBPS/content.opf",
        build_opf(book, chapters, cover).as_bytes(),
        deflated,
    )?;
    add_file(
        &mut zip,
        "OEBPS/toc.ncx",
        build_ncx(book, chapters).as_bytes(),
        deflated,
    )?;
    add_file(
        &mut zip,
        "OEBPS/nav.xhtml",
        build_nav(book, chapters).as_bytes(),
        deflated,
    )?;
    add_file(
        &mut zip,
        "OEBPS/style/stylesheet.css",
        stylesheet.as_bytes(),
        deflated,
    )?;

    if let Some(cover) = cover {
        add_file(
            &mut zip,
            &format!("OEBPS/{}", cover.file_name),
            &cover.data,
            deflated,
        )?;
        add_file(
            &mut zip,
            "OEBPS/cover.xhtml",
            build_cover_page(book, cover).as_bytes(),
            deflated,
        )?;
    }

    for chapter in chapters {
        add_file(
            &mut zip,
            &format!("OEBPS/{}", chapter.file_name),
            chapter.xhtml.as_bytes(),
            deflated,
        )?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| Pdf2EpubError::EpubPackagingFailed(e.to_string()))?;
    let bytes = cursor.into_inner();
    debug!(
        "Packaged EPUB: {} chapters, {} bytes",
        chapters.len(),
        bytes.len()
    );
    Ok(bytes)
}

fn add_file(
    zip: &mut ZipWriter<Cursor<Vec<u8>>>,
    name: &str,
    data: &[u8],
    options: SimpleFileOptions,
) -> Result<(), Pdf2EpubError> {
    zip.start_file(name, options)
        .map_err(|e| Pdf2EpubError::EpubPackagingFailed(format!("{name}: {e}")))?;
    zip.write_all(data)
        .map_err(|e| Pdf2EpubError::EpubPackagingFailed(format!("{name}: {e}")))?;
    Ok(())
}

const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#;

/// Chapter file name → manifest item id (`page_0001.xhtml` → `page_0001`).
fn chapter_id(chapter: &Chapter) -> String {
    chapter
        .file_name
        .trim_end_matches(".xhtml")
        .replace('/', "-")
}

fn build_opf(book: &BookMetadata, chapters: &[Chapter], cover: Option<&CoverImage>) -> String {
    let modified = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    let mut opf = String::with_capacity(2048);
    opf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    opf.push_str(&format!(
        "<package xmlns=\"http://www.idpf.org/2007/opf\" version=\"3.0\" \
         unique-identifier=\"book-id\" xml:lang=\"{}\">\n",
        xml_escape(&book.language)
    ));

    // ── Metadata ─────────────────────────────────────────────────────────
    opf.push_str("  <metadata xmlns:dc=\"http://purl.org/dc/elements/1.1/\">\n");
    opf.push_str(&format!(
        "    <dc:identifier id=\"book-id\">{}</dc:identifier>\n",
        xml_escape(&book.identifier)
    ));
    opf.push_str(&format!(
        "    <dc:title>{}</dc:title>\n",
        xml_escape(&book.title)
    ));
    opf.push_str(&format!(
        "    <dc:creator>{}</dc:creator>\n",
        xml_escape(&book.author)
    ));
    opf.push_str(&format!(
        "    <dc:language>{}</dc:language>\n",
        xml_escape(&book.language)
    ));
    opf.push_str(&format!(
        "    <meta property=\"dcterms:modified\">{}</meta>\n",
        modified
    ));
    if let Some(ref date) = book.date {
        opf.push_str(&format!("    <dc:date>{}</dc:date>\n", xml_escape(date)));
    }
    if let Some(ref desc) = book.description {
        opf.push_str(&format!(
            "    <dc:description>{}</dc:description>\n",
            xml_escape(desc)
        ));
    }
    for (key, value) in &book.extra {
        if DC_ELEMENTS.contains(&key.as_str()) {
            opf.push_str(&format!(
                "    <dc:{key}>{}</dc:{key}>\n",
                xml_escape(value)
            ));
        } else {
            warn!("Metadata key '{}' is not a Dublin Core element; emitting as <meta>", key);
            opf.push_str(&format!(
                "    <meta name=\"{}\" content=\"{}\"/>\n",
                xml_escape(key),
                xml_escape(value)
            ));
        }
    }
    if cover.is_some() {
        // EPUB 2 reader compatibility; EPUB 3 uses the manifest property.
        opf.push_str("    <meta name=\"cover\" content=\"cover-image\"/>\n");
    }
    opf.push_str("  </metadata>\n");

    // ── Manifest ─────────────────────────────────────────────────────────
    opf.push_str("  <manifest>\n");
    opf.push_str(
        "    <item id=\"nav\" href=\"nav.xhtml\" media-type=\"application/xhtml+xml\" properties=\"nav\"/>\n",
    );
    opf.push_str(
        "    <item id=\"ncx\" href=\"toc.ncx\" media-type=\"application/x-dtbncx+xml\"/>\n",
    );
    opf.push_str(
        "    <item id=\"css\" href=\"style/stylesheet.css\" media-type=\"text/css\"/>\n",
    );
    if let Some(cover) = cover {
        opf.push_str(&format!(
            "    <item id=\"cover-image\" href=\"{}\" media-type=\"{}\" properties=\"cover-image\"/>\n",
            cover.file_name, cover.media_type
        ));
        opf.push_str(
            "    <item id=\"cover-page\" href=\"cover.xhtml\" media-type=\"application/xhtml+xml\"/>\n",
        );
    }
    for chapter in chapters {
        opf.push_str(&format!(
            "    <item id=\"{}\" href=\"{}\" media-type=\"application/xhtml+xml\"/>\n",
            chapter_id(chapter),
            xml_escape(&chapter.file_name)
        ));
    }
    opf.push_str("  </manifest>\n");

    // ── Spine ────────────────────────────────────────────────────────────
    opf.push_str("  <spine toc=\"ncx\">\n");
    if cover.is_some() {
        opf.push_str("    <itemref idref=\"cover-page\" linear=\"no\"/>\n");
    }
    opf.push_str("    <itemref idref=\"nav\" linear=\"no\"/>\n");
    for chapter in chapters {
        opf.push_str(&format!(
            "    <itemref idref=\"{}\"/>\n",
            chapter_id(chapter)
        ));
    }
    opf.push_str("  </spine>\n");
    opf.push_str("</package>\n");
    opf
}

fn build_ncx(book: &BookMetadata, chapters: &[Chapter]) -> String {
    let mut ncx = String::with_capacity(1024);
    ncx.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    ncx.push_str(
        "<ncx xmlns=\"http://www.daisy.org/z3986/2005/ncx/\" version=\"2005-1\">\n",
    );
    ncx.push_str("  <head>\n");
    ncx.push_str(&format!(
        "    <meta name=\"dtb:uid\" content=\"{}\"/>\n",
        xml_escape(&book.identifier)
    ));
    ncx.push_str("    <meta name=\"dtb:depth\" content=\"1\"/>\n");
    ncx.push_str("    <meta name=\"dtb:totalPageCount\" content=\"0\"/>\n");
    ncx.push_str("    <meta name=\"dtb:maxPageNumber\" content=\"0\"/>\n");
    ncx.push_str("  </head>\n");
    ncx.push_str(&format!(
        "  <docTitle><text>{}</text></docTitle>\n",
        xml_escape(&book.title)
    ));
    ncx.push_str("  <navMap>\n");
    for (i, chapter) in chapters.iter().enumerate() {
        let order = i + 1;
        ncx.push_str(&format!(
            "    <navPoint id=\"navpoint-{order}\" playOrder=\"{order}\">\n"
        ));
        ncx.push_str(&format!(
            "      <navLabel><text>{}</text></navLabel>\n",
            xml_escape(&chapter.title)
        ));
        ncx.push_str(&format!(
            "      <content src=\"{}\"/>\n",
            xml_escape(&chapter.file_name)
        ));
        ncx.push_str("    </navPoint>\n");
    }
    ncx.push_str("  </navMap>\n");
    ncx.push_str("</ncx>\n");
    ncx
}

fn build_nav(book: &BookMetadata, chapters: &[Chapter]) -> String {
    let mut nav = String::with_capacity(1024);
    nav.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    nav.push_str("<!DOCTYPE html>\n");
    nav.push_str(&format!(
        "<html xmlns=\"http://www.w3.org/1999/xhtml\" \
         xmlns:epub=\"http://www.idpf.org/2007/ops\" xml:lang=\"{}\">\n",
        xml_escape(&book.language)
    ));
    nav.push_str("<head>\n");
    nav.push_str(&format!("  <title>{}</title>\n", xml_escape(&book.title)));
    nav.push_str(
        "  <link rel=\"stylesheet\" type=\"text/css\" href=\"style/stylesheet.css\"/>\n",
    );
    nav.push_str("</head>\n<body>\n");
    nav.push_str("  <nav epub:type=\"toc\" id=\"toc\">\n");
    nav.push_str("    <h1>Contents</h1>\n    <ol>\n");
    for chapter in chapters {
        nav.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            xml_escape(&chapter.file_name),
            xml_escape(&chapter.title)
        ));
    }
    nav.push_str("    </ol>\n  </nav>\n");
    nav.push_str("</body>\n</html>\n");
    nav
}

fn build_cover_page(book: &BookMetadata, cover: &CoverImage) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\" xml:lang=\"{lang}\">\n\
         <head>\n\
         \x20 <title>Cover</title>\n\
         \x20 <link rel=\"stylesheet\" type=\"text/css\" href=\"style/stylesheet.css\"/>\n\
         </head>\n\
         <body class=\"cover\">\n\
         \x20 <img class=\"cover\" src=\"{src}\" alt=\"{alt}\"/>\n\
         </body>\n\
         </html>\n",
        lang = xml_escape(&book.language),
        src = cover.file_name,
        alt = xml_escape(&book.title)
    )
}
