//! CLI binary for pdf2epub.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, drives single or batch conversion, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2epub::{
    convert_batch, convert_to_file, inspect, parse_metadata_pairs,
    ChapterMode, ConversionConfig, ConversionProgressCallback, PageSelection, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-file log
/// lines using [indicatif]. Batch conversion is sequential, so at most one
/// file is in flight at a time.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Wall-clock start of the file currently being converted.
    current_start: Mutex<Option<Instant>>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            current_start: Mutex::new(None),
        })
    }

    fn elapsed_secs(&self) -> f64 {
        self.current_start
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Converting {total_files} PDF(s) to EPUB…"))
        ));
    }

    fn on_file_start(&self, _file_num: usize, _total: usize, input: &str) {
        *self.current_start.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(input.to_string());
    }

    fn on_file_complete(&self, file_num: usize, total: usize, epub_bytes: usize) {
        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            file_num,
            total,
            dim(&format!("{epub_bytes:>8} bytes")),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, file_num: usize, total: usize, error: &str) {
        // Truncate very long error messages to keep output tidy;
        // the full text already went to the log.
        let msg = truncate_error_line(error);

        self.bar.println(format!(
            "  {} File {:>3}/{:<3}  {}  {}",
            red("✗"),
            file_num,
            total,
            red(&msg),
            dim(&format!("{:.1}s", self.elapsed_secs())),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_files: usize, success_count: usize) {
        let failed = total_files.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} file(s) converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_files {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_files,
                red(&failed.to_string()),
            );
        }
    }
}

/// First line of an error message, truncated to at most 80 characters.
///
/// Truncation counts characters, not bytes, so multi-byte text (accented
/// file names, CJK titles) never splits mid-character.
fn truncate_error_line(error: &str) -> String {
    let first_line = error.lines().next().unwrap_or(error);
    if first_line.chars().count() > 80 {
        let cut: String = first_line.chars().take(79).collect();
        format!("{cut}\u{2026}")
    } else {
        first_line.to_string()
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (writes document.epub next to the input)
  pdf2epub document.pdf

  # Choose the output file
  pdf2epub document.pdf -o ~/books/document.epub

  # Batch convert a directory's worth of PDFs
  pdf2epub -b reports/*.pdf

  # Set title and author, add a publisher (input first: -m takes
  # everything after it as key=value pairs)
  pdf2epub report.pdf -m title="Annual Report" author="ACME Corp" publisher=ACME

  # Encrypted PDF
  pdf2epub -p s3cret locked.pdf

  # Use your own cover image instead of the rendered first page
  pdf2epub -t artwork.png novel.pdf

  # Only the first ten pages, as a single flowing chapter
  pdf2epub --pages 1-10 --single-chapter excerpt.pdf

  # Inspect PDF metadata without converting
  pdf2epub --inspect-only --json document.pdf

PDFIUM:
  Text extraction and cover rendering use the pdfium library. Install it from
  https://github.com/bblanchon/pdfium-binaries and either place libpdfium next
  to the pdf2epub binary or set PDFIUM_LIB_PATH=/path/to/its/directory.

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH       Directory containing the pdfium shared library
  PDF2EPUB_PASSWORD     Default PDF password
  PDF2EPUB_PAGES        Default page selection
  PDF2EPUB_LANGUAGE     Default book language
"#;

/// Convert PDF files to EPUB e-books with a first-page cover thumbnail.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2epub",
    version,
    about = "Convert PDF files to EPUB e-books with a first-page cover thumbnail",
    long_about = "Convert PDF documents to reflowable EPUB 3 e-books. Extracts the text layer, \
cleans up extraction artefacts, renders the first page into a cover thumbnail (or embeds a \
custom image), and maps PDF metadata onto Dublin Core.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// One or more PDF files to convert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output EPUB path (single input only; default: input with .epub extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Batch mode: convert every input to a sibling .epub file.
    ///
    /// Multiple inputs without -o behave the same way; the flag exists so
    /// scripts can state their intent explicitly.
    #[arg(short, long)]
    batch: bool,

    /// Metadata overrides in key=value form (e.g. title=MyBook author="Jane Doe").
    #[arg(short, long, num_args = 1.., value_name = "KEY=VALUE")]
    metadata: Vec<String>,

    /// Password if the PDF is encrypted.
    #[arg(short, long, env = "PDF2EPUB_PASSWORD")]
    password: Option<String>,

    /// Custom cover image (JPEG or PNG) embedded instead of the rendered first page.
    #[arg(short = 't', long = "thumbnail", value_name = "IMAGE")]
    thumbnail: Option<PathBuf>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2EPUB_PAGES", default_value = "all")]
    pages: String,

    /// Emit one flowing chapter instead of a chapter per PDF page.
    #[arg(long)]
    single_chapter: bool,

    /// Cover rendering DPI (72–400).
    #[arg(long, env = "PDF2EPUB_DPI", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=400))]
    dpi: u32,

    /// JPEG quality for the generated cover (1–100).
    #[arg(long, default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    cover_quality: u8,

    /// Book language (BCP 47 tag) for dc:language.
    #[arg(long, env = "PDF2EPUB_LANGUAGE", default_value = "en")]
    language: String,

    /// Print PDF metadata only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Output metadata as JSON (with --inspect-only).
    #[arg(long)]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDF2EPUB_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2EPUB_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2EPUB_QUIET")]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.inspect_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        for input in &cli.inputs {
            let meta = inspect(input)
                .with_context(|| format!("Failed to inspect {}", input.display()))?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
                );
            } else {
                println!("File:         {}", input.display());
                if let Some(ref t) = meta.title {
                    println!("Title:        {}", t);
                }
                if let Some(ref a) = meta.author {
                    println!("Author:       {}", a);
                }
                if let Some(ref s) = meta.subject {
                    println!("Subject:      {}", s);
                }
                println!("Pages:        {}", meta.page_count);
                println!("PDF Version:  {}", meta.pdf_version);
                if let Some(ref p) = meta.producer {
                    println!("Producer:     {}", p);
                }
                if let Some(ref c) = meta.creator {
                    println!("Creator:      {}", c);
                }
                if let Some(ref d) = meta.creation_date {
                    println!("Created:      {}", d);
                }
            }
        }
        return Ok(());
    }

    // ── Validate flag combinations ───────────────────────────────────────
    if cli.output.is_some() && (cli.inputs.len() > 1 || cli.batch) {
        anyhow::bail!(
            "-o/--output only applies to a single input (got {} input(s){}).\n\
             Batch mode writes each EPUB next to its PDF.",
            cli.inputs.len(),
            if cli.batch { ", --batch" } else { "" }
        );
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb: ProgressCallback = CliProgressCallback::new();
        Some(cb)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    if let (1, Some(output_path)) = (cli.inputs.len(), cli.output.as_ref()) {
        // The batch machinery would derive the output path itself, so the
        // explicit -o case goes straight to convert_to_file.
        if let Some(ref cb) = config.progress_callback {
            cb.on_batch_start(1);
            cb.on_file_start(1, 1, &cli.inputs[0].display().to_string());
        }
        let result = convert_to_file(&cli.inputs[0], output_path, &config);
        if let Some(ref cb) = config.progress_callback {
            match &result {
                Ok(stats) => {
                    cb.on_file_complete(1, 1, stats.epub_bytes);
                    cb.on_batch_complete(1, 1);
                }
                Err(e) => {
                    cb.on_file_error(1, 1, &e.to_string());
                    cb.on_batch_complete(1, 0);
                }
            }
        }
        let stats = result.context("Conversion failed")?;

        if !cli.quiet {
            eprintln!(
                "{}  {}/{} pages  {}ms  →  {}",
                if stats.failed_pages == 0 {
                    green("✔")
                } else {
                    cyan("⚠")
                },
                stats.extracted_pages + stats.empty_pages,
                stats.selected_pages,
                stats.total_duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
        return Ok(());
    }

    // Batch path: one derived output per input, per-file try/log.
    let items = convert_batch(&cli.inputs, &config);
    let failed: Vec<_> = items.iter().filter(|i| i.result.is_err()).collect();

    if !cli.quiet && !show_progress {
        for item in &items {
            match &item.result {
                Ok(stats) => eprintln!(
                    "Converted {} → {} ({} bytes)",
                    item.input.display(),
                    item.output.display(),
                    stats.epub_bytes
                ),
                Err(e) => eprintln!("Failed {}: {}", item.input.display(), e),
            }
        }
    }

    if !failed.is_empty() {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let pages = parse_pages(&cli.pages)?;
    let metadata = parse_metadata_pairs(&cli.metadata).context("Invalid --metadata argument")?;

    let mut builder = ConversionConfig::builder()
        .cover_dpi(cli.dpi)
        .cover_quality(cli.cover_quality)
        .pages(pages)
        .chapters(if cli.single_chapter {
            ChapterMode::Single
        } else {
            ChapterMode::PerPage
        })
        .language(cli.language.clone())
        .metadata(metadata);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(ref cover) = cli.thumbnail {
        builder = builder.custom_cover(cover.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        for &p in &pages {
            if p < 1 {
                anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
            }
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn metadata_pairs_after_positional_parse() {
        // -m is greedy, so the input must come before it (the pattern the
        // help examples show).
        let cli = Cli::try_parse_from([
            "pdf2epub",
            "report.pdf",
            "-m",
            "title=Annual Report",
            "author=ACME Corp",
            "publisher=ACME",
        ])
        .expect("example invocation must parse");
        assert_eq!(cli.inputs, vec![PathBuf::from("report.pdf")]);
        assert_eq!(cli.metadata.len(), 3);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        // An 80+ character first line full of multi-byte characters must
        // truncate cleanly, never slice mid-character.
        let msg = format!("PDF file not found: '/books/{}'", "é".repeat(70));
        let out = truncate_error_line(&msg);
        assert_eq!(out.chars().count(), 80);
        assert!(out.ends_with('\u{2026}'));
    }

    #[test]
    fn short_error_lines_pass_through() {
        assert_eq!(truncate_error_line("corrupt xref"), "corrupt xref");
        assert_eq!(
            truncate_error_line("first line\nsecond line"),
            "first line"
        );
    }

    #[test]
    fn pages_parser_accepts_all_forms() {
        assert!(matches!(parse_pages("all").unwrap(), PageSelection::All));
        assert!(matches!(
            parse_pages("7").unwrap(),
            PageSelection::Single(7)
        ));
        assert!(matches!(
            parse_pages("3-15").unwrap(),
            PageSelection::Range(3, 15)
        ));
        assert!(matches!(parse_pages("1,3,5").unwrap(), PageSelection::Set(_)));
        assert!(parse_pages("0").is_err());
        assert!(parse_pages("9-2").is_err());
    }
}
