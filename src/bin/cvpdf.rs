//! CLI binary for cvpdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExportConfig`, drives the export, and mirrors the export button's
//! loading state on a terminal spinner.

use anyhow::{Context, Result};
use clap::Parser;
use cvpdf::config::resolve_filename;
use cvpdf::pipeline::input::read_source;
use cvpdf::pipeline::markup::strip_tags;
use cvpdf::{
    prepare_content, set_loading, Control, ExportCallback, ExportConfig, ExportError,
    Orientation, PaperFormat, PdfExporter, RenderOptions, DEFAULT_FILENAME,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal "button" ────────────────────────────────────────────────────────

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

/// A spinner line standing in for the export button.
///
/// Disabled means busy (spinner ticking); dimmed opacity dims the label.
struct SpinnerControl {
    bar: ProgressBar,
}

impl SpinnerControl {
    fn new(visible: bool) -> Self {
        let bar = if visible {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        Self { bar }
    }
}

impl Control for SpinnerControl {
    fn set_label(&mut self, label: &str) {
        self.bar.set_message(strip_tags(label).trim().to_string());
    }

    fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.bar.disable_steady_tick();
        } else {
            self.bar.enable_steady_tick(Duration::from_millis(80));
        }
    }

    fn set_opacity(&mut self, opacity: f32) {
        let template = if opacity < 1.0 {
            "{spinner:.cyan} {msg:.dim}"
        } else {
            "{msg}"
        };
        let style = ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(TICKS);
        self.bar.set_style(style);
    }
}

/// Prints the outcome above the spinner line.
struct CliCallback {
    bar: ProgressBar,
    quiet: bool,
}

impl ExportCallback for CliCallback {
    fn on_export_complete(&self, success: bool, error: Option<&ExportError>) {
        if self.quiet {
            return;
        }
        if success {
            self.bar.println(format!("{} PDF ready", green("✔")));
        } else {
            let msg = error.map(|e| e.to_string()).unwrap_or_default();
            self.bar.println(format!("{} {}", red("✘"), red(&msg)));
        }
    }
}

// ── CLI ──────────────────────────────────────────────────────────────────────

const AFTER_HELP: &str = r#"EXAMPLES:
  # Export a Markdown-flavoured CV to ./belge.pdf
  cvpdf cv.md

  # Choose output directory and file name
  cvpdf cv.html -o out -f ada-lovelace.pdf

  # Read from stdin
  cat cv.md | cvpdf -

  # Inspect the prepared HTML without rendering
  cvpdf --html cv.md > prepared.html

  # Print the render options as an html2pdf option object
  cvpdf --options-json cv.md

TEXT RULES (applied in order):
  blank line            → <br><br>
  **text**              → <strong>text</strong>
  *text*                → <em>text</em>
  Go, Rust; SQL - Redis → skill-tag pills, delimiters kept

REQUIREMENTS:
  A Chrome or Chromium installation discoverable on PATH.
"#;

/// Export CV-style HTML/Markdown content to PDF.
#[derive(Parser, Debug)]
#[command(
    name = "cvpdf",
    version,
    about = "Export CV-style HTML/Markdown content to PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input file (HTML or Markdown-flavoured text), or `-` for stdin.
    input: String,

    /// Directory the PDF is written to.
    #[arg(short, long, env = "CVPDF_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// PDF file name.
    #[arg(short, long, env = "CVPDF_FILENAME", default_value = DEFAULT_FILENAME)]
    filename: String,

    /// Page format.
    #[arg(long, env = "CVPDF_FORMAT", value_enum, default_value = "a4")]
    format: FormatArg,

    /// Page orientation.
    #[arg(long, env = "CVPDF_ORIENTATION", value_enum, default_value = "portrait")]
    orientation: OrientationArg,

    /// Page margin on all sides, in millimetres.
    #[arg(long, env = "CVPDF_MARGIN", default_value_t = 15.0)]
    margin: f64,

    /// Print the prepared HTML document instead of rendering.
    #[arg(long)]
    html: bool,

    /// Print the render options as html2pdf JSON instead of rendering.
    #[arg(long)]
    options_json: bool,

    /// Disable the spinner.
    #[arg(long, env = "CVPDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "CVPDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "CVPDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum FormatArg {
    A3,
    A4,
    A5,
    Letter,
    Legal,
}

impl From<FormatArg> for PaperFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::A3 => PaperFormat::A3,
            FormatArg::A4 => PaperFormat::A4,
            FormatArg::A5 => PaperFormat::A5,
            FormatArg::Letter => PaperFormat::Letter,
            FormatArg::Legal => PaperFormat::Legal,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(v: OrientationArg) -> Self {
        match v {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner already says what is happening; keep library INFO logs
    // out of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.html && !cli.options_json;
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

    let config = build_config(&cli)?;
    let filename = config.options.filename.clone();

    // ── Options-only mode ────────────────────────────────────────────────
    if cli.options_json {
        let options = &config.options;
        println!(
            "{}",
            options
                .to_html2pdf_json()
                .context("Failed to serialise render options")?
        );
        return Ok(());
    }

    let source = read_source(&cli.input)
        .await
        .with_context(|| format!("Failed to read input '{}'", cli.input))?;

    // ── HTML-only mode ───────────────────────────────────────────────────
    if cli.html {
        let doc = prepare_content(&source).to_html_document(&filename);
        io::stdout()
            .lock()
            .write_all(doc.as_bytes())
            .context("Failed to write to stdout")?;
        return Ok(());
    }

    // ── Run export ───────────────────────────────────────────────────────
    let mut button = SpinnerControl::new(show_progress);
    let callback = CliCallback {
        bar: button.bar.clone(),
        quiet: cli.quiet,
    };
    let exporter = PdfExporter::chrome(config);

    set_loading(&mut button, true, None);
    let ok = exporter
        .export(source, Some(filename.as_str()), Some(&callback))
        .await;
    set_loading(&mut button, false, None);
    button.bar.finish_and_clear();

    if !ok {
        anyhow::bail!("Export failed");
    }

    if !cli.quiet {
        eprintln!(
            "{}  →  {}",
            green("✔"),
            bold(
                &exporter
                    .config()
                    .output_path(&filename)
                    .display()
                    .to_string()
            ),
        );
    }

    Ok(())
}

/// Map CLI args to `ExportConfig`.
fn build_config(cli: &Cli) -> Result<ExportConfig> {
    let options = RenderOptions::builder()
        .filename(resolve_filename(Some(&cli.filename)))
        .format(cli.format.clone().into())
        .orientation(cli.orientation.clone().into())
        .margin(cli.margin)
        .build()
        .context("Invalid render options")?;

    ExportConfig::builder()
        .options(options)
        .output_dir(cli.output_dir.clone())
        .build()
        .context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("cvpdf").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_empty_filename_falls_back_to_default() {
        let config = build_config(&parse(&["cv.md", "-f", ""])).unwrap();
        assert_eq!(config.options.filename, DEFAULT_FILENAME);
    }

    #[test]
    fn test_page_flags_map_to_options() {
        let config = build_config(&parse(&[
            "cv.md",
            "-f",
            "ada.pdf",
            "--format",
            "letter",
            "--orientation",
            "landscape",
            "--margin",
            "10",
        ]))
        .unwrap();
        assert_eq!(config.options.filename, "ada.pdf");
        assert_eq!(config.options.page.format, PaperFormat::Letter);
        assert_eq!(config.options.page.orientation, Orientation::Landscape);
        assert_eq!(config.options.margin.top, 10.0);
    }

    #[test]
    fn test_negative_margin_is_rejected() {
        assert!(build_config(&parse(&["cv.md", "--margin=-1"])).is_err());
    }
}
