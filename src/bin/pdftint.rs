//! CLI binary for pdftint.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, writes page images to disk and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdftint::{
    inspect, rasterize, tint, PageSlot, PipelineConfig, PipelineProgress, ProgressHook, Rgb, Theme,
    TintOutput,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
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

// ── CLI progress hook using indicatif ────────────────────────────────────────

/// Terminal progress hook: renders a live progress bar and per-page log lines
/// using [indicatif]. The bar runs through two phases (rendering, tinting)
/// and works correctly when recolored pages complete out of order.
struct CliProgress {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Count of pages that never produced a bitmap.
    unavailable: AtomicUsize,
    /// Count of pages that passed through unthemed.
    fallbacks: AtomicUsize,
}

impl CliProgress {
    /// Create a hook whose progress-bar length is set dynamically by
    /// `on_render_start` (called before any pages are processed).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_render_start

        // Initial style: spinner only (no counter until we know the total).
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            unavailable: AtomicUsize::new(0),
            fallbacks: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style for a phase of `total` steps.
    fn activate_phase(&self, prefix: &'static str, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_position(0);
        self.bar.set_style(progress_style);
        self.bar.set_prefix(prefix);
        self.bar.reset_eta();
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl PipelineProgress for CliProgress {
    fn on_render_start(&self, total_pages: usize) {
        self.activate_phase("Rendering", total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {total_pages} pages…"))
        ));
    }

    fn on_page_rendered(&self, page: u32, total_pages: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page,
            total_pages,
            dim("rendered"),
        ));
        self.bar.inc(1);
    }

    fn on_page_unavailable(&self, page: u32, total_pages: usize, error: &str) {
        self.unavailable.fetch_add(1, Ordering::SeqCst);

        // Truncate very long error messages to keep output tidy.
        let msg = truncate_message(error, 79);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page,
            total_pages,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_recolor_start(&self, total_images: usize) {
        self.activate_phase("Tinting", total_images);
    }

    fn on_page_recolored(&self, page: u32, total_images: usize, fallback: bool) {
        if fallback {
            self.fallbacks.fetch_add(1, Ordering::SeqCst);
            self.bar.println(format!(
                "  {} Page {:>3}/{:<3}  {}",
                cyan("⚠"),
                page,
                total_images,
                dim("original colours retained"),
            ));
        }
        self.bar.inc(1);
    }

    fn on_complete(&self, rendered: usize, recolored: usize) {
        self.finish();

        let unavailable = self.unavailable.load(Ordering::SeqCst);
        let fallbacks = self.fallbacks.load(Ordering::SeqCst);
        if unavailable == 0 && fallbacks == 0 {
            eprintln!(
                "{} {} pages themed successfully",
                green("✔"),
                bold(&recolored.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages themed  ({} unavailable, {} retained original colours)",
                if rendered == 0 { red("✘") } else { cyan("⚠") },
                bold(&recolored.to_string()),
                rendered + unavailable,
                red(&unavailable.to_string()),
                fallbacks,
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Theme a deck with the built-in dark preset
  pdftint deck.pdf -o pages/ --preset midnight

  # Custom palette at double resolution
  pdftint deck.pdf --background '#0F172A' --foreground '#F1F5F9' --scale 2.0

  # Rasterize only, keep original colours (JPEG output)
  pdftint deck.pdf --no-tint -o pages/

  # Page count / version / size, no rendering
  pdftint deck.pdf --inspect

  # Machine-readable run summary
  pdftint deck.pdf --json -o pages/ > run.json

  # First 10 pages only, encrypted document
  pdftint report.pdf --max-pages 10 --password hunter2

THEME PRESETS:
  midnight   #0F172A on #F1F5F9  dark slate, near-white text
  paper      #FFFFFF on #111827  plain white, near-black text
  sepia      #F4ECD8 on #5B4636  warm paper for long reading

ENVIRONMENT VARIABLES:
  PDFTINT_OUTPUT       Output directory (same as -o)
  PDFTINT_PRESET       Theme preset name
  PDFTINT_SCALE        Render resolution multiplier
  PDFTINT_QUALITY      JPEG quality for rasterized pages
  PDFTINT_MAX_PAGES    Page cap
  PDFTINT_PASSWORD     PDF user password

SETUP:
  Rendering needs the pdfium shared library at runtime. Place libpdfium next
  to the executable, install it under /opt/pdfium/lib, or install it as a
  system library. Prebuilt binaries: github.com/bblanchon/pdfium-binaries.
"#;

/// Rasterise PDF pages and repaint them into a colour theme.
#[derive(Parser, Debug)]
#[command(
    name = "pdftint",
    version,
    about = "Rasterise PDF pages and repaint them into a colour theme",
    long_about = "Render each page of a PDF to an image and remap its near-grayscale pixels \
onto a background/foreground colour pair, preserving photos, charts and other chromatic \
content. Writes one image per page.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory to write page images into (created if missing).
    #[arg(short, long, env = "PDFTINT_OUTPUT", default_value = "pages")]
    output: PathBuf,

    /// Theme preset: midnight, paper, sepia.
    #[arg(
        long,
        env = "PDFTINT_PRESET",
        default_value = "midnight",
        long_help = "Built-in theme preset. Ignored when both --background and --foreground \
          are given."
    )]
    preset: String,

    /// Theme background colour as hex (e.g. '#0F172A'). Requires --foreground.
    #[arg(long, requires = "foreground")]
    background: Option<String>,

    /// Theme foreground colour as hex (e.g. '#F1F5F9'). Requires --background.
    #[arg(long, requires = "background")]
    foreground: Option<String>,

    /// Render resolution multiplier relative to native page size.
    #[arg(long, env = "PDFTINT_SCALE", default_value_t = 1.5)]
    scale: f64,

    /// JPEG quality for rasterized pages, in (0, 1].
    #[arg(long, env = "PDFTINT_QUALITY", default_value_t = 0.8)]
    quality: f64,

    /// Maximum number of pages to render.
    #[arg(long, env = "PDFTINT_MAX_PAGES", default_value_t = 50,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: u32,

    /// Saturation above which a pixel keeps its original colour.
    #[arg(long, env = "PDFTINT_THRESHOLD", default_value_t = pdftint::DEFAULT_CHROMATIC_THRESHOLD)]
    chromatic_threshold: f32,

    /// Number of pages recolored concurrently.
    #[arg(short, long, env = "PDFTINT_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFTINT_PASSWORD")]
    password: Option<String>,

    /// Soft deadline for the whole run, in seconds.
    #[arg(long, env = "PDFTINT_DEADLINE_SECS")]
    deadline_secs: Option<u64>,

    /// Print PDF facts (pages, version, size) only, no rendering.
    #[arg(long)]
    inspect: bool,

    /// Rasterize only; skip theming and write original-colour JPEGs.
    #[arg(long, env = "PDFTINT_NO_TINT")]
    no_tint: bool,

    /// Print a structured JSON run summary to stdout.
    #[arg(long, env = "PDFTINT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDFTINT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFTINT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFTINT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.inspect;
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

    let bytes = std::fs::read(&cli.input)
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect {
        let info = inspect(&bytes, cli.password.as_deref())
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&info).context("Failed to serialise info")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            println!("Pages:        {}", info.page_count);
            println!("PDF Version:  {}", info.version);
            println!("Size:         {} bytes", info.byte_len);
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    // The progress bar starts as a spinner (no page count yet);
    // `on_render_start` resizes it once the PDF has been inspected.
    let progress = if show_progress {
        Some(CliProgress::new_dynamic())
    } else {
        None
    };
    let config = build_config(&cli, progress.clone().map(|p| p as ProgressHook))?;

    std::fs::create_dir_all(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;

    // ── Rasterize-only mode ──────────────────────────────────────────────
    if cli.no_tint {
        let slots = rasterize(&bytes, &config).await.context("Rendering failed")?;
        if let Some(ref p) = progress {
            p.finish();
        }

        let total = slots.len();
        let mut written = 0usize;
        for slot in &slots {
            if let PageSlot::Rendered(bitmap) = slot {
                let path = page_path(&cli.output, bitmap.index, bitmap.format.extension());
                std::fs::write(&path, &bitmap.bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                written += 1;
            }
        }

        if cli.json {
            print_json_slots(&slots)?;
        }
        if !cli.quiet {
            eprintln!(
                "{}  {}/{} pages rendered  →  {}",
                if written == total { green("✔") } else { cyan("⚠") },
                written,
                total,
                bold(&cli.output.display().to_string()),
            );
        }
        if written == 0 {
            anyhow::bail!("All {} pages failed to render", total);
        }
        return Ok(());
    }

    // ── Full run: rasterize + theme ──────────────────────────────────────
    let theme = resolve_theme(&cli)?;
    let output = tint(&bytes, &theme, &config).await.context("Theming failed")?;

    let mut written = 0usize;
    for page in &output.pages {
        if let Some(bitmap) = &page.bitmap {
            let path = page_path(&cli.output, page.index, bitmap.format.extension());
            std::fs::write(&path, &bitmap.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            written += 1;
        }
    }

    if cli.json {
        print_json_output(&output)?;
    }
    if !cli.quiet && !show_progress {
        // Only print inline stats when the progress hook is disabled
        // (on_complete already printed the coloured summary otherwise).
        eprintln!(
            "Themed {}/{} pages in {}ms  →  {}",
            output.stats.recolored_pages,
            output.pages.len(),
            output.stats.total_ms,
            cli.output.display(),
        );
        if output.stats.unavailable_pages > 0 {
            eprintln!("  {} pages unavailable", output.stats.unavailable_pages);
        }
    }

    if written == 0 {
        anyhow::bail!("All {} pages failed to render", output.pages.len());
    }
    Ok(())
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressHook>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .scale(cli.scale)
        .quality(cli.quality)
        .max_pages(cli.max_pages)
        .chromatic_threshold(cli.chromatic_threshold)
        .concurrency(cli.concurrency);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(secs) = cli.deadline_secs {
        builder = builder.deadline(Duration::from_secs(secs));
    }
    if let Some(hook) = progress {
        builder = builder.progress(hook);
    }

    builder.build().context("Invalid configuration")
}

/// Resolve the theme from `--background`/`--foreground` or `--preset`.
fn resolve_theme(cli: &Cli) -> Result<Theme> {
    if let (Some(bg), Some(fg)) = (&cli.background, &cli.foreground) {
        let background = Rgb::from_hex(bg).context("Invalid --background colour")?;
        let foreground = Rgb::from_hex(fg).context("Invalid --foreground colour")?;
        return Ok(Theme::new(background, foreground));
    }
    Theme::preset(&cli.preset).with_context(|| {
        format!(
            "Unknown preset '{}' (expected one of: {})",
            cli.preset,
            Theme::PRESET_NAMES.join(", ")
        )
    })
}

/// Cut `message` to at most `max_chars` characters, appending an ellipsis
/// when something was dropped. Cuts on char boundaries, never mid-codepoint.
fn truncate_message(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}\u{2026}", &message[..cut]),
        None => message.to_string(),
    }
}

fn page_path(dir: &Path, index: u32, extension: &str) -> PathBuf {
    dir.join(format!("page-{index:03}.{extension}"))
}

fn print_json_output(output: &TintOutput) -> Result<()> {
    let pages: Vec<serde_json::Value> = output
        .pages
        .iter()
        .map(|page| match (&page.bitmap, &page.error) {
            (Some(bitmap), _) => serde_json::json!({
                "index": page.index,
                "width": bitmap.width,
                "height": bitmap.height,
                "format": bitmap.format,
                "fallback": bitmap.fallback,
            }),
            (None, error) => serde_json::json!({
                "index": page.index,
                "error": error.as_ref().map(|e| e.to_string()),
            }),
        })
        .collect();

    let summary = serde_json::json!({
        "info": output.info,
        "stats": output.stats,
        "pages": pages,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
    );
    Ok(())
}

fn print_json_slots(slots: &[PageSlot]) -> Result<()> {
    let pages: Vec<serde_json::Value> = slots
        .iter()
        .map(|slot| match slot {
            PageSlot::Rendered(bitmap) => serde_json::json!({
                "index": bitmap.index,
                "width": bitmap.width,
                "height": bitmap.height,
                "format": bitmap.format,
            }),
            PageSlot::Unavailable { index, error } => serde_json::json!({
                "index": index,
                "error": error.to_string(),
            }),
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({ "pages": pages }))
            .context("Failed to serialise summary")?
    );
    Ok(())
}
