//! # pdftint
//!
//! Rasterise PDF pages and repaint them into a colour theme.
//!
//! ## Why this crate?
//!
//! Re-theming a document the "right" way means re-flowing its vector content,
//! which is a layout engine's worth of work and breaks on scanned pages
//! anyway. pdftint takes the statistical shortcut instead: render each page
//! to pixels, classify every pixel as chromatic (a logo, a chart, a photo) or
//! achromatic (paper, ink, rules, shadows), and remap only the achromatic
//! ones onto a background/foreground colour axis. Photographic and diagram
//! content survives untouched; page chrome adopts the theme.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF bytes
//!  │
//!  ├─ 1. Inspect  page count / version, no rendering
//!  ├─ 2. Raster   rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Codec    decode/encode JPEG + PNG containers
//!  ├─ 4. Recolor  per-pixel chromatic/achromatic remap, concurrent per page
//!  └─ 5. Output   ThemedPage sequence + per-phase stats
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdftint::{tint, PipelineConfig, Theme};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bytes = std::fs::read("deck.pdf")?;
//!     let output = tint(&bytes, &Theme::midnight(), &PipelineConfig::default()).await?;
//!     for page in &output.pages {
//!         if let Some(bitmap) = &page.bitmap {
//!             std::fs::write(format!("page-{:03}.png", page.index), &bitmap.bytes)?;
//!         }
//!     }
//!     eprintln!("{}/{} pages themed in {}ms",
//!         output.stats.recolored_pages,
//!         output.pages.len(),
//!         output.stats.total_ms);
//!     Ok(())
//! }
//! ```
//!
//! The two stages are also usable on their own: [`rasterize`] returns the
//! page bitmaps, [`recolor`]/[`recolor_batch`] theme existing images. The
//! streaming variant [`tint_stream`] yields pages as they complete.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdftint` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! pdftint = { version = "0.3", default-features = false }
//! ```
//!
//! ## Runtime requirement
//!
//! Rendering needs the pdfium shared library at runtime, looked up next to
//! the executable, then under `/opt/pdfium/lib`, then as a system library.
//! The recolor stage has no native dependency and works without it.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod stream;
pub mod theme;
pub mod tint;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder};
pub use error::{PageError, RasterError};
pub use output::{
    BitmapFormat, DocumentInfo, PageBitmap, PageSlot, RecoloredBitmap, ThemedPage, TintOutput,
    TintStats,
};
pub use pipeline::raster::{inspect, rasterize};
pub use pipeline::recolor::{recolor, recolor_batch, DEFAULT_CHROMATIC_THRESHOLD, LIGHTNESS_DIVISOR};
pub use progress::{NoopProgress, PipelineProgress, ProgressHook};
pub use stream::{tint_stream, ThemedPageStream};
pub use theme::{ParseColorError, Rgb, Theme};
pub use tint::{tint, tint_sync};
