//! Eager (full-document) theming entry points.
//!
//! ## Why eager vs. streaming?
//!
//! This module provides the simpler API: render everything, recolor
//! everything, then return. It collects every [`ThemedPage`] into memory
//! before returning. Use [`crate::stream::tint_stream`] instead when you want
//! pages progressively or need to limit peak memory use on documents with
//! many pages.

use crate::config::PipelineConfig;
use crate::error::RasterError;
use crate::output::{PageSlot, ThemedPage, TintOutput, TintStats};
use crate::pipeline::{raster, recolor};
use crate::theme::Theme;
use std::time::Instant;
use tracing::{debug, info};

/// Rasterise a PDF and recolor every page into the theme.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `pdf_bytes` — Complete PDF byte stream (transport decoding is the
///   caller's job)
/// * `theme`     — Background/foreground palette to project pages onto
/// * `config`    — Pipeline configuration
///
/// # Returns
/// `Ok(TintOutput)` on success, even if some pages failed (check
/// `output.stats.unavailable_pages` and `passthrough_pages`). Page indices
/// are stable: `output.pages[i].index == i + 1` always holds.
///
/// # Errors
/// Returns `Err(RasterError)` only for fatal conditions: an unparseable
/// document, a missing/wrong password, no pdfium library, or an invalid
/// configuration.
///
/// # Example
/// ```rust,no_run
/// use pdftint::{tint, PipelineConfig, Theme};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("deck.pdf")?;
/// let output = tint(&bytes, &Theme::midnight(), &PipelineConfig::default()).await?;
/// for page in &output.pages {
///     if let Some(bitmap) = &page.bitmap {
///         std::fs::write(format!("page-{:03}.png", page.index), &bitmap.bytes)?;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn tint(
    pdf_bytes: &[u8],
    theme: &Theme,
    config: &PipelineConfig,
) -> Result<TintOutput, RasterError> {
    let total_start = Instant::now();
    config.validate()?;
    info!(
        "Starting tint run: {} input bytes, theme {} / {}",
        pdf_bytes.len(),
        theme.background,
        theme.foreground
    );

    // ── Step 1: Inspect document ─────────────────────────────────────────
    let info = raster::inspect(pdf_bytes, config.password.as_deref()).await?;
    info!("PDF has {} pages ({})", info.page_count, info.version);

    // ── Step 2: Rasterise pages ──────────────────────────────────────────
    let render_start = Instant::now();
    let slots = raster::rasterize(pdf_bytes, config).await?;
    let render_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered {} slots in {}ms", slots.len(), render_ms);

    // ── Step 3: Split bitmaps from gaps, keeping per-slot order ─────────
    let slot_count = slots.len();
    let mut bitmaps = Vec::with_capacity(slot_count);
    let mut slot_errors = Vec::with_capacity(slot_count);
    for slot in slots {
        match slot {
            PageSlot::Rendered(bitmap) => {
                slot_errors.push(None);
                bitmaps.push(bitmap);
            }
            PageSlot::Unavailable { error, .. } => slot_errors.push(Some(error)),
        }
    }
    let rendered_pages = bitmaps.len();
    let unavailable_pages = slot_count - rendered_pages;
    if unavailable_pages > 0 {
        debug!("{} of {} slots are gaps", unavailable_pages, slot_count);
    }

    // ── Step 4: Recolor bitmaps ──────────────────────────────────────────
    let recolor_start = Instant::now();
    let themed = recolor::recolor_batch(bitmaps, theme, config).await;
    let recolor_ms = recolor_start.elapsed().as_millis() as u64;
    info!("Recolored {} bitmaps in {}ms", themed.len(), recolor_ms);

    let recolored_pages = themed.iter().filter(|b| !b.fallback).count();
    let passthrough_pages = themed.len() - recolored_pages;

    // ── Step 5: Merge gaps back in; index alignment survives end to end ──
    let mut themed_iter = themed.into_iter();
    let pages: Vec<ThemedPage> = slot_errors
        .into_iter()
        .enumerate()
        .map(|(i, error)| {
            let index = i as u32 + 1;
            match error {
                Some(error) => ThemedPage {
                    index,
                    bitmap: None,
                    error: Some(error),
                },
                None => ThemedPage {
                    index,
                    bitmap: themed_iter.next(),
                    error: None,
                },
            }
        })
        .collect();
    debug_assert!(themed_iter.next().is_none());

    // ── Step 6: Compute stats ────────────────────────────────────────────
    let stats = TintStats {
        total_pages: info.page_count,
        rendered_pages,
        unavailable_pages,
        recolored_pages,
        passthrough_pages,
        render_ms,
        recolor_ms,
        total_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Tint run complete: {}/{} pages themed, {}ms total",
        recolored_pages, slot_count, stats.total_ms
    );

    if let Some(hook) = &config.progress {
        hook.on_complete(rendered_pages, recolored_pages);
    }

    Ok(TintOutput { pages, info, stats })
}

/// Synchronous wrapper around [`tint`].
///
/// Creates a temporary tokio runtime internally.
pub fn tint_sync(
    pdf_bytes: &[u8],
    theme: &Theme,
    config: &PipelineConfig,
) -> Result<TintOutput, RasterError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| RasterError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(tint(pdf_bytes, theme, config))
}
