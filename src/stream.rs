//! Streaming theming API: emit pages as they finish recoloring.
//!
//! ## Why stream?
//!
//! A hundred-page deck takes a while to theme. A stream-based API lets a
//! preview UI show the first page as soon as it is ready, wire up progress
//! bars, or write pages to disk incrementally instead of buffering the whole
//! document in memory.
//!
//! Unlike the eager [`crate::tint`], which returns only after every page has
//! been recolored, [`tint_stream`] yields one item per page as recoloring
//! completes. Items arrive in **completion order**, not page order — sort by
//! `index` if order matters, or use [`crate::tint`] which guarantees it.
//! Rasterization still completes up front, so fatal document errors surface
//! before the stream exists.

use crate::config::PipelineConfig;
use crate::error::{PageError, RasterError};
use crate::output::{PageSlot, ThemedPage};
use crate::pipeline::{raster, recolor};
use crate::theme::Theme;
use futures::stream::{self, StreamExt};
use std::pin::Pin;
use std::time::Instant;
use tokio_stream::Stream;
use tracing::{info, warn};

/// A boxed stream of themed pages.
///
/// `Err(PageError)` items are pages whose slot was already a gap after
/// rasterization; recolor failures never appear as `Err` (they degrade to
/// passthrough bitmaps with `fallback = true`).
pub type ThemedPageStream = Pin<Box<dyn Stream<Item = Result<ThemedPage, PageError>> + Send>>;

/// Rasterise a PDF and stream each page as soon as it is recolored.
///
/// The stream yields exactly `min(total_pages, max_pages)` items, one per
/// page slot, in completion order.
///
/// # Returns
/// - `Ok(ThemedPageStream)` — a stream of `Result<ThemedPage, PageError>`
/// - `Err(RasterError)` — fatal error (unparseable document, wrong password,
///   no pdfium library, invalid configuration)
///
/// # Example
/// ```rust,no_run
/// use pdftint::{tint_stream, PipelineConfig, Theme};
/// use futures::StreamExt;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let bytes = std::fs::read("deck.pdf")?;
/// let mut pages = tint_stream(&bytes, &Theme::midnight(), &PipelineConfig::default()).await?;
/// while let Some(page) = pages.next().await {
///     match page {
///         Ok(p) => println!("page {} ready ({} bytes)",
///             p.index,
///             p.bitmap.as_ref().map_or(0, |b| b.bytes.len())),
///         Err(e) => eprintln!("page {} unavailable: {e}", e.page()),
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub async fn tint_stream(
    pdf_bytes: &[u8],
    theme: &Theme,
    config: &PipelineConfig,
) -> Result<ThemedPageStream, RasterError> {
    config.validate()?;
    info!("Starting streaming tint run: {} input bytes", pdf_bytes.len());

    // ── Rasterise everything up front; fatal errors surface here ─────────
    let slots = raster::rasterize(pdf_bytes, config).await?;
    let total = slots.len();

    if let Some(hook) = &config.progress {
        hook.on_recolor_start(slots.iter().filter(|s| s.is_rendered()).count());
    }

    // ── Fan recoloring out, yielding items as they complete ──────────────
    let started = Instant::now();
    let concurrency = config.concurrency.max(1);
    let theme = *theme;
    let config = config.clone();

    let s = stream::iter(slots.into_iter().map(move |slot| {
        let config = config.clone();
        async move {
            let bitmap = match slot {
                PageSlot::Unavailable { error, .. } => return Err(error),
                PageSlot::Rendered(bitmap) => bitmap,
            };

            let expired = config.deadline.is_some_and(|d| started.elapsed() > d);
            let themed = if expired {
                warn!(
                    "Recolor deadline expired; page {} passes through",
                    bitmap.index
                );
                recolor::passthrough(bitmap)
            } else {
                let worker_config = config.clone();
                match tokio::task::spawn_blocking(move || {
                    recolor::recolor(bitmap, &theme, &worker_config)
                })
                .await
                {
                    Ok(themed) => themed,
                    // a panicked worker is a bug, not an image failure
                    Err(join_error) => match join_error.try_into_panic() {
                        Ok(payload) => std::panic::resume_unwind(payload),
                        Err(join_error) => panic!("recolor task cancelled: {join_error}"),
                    },
                }
            };

            if let Some(hook) = &config.progress {
                hook.on_page_recolored(themed.index, total, themed.fallback);
            }
            Ok(ThemedPage {
                index: themed.index,
                bitmap: Some(themed),
                error: None,
            })
        }
    }))
    .buffer_unordered(concurrency);

    Ok(Box::pin(s))
}
