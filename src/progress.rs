//! Progress-callback trait for per-page pipeline events.
//!
//! Inject an [`Arc<dyn PipelineProgress>`] via
//! [`crate::config::PipelineConfigBuilder::progress`] to receive real-time
//! events as pages render and recolor.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a WebSocket, a database record,
//! or a terminal progress bar, without the library knowing anything about how
//! the host application communicates. The trait is `Send + Sync` so it works
//! correctly when recoloring fans out across the blocking pool.
//!
//! # Example
//!
//! ```rust
//! use pdftint::{PipelineProgress, PipelineConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingProgress {
//!     rendered: Arc<AtomicUsize>,
//! }
//!
//! impl PipelineProgress for CountingProgress {
//!     fn on_page_rendered(&self, page: u32, total_pages: usize) {
//!         let done = self.rendered.fetch_add(1, Ordering::SeqCst) + 1;
//!         eprintln!("Rendered {}/{} (page {})", done, total_pages, page);
//!     }
//! }
//!
//! let counter = Arc::new(CountingProgress {
//!     rendered: Arc::new(AtomicUsize::new(0)),
//! });
//!
//! let config = PipelineConfig::builder()
//!     .progress(counter as Arc<dyn PipelineProgress>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the pipeline as pages move through its two phases.
///
/// Implementations must be `Send + Sync` (batch recoloring runs items
/// concurrently). All methods have default no-op implementations so callers
/// only override what they care about.
///
/// # Thread safety
///
/// `on_page_recolored` may be called concurrently from different threads.
/// Implementations must protect shared mutable state with appropriate
/// synchronisation primitives (e.g. `Mutex`, `AtomicUsize`).
pub trait PipelineProgress: Send + Sync {
    /// Called once before any page is rendered.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be rendered (after the
    ///   `max_pages` cap)
    fn on_render_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when a page has been rasterized and encoded.
    ///
    /// # Arguments
    /// * `page`        — 1-indexed page number
    /// * `total_pages` — total pages being rendered
    fn on_page_rendered(&self, page: u32, total_pages: usize) {
        let _ = (page, total_pages);
    }

    /// Called when a page fails to render and its slot becomes a gap.
    ///
    /// # Arguments
    /// * `page`        — 1-indexed page number
    /// * `total_pages` — total pages being rendered
    /// * `error`       — human-readable failure description
    fn on_page_unavailable(&self, page: u32, total_pages: usize, error: &str) {
        let _ = (page, total_pages, error);
    }

    /// Called once before any bitmap is recolored.
    fn on_recolor_start(&self, total_images: usize) {
        let _ = total_images;
    }

    /// Called when a bitmap finishes recoloring.
    ///
    /// # Arguments
    /// * `page`         — 1-indexed page number
    /// * `total_images` — total bitmaps in the batch
    /// * `fallback`     — true when the image passed through unchanged
    fn on_page_recolored(&self, page: u32, total_images: usize, fallback: bool) {
        let _ = (page, total_images, fallback);
    }

    /// Called once after both phases finish.
    ///
    /// # Arguments
    /// * `rendered`  — pages that produced a bitmap
    /// * `recolored` — bitmaps recolored into the theme (fallbacks excluded)
    fn on_complete(&self, rendered: usize, recolored: usize) {
        let _ = (rendered, recolored);
    }
}

/// A no-op implementation for callers that don't need progress events.
///
/// This is the default when no callback is configured.
pub struct NoopProgress;

impl PipelineProgress for NoopProgress {}

/// Convenience alias matching the type stored in [`crate::config::PipelineConfig`].
pub type ProgressHook = Arc<dyn PipelineProgress>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingProgress {
        rendered: Arc<AtomicUsize>,
        unavailable: Arc<AtomicUsize>,
        recolored: Arc<AtomicUsize>,
        fallbacks: Arc<AtomicUsize>,
        render_total: Arc<AtomicUsize>,
    }

    impl PipelineProgress for TrackingProgress {
        fn on_render_start(&self, total_pages: usize) {
            self.render_total.store(total_pages, Ordering::SeqCst);
        }

        fn on_page_rendered(&self, _page: u32, _total_pages: usize) {
            self.rendered.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_unavailable(&self, _page: u32, _total_pages: usize, _error: &str) {
            self.unavailable.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_recolored(&self, _page: u32, _total_images: usize, fallback: bool) {
            self.recolored.fetch_add(1, Ordering::SeqCst);
            if fallback {
                self.fallbacks.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn noop_progress_does_not_panic() {
        let p = NoopProgress;
        p.on_render_start(5);
        p.on_page_rendered(1, 5);
        p.on_page_unavailable(2, 5, "render glitch");
        p.on_recolor_start(4);
        p.on_page_recolored(1, 4, false);
        p.on_complete(4, 4);
    }

    #[test]
    fn tracking_progress_receives_events() {
        let tracker = TrackingProgress {
            rendered: Arc::new(AtomicUsize::new(0)),
            unavailable: Arc::new(AtomicUsize::new(0)),
            recolored: Arc::new(AtomicUsize::new(0)),
            fallbacks: Arc::new(AtomicUsize::new(0)),
            render_total: Arc::new(AtomicUsize::new(0)),
        };

        tracker.on_render_start(3);
        assert_eq!(tracker.render_total.load(Ordering::SeqCst), 3);

        tracker.on_page_rendered(1, 3);
        tracker.on_page_rendered(2, 3);
        tracker.on_page_unavailable(3, 3, "bitmap allocation failed");

        tracker.on_recolor_start(2);
        tracker.on_page_recolored(1, 2, false);
        tracker.on_page_recolored(2, 2, true);

        assert_eq!(tracker.rendered.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.unavailable.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.recolored.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.fallbacks.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_progress_works() {
        let p: Arc<dyn PipelineProgress> = Arc::new(NoopProgress);
        p.on_render_start(10);
        p.on_page_rendered(1, 10);
        p.on_page_recolored(1, 10, false);
    }
}
