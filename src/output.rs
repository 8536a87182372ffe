//! Output types produced by the pipeline.
//!
//! The raster stage yields one [`PageSlot`] per requested page: either a
//! rendered [`PageBitmap`] or an explicit `Unavailable` marker. Markers keep
//! their 1-based index, so a failed page never shifts the pages after it.
//! The recolor stage turns bitmaps into [`RecoloredBitmap`]s, and the
//! end-to-end [`crate::tint`] call assembles [`ThemedPage`]s plus run
//! statistics.

use crate::error::{PageError, RasterError};

/// Encoding of a bitmap's `bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitmapFormat {
    /// Lossy; used for rasterized pages (the `quality` knob applies).
    Jpeg,
    /// Lossless; always used for recolored output so theming never
    /// compounds compression artifacts.
    Png,
}

impl BitmapFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            BitmapFormat::Jpeg => "image/jpeg",
            BitmapFormat::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            BitmapFormat::Jpeg => "jpg",
            BitmapFormat::Png => "png",
        }
    }
}

/// One rasterized page.
///
/// Immutable value: dimensions and bytes are fixed at render time. `index`
/// is 1-based and unique within the document.
#[derive(Clone)]
pub struct PageBitmap {
    /// 1-based page index within the source document.
    pub index: u32,
    /// Width in pixels after scaling.
    pub width: u32,
    /// Height in pixels after scaling.
    pub height: u32,
    /// Encoded image data.
    pub bytes: Vec<u8>,
    pub format: BitmapFormat,
}

impl std::fmt::Debug for PageBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageBitmap")
            .field("index", &self.index)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .field("format", &self.format)
            .finish()
    }
}

/// A position in the rasterizer's output: a page, or an explicit gap.
///
/// Rendering failures are per-slot, never positional erasures. A document
/// rendered with `max_pages = 5` always yields five slots with indices
/// 1 through 5, whatever happened to the individual pages.
#[derive(Debug, Clone)]
pub enum PageSlot {
    Rendered(PageBitmap),
    Unavailable { index: u32, error: PageError },
}

impl PageSlot {
    /// The 1-based page index, present for gaps as well.
    pub fn index(&self) -> u32 {
        match self {
            PageSlot::Rendered(bitmap) => bitmap.index,
            PageSlot::Unavailable { index, .. } => *index,
        }
    }

    pub fn is_rendered(&self) -> bool {
        matches!(self, PageSlot::Rendered(_))
    }

    pub fn as_rendered(&self) -> Option<&PageBitmap> {
        match self {
            PageSlot::Rendered(bitmap) => Some(bitmap),
            PageSlot::Unavailable { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&PageError> {
        match self {
            PageSlot::Rendered(_) => None,
            PageSlot::Unavailable { error, .. } => Some(error),
        }
    }

    /// Unwraps the bitmap, turning a gap into the fatal
    /// [`RasterError::PageUnavailable`] for callers with zero tolerance.
    pub fn into_rendered(self) -> Result<PageBitmap, RasterError> {
        match self {
            PageSlot::Rendered(bitmap) => Ok(bitmap),
            PageSlot::Unavailable { index, .. } => {
                Err(RasterError::PageUnavailable { page: index })
            }
        }
    }
}

/// A page bitmap after theme recoloring.
///
/// Same dimensions as its source (the transform is colour-only). When the
/// source bytes could not be decoded the recolorer degrades gracefully:
/// `bytes` are the original input, `format` is the original format and
/// `fallback` is `true`.
#[derive(Clone)]
pub struct RecoloredBitmap {
    /// 1-based index carried over from the source [`PageBitmap`].
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// PNG-encoded pixels, or the untouched original on fallback.
    pub bytes: Vec<u8>,
    pub format: BitmapFormat,
    /// True when decoding failed and the original image passed through.
    pub fallback: bool,
}

impl std::fmt::Debug for RecoloredBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecoloredBitmap")
            .field("index", &self.index)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &format_args!("{} bytes", self.bytes.len()))
            .field("format", &self.format)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// One page of an end-to-end [`crate::tint`] run.
///
/// `bitmap` is `None` exactly when the page never rendered; `error` then
/// says why. Pages that rendered but fell back to their original colours
/// still carry a bitmap (with `fallback = true`).
#[derive(Debug, Clone)]
pub struct ThemedPage {
    pub index: u32,
    pub bitmap: Option<RecoloredBitmap>,
    pub error: Option<PageError>,
}

/// Document facts gathered without rendering.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct DocumentInfo {
    /// Total pages in the document (before any `max_pages` cap).
    pub page_count: u32,
    /// Size of the input buffer in bytes.
    pub byte_len: usize,
    /// PDF version, e.g. "1.7".
    pub version: String,
}

/// Counters and phase timings for one [`crate::tint`] run.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TintStats {
    /// Total pages in the document (before the `max_pages` cap).
    pub total_pages: u32,
    /// Pages that produced a bitmap.
    pub rendered_pages: usize,
    /// Pages that failed to render (slots kept as gaps).
    pub unavailable_pages: usize,
    /// Bitmaps recolored into the theme.
    pub recolored_pages: usize,
    /// Bitmaps that passed through unchanged (decode fallback).
    pub passthrough_pages: usize,
    pub render_ms: u64,
    pub recolor_ms: u64,
    pub total_ms: u64,
}

/// Everything produced by one end-to-end [`crate::tint`] run.
#[derive(Debug)]
pub struct TintOutput {
    /// One entry per requested page, in page order, gaps included.
    pub pages: Vec<ThemedPage>,
    pub info: DocumentInfo,
    pub stats: TintStats,
}

impl TintOutput {
    /// True when every requested page rendered and recolored.
    pub fn is_complete(&self) -> bool {
        self.stats.unavailable_pages == 0 && self.stats.passthrough_pages == 0
    }
}
