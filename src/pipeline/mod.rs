//! Pipeline stages for PDF page theming.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rendering backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! bytes ──▶ raster ──▶ codec ──▶ recolor
//! (PDF)    (pdfium)  (jpeg/png)  (theme remap)
//! ```
//!
//! 1. [`raster`]  — rasterise up to `max_pages` pages into encoded bitmaps;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 2. [`codec`]   — decode and encode image containers; the only stage that
//!    knows bitmaps are JPEG or PNG
//! 3. [`recolor`] — classify each pixel as chromatic or achromatic and remap
//!    the achromatic ones onto the theme's background/foreground axis

pub mod codec;
pub mod raster;
pub mod recolor;
