//! Theme recoloring: remap achromatic pixels onto a background/foreground axis.
//!
//! ## The classification rule
//!
//! For each pixel, saturation is `(max − min) / max` over its RGB channels
//! (0 when `max` is 0). Pixels above the configured `chromatic_threshold`
//! carry real colour — logos, charts, syntax highlighting — and are left
//! byte-identical. Everything else is greyscale-ish page chrome: its
//! HSL-style lightness `(max + min) / 510` picks a point between the theme's
//! `foreground` (lightness 0) and `background` (lightness 1), so white paper
//! becomes the theme background and black ink becomes the theme foreground,
//! with anti-aliased edges landing proportionally in between. Alpha is never
//! touched.
//!
//! ## One-shot, not idempotent
//!
//! Recoloring a recolored image is NOT a no-op: a pixel mapped onto a
//! saturated background is classified chromatic on the next pass and frozen,
//! while still-achromatic pixels get remapped again. Callers must recolor
//! from the original rasterized page each time the theme changes.
//!
//! ## Failure policy
//!
//! Decoding can fail (truncated upload, exotic container); theming is a
//! cosmetic transform, so failure degrades instead of erroring: the original
//! bitmap passes through unchanged with `fallback = true`, and one bad image
//! never fails a batch.

use crate::config::PipelineConfig;
use crate::output::{BitmapFormat, PageBitmap, RecoloredBitmap};
use crate::pipeline::codec;
use crate::theme::Theme;
use futures::stream::{self, StreamExt};
use image::RgbaImage;
use std::time::Instant;
use tracing::{debug, warn};

/// Saturation above which a pixel keeps its original colour.
///
/// Calibrated against slide decks and scanned text, not derived from first
/// principles; override per corpus via
/// [`PipelineConfig::chromatic_threshold`].
pub const DEFAULT_CHROMATIC_THRESHOLD: f32 = 0.18;

/// Normalises `max + min` of two 8-bit channels into [0, 1] lightness
/// (255 × 2).
pub const LIGHTNESS_DIVISOR: f32 = 510.0;

/// Recolor one bitmap into the theme.
///
/// Infallible by contract: if the bytes cannot be decoded (or the result
/// cannot be re-encoded) the original bitmap passes through unchanged with
/// `fallback = true`. Successful output is always PNG.
pub fn recolor(image: PageBitmap, theme: &Theme, config: &PipelineConfig) -> RecoloredBitmap {
    let decoded = match codec::decode(&image.bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!(
                "Page {}: undecodable image ({}); passing original through",
                image.index, e
            );
            return passthrough(image);
        }
    };

    let mut pixels = decoded.into_rgba8();
    remap_pixels(&mut pixels, theme, config.chromatic_threshold);

    match codec::encode_png(&pixels) {
        Ok(bytes) => {
            debug!(
                "Page {}: recolored {}x{} px onto {} / {}",
                image.index,
                pixels.width(),
                pixels.height(),
                theme.background,
                theme.foreground
            );
            RecoloredBitmap {
                index: image.index,
                width: pixels.width(),
                height: pixels.height(),
                bytes,
                format: BitmapFormat::Png,
                fallback: false,
            }
        }
        Err(e) => {
            warn!(
                "Page {}: PNG encoding failed ({}); passing original through",
                image.index, e
            );
            passthrough(image)
        }
    }
}

/// Recolor a batch concurrently, preserving input order.
///
/// Items fan out across the blocking pool, at most `config.concurrency` in
/// flight. Completion order is arbitrary; the gather step sorts results back
/// into input positional order, so the N-th output always corresponds to the
/// N-th input. Output length always equals input length.
pub async fn recolor_batch(
    images: Vec<PageBitmap>,
    theme: &Theme,
    config: &PipelineConfig,
) -> Vec<RecoloredBitmap> {
    let total = images.len();
    if let Some(hook) = &config.progress {
        hook.on_recolor_start(total);
    }
    let started = Instant::now();
    let theme = *theme;

    let mut results: Vec<(usize, RecoloredBitmap)> = stream::iter(
        images.into_iter().enumerate().map(|(position, image)| {
            let config = config.clone();
            async move {
                let expired = config.deadline.is_some_and(|d| started.elapsed() > d);
                let bitmap = if expired {
                    warn!(
                        "Recolor deadline expired; page {} passes through",
                        image.index
                    );
                    passthrough(image)
                } else {
                    let worker_config = config.clone();
                    match tokio::task::spawn_blocking(move || {
                        recolor(image, &theme, &worker_config)
                    })
                    .await
                    {
                        Ok(bitmap) => bitmap,
                        // a panicked worker is a bug, not an image failure
                        Err(join_error) => match join_error.try_into_panic() {
                            Ok(payload) => std::panic::resume_unwind(payload),
                            Err(join_error) => panic!("recolor task cancelled: {join_error}"),
                        },
                    }
                };
                if let Some(hook) = &config.progress {
                    hook.on_page_recolored(bitmap.index, total, bitmap.fallback);
                }
                (position, bitmap)
            }
        }),
    )
    .buffer_unordered(config.concurrency.max(1))
    .collect()
    .await;

    // Ordering is a contract, not a coincidence: completion order above is
    // arbitrary, the sort restores input order.
    results.sort_by_key(|(position, _)| *position);
    results.into_iter().map(|(_, bitmap)| bitmap).collect()
}

/// Apply the per-pixel remap in place.
pub(crate) fn remap_pixels(pixels: &mut RgbaImage, theme: &Theme, chromatic_threshold: f32) {
    let bg = theme.background;
    let fg = theme.foreground;

    for pixel in pixels.pixels_mut() {
        // alpha (pixel.0[3]) is deliberately never written
        let [r, g, b, _] = pixel.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);

        let saturation = if max == 0 {
            0.0
        } else {
            f32::from(max - min) / f32::from(max)
        };
        if saturation > chromatic_threshold {
            continue;
        }

        let lightness = (f32::from(max) + f32::from(min)) / LIGHTNESS_DIVISOR;
        pixel.0[0] = blend(fg.r, bg.r, lightness);
        pixel.0[1] = blend(fg.g, bg.g, lightness);
        pixel.0[2] = blend(fg.b, bg.b, lightness);
    }
}

/// Linear interpolation from `fg` (lightness 0) to `bg` (lightness 1).
/// Endpoints are exact: u8 values are exactly representable in f32.
#[inline]
fn blend(fg: u8, bg: u8, lightness: f32) -> u8 {
    (f32::from(fg) + (f32::from(bg) - f32::from(fg)) * lightness).round() as u8
}

/// Degrade to the unmodified input, keeping index and format.
pub(crate) fn passthrough(image: PageBitmap) -> RecoloredBitmap {
    RecoloredBitmap {
        index: image.index,
        width: image.width,
        height: image.height,
        bytes: image.bytes,
        format: image.format,
        fallback: true,
    }
}
