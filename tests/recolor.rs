//! Integration tests for the theme recolorer.
//!
//! These run against the public API with real encoded images and no external
//! dependencies (no pdfium, no fixtures), so they always run in CI.
//!
//! Run with:
//!   cargo test --test recolor

use image::{Rgba, RgbaImage};
use pdftint::{
    recolor, recolor_batch, BitmapFormat, PageBitmap, PipelineConfig, Rgb, Theme,
    DEFAULT_CHROMATIC_THRESHOLD,
};
use std::io::Cursor;

// ── Test helpers ─────────────────────────────────────────────────────────────

fn png_bitmap(index: u32, pixels: &RgbaImage) -> PageBitmap {
    let mut bytes = Vec::new();
    pixels
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("PNG encoding should succeed");
    PageBitmap {
        index,
        width: pixels.width(),
        height: pixels.height(),
        bytes,
        format: BitmapFormat::Png,
    }
}

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

fn decode(bytes: &[u8]) -> RgbaImage {
    image::load_from_memory(bytes)
        .expect("output should decode")
        .into_rgba8()
}

fn saturation(rgba: [u8; 4]) -> f32 {
    let [r, g, b, _] = rgba;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max == 0 {
        0.0
    } else {
        f32::from(max - min) / f32::from(max)
    }
}

/// Assert that every pixel of `pixels` equals `expected`.
fn assert_all_pixels(pixels: &RgbaImage, expected: [u8; 4], context: &str) {
    for (x, y, pixel) in pixels.enumerate_pixels() {
        assert_eq!(
            pixel.0, expected,
            "[{context}] pixel ({x},{y}) is {:?}, expected {expected:?}",
            pixel.0
        );
    }
}

// ── Endpoint exactness ───────────────────────────────────────────────────────

#[test]
fn white_page_recolors_to_exact_background() {
    let source = png_bitmap(1, &solid(4, 4, [255, 255, 255, 255]));
    let out = recolor(source, &Theme::midnight(), &PipelineConfig::default());

    assert!(!out.fallback);
    assert_eq!(out.format, BitmapFormat::Png);
    assert_eq!((out.width, out.height), (4, 4));
    assert_all_pixels(&decode(&out.bytes), [0x0F, 0x17, 0x2A, 255], "white→bg");
}

#[test]
fn black_page_recolors_to_exact_foreground() {
    let source = png_bitmap(1, &solid(4, 4, [0, 0, 0, 255]));
    let out = recolor(source, &Theme::midnight(), &PipelineConfig::default());

    assert!(!out.fallback);
    assert_all_pixels(&decode(&out.bytes), [0xF1, 0xF5, 0xF9, 255], "black→fg");
}

#[test]
fn mid_gray_lands_at_channel_midpoint() {
    let theme = Theme::midnight();
    let source = png_bitmap(1, &solid(2, 2, [128, 128, 128, 255]));
    let out = recolor(source, &theme, &PipelineConfig::default());

    let pixel = decode(&out.bytes).get_pixel(0, 0).0;
    let bg = theme.background;
    let fg = theme.foreground;
    for (channel, (b, f)) in [(bg.r, fg.r), (bg.g, fg.g), (bg.b, fg.b)]
        .into_iter()
        .enumerate()
    {
        let midpoint = ((u16::from(b) + u16::from(f)) as f32 / 2.0).round() as i32;
        let got = i32::from(pixel[channel]);
        assert!(
            (got - midpoint).abs() <= 1,
            "channel {channel}: got {got}, expected {midpoint} ±1"
        );
    }
}

// ── Chromatic preservation ───────────────────────────────────────────────────

#[test]
fn chromatic_content_is_byte_identical() {
    // Left half: a saturated red "logo". Right half: gray body text.
    let mut pixels = solid(8, 4, [120, 120, 120, 255]);
    for y in 0..4 {
        for x in 0..4 {
            pixels.put_pixel(x, y, Rgba([200, 30, 30, 180]));
        }
    }

    let out = recolor(
        png_bitmap(1, &pixels),
        &Theme::midnight(),
        &PipelineConfig::default(),
    );
    let themed = decode(&out.bytes);

    for y in 0..4 {
        for x in 0..4 {
            // chromatic: untouched, alpha included
            assert_eq!(themed.get_pixel(x, y).0, [200, 30, 30, 180]);
        }
        for x in 4..8 {
            // achromatic: remapped away from its original gray
            assert_ne!(themed.get_pixel(x, y).0, [120, 120, 120, 255]);
        }
    }
}

#[test]
fn alpha_passes_through_on_remapped_pixels() {
    let source = png_bitmap(1, &solid(2, 2, [180, 180, 180, 37]));
    let out = recolor(source, &Theme::midnight(), &PipelineConfig::default());
    let themed = decode(&out.bytes);
    assert_eq!(themed.get_pixel(1, 1).0[3], 37);
}

// ── One-shot, non-idempotent ─────────────────────────────────────────────────

#[test]
fn recoloring_twice_differs_from_recoloring_once() {
    // An achromatic theme keeps remapped pixels achromatic, so a second pass
    // remaps them again and lands somewhere else.
    let theme = Theme::new(Rgb::new(200, 200, 200), Rgb::new(20, 20, 20));
    let config = PipelineConfig::default();
    let source = png_bitmap(1, &solid(2, 2, [128, 128, 128, 255]));

    let once = recolor(source, &theme, &config);
    let twice = recolor(
        PageBitmap {
            index: once.index,
            width: once.width,
            height: once.height,
            bytes: once.bytes.clone(),
            format: once.format,
        },
        &theme,
        &config,
    );

    let first = decode(&once.bytes).get_pixel(0, 0).0;
    let second = decode(&twice.bytes).get_pixel(0, 0).0;
    assert_ne!(first, second, "second pass should move the pixel again");
}

#[test]
fn remapped_pixel_crosses_chromatic_threshold() {
    // A white pixel themed onto a saturated background flips classification:
    // pass one remaps it, pass two sees it as chromatic and freezes it.
    let theme = Theme::midnight();
    let config = PipelineConfig::default();

    let once = recolor(
        png_bitmap(1, &solid(1, 1, [255, 255, 255, 255])),
        &theme,
        &config,
    );
    let themed = decode(&once.bytes).get_pixel(0, 0).0;
    assert!(
        saturation(themed) > DEFAULT_CHROMATIC_THRESHOLD,
        "post-recolor saturation {} should exceed the threshold",
        saturation(themed)
    );

    let twice = recolor(
        PageBitmap {
            index: 1,
            width: once.width,
            height: once.height,
            bytes: once.bytes,
            format: once.format,
        },
        &theme,
        &config,
    );
    assert_eq!(decode(&twice.bytes).get_pixel(0, 0).0, themed);
}

// ── Graceful degradation ─────────────────────────────────────────────────────

#[test]
fn corrupt_bytes_pass_through_unchanged() {
    let original = PageBitmap {
        index: 5,
        width: 32,
        height: 32,
        bytes: b"%PNG this is not actually a PNG".to_vec(),
        format: BitmapFormat::Png,
    };
    let out = recolor(
        original.clone(),
        &Theme::midnight(),
        &PipelineConfig::default(),
    );

    assert!(out.fallback);
    assert_eq!(out.bytes, original.bytes);
    assert!(!out.bytes.is_empty());
    assert_eq!(out.index, 5);
}

#[tokio::test]
async fn corrupt_image_in_batch_degrades_alone() {
    let good_a = png_bitmap(1, &solid(4, 4, [255, 255, 255, 255]));
    let corrupt = PageBitmap {
        index: 2,
        width: 4,
        height: 4,
        bytes: b"garbage".to_vec(),
        format: BitmapFormat::Jpeg,
    };
    let good_b = png_bitmap(3, &solid(4, 4, [0, 0, 0, 255]));

    let out = recolor_batch(
        vec![good_a, corrupt.clone(), good_b],
        &Theme::midnight(),
        &PipelineConfig::default(),
    )
    .await;

    assert_eq!(out.len(), 3);
    assert!(!out[0].fallback);
    assert!(out[1].fallback, "the corrupt image degrades, not errors");
    assert_eq!(out[1].bytes, corrupt.bytes);
    assert!(!out[2].fallback, "siblings are unaffected");
    assert_eq!(out.iter().map(|b| b.index).collect::<Vec<_>>(), [1, 2, 3]);
}

// ── Batch ordering ───────────────────────────────────────────────────────────

#[tokio::test]
async fn batch_preserves_input_order_with_staggered_latency() {
    // The first image is much larger than the rest, so with concurrent
    // workers it finishes last; the gather must still put it first.
    let mut images = vec![png_bitmap(1, &solid(512, 512, [240, 240, 240, 255]))];
    for index in 2..=8 {
        images.push(png_bitmap(index, &solid(4, 4, [200, 200, 200, 255])));
    }

    let config = PipelineConfig::builder().concurrency(4).build().unwrap();
    let out = recolor_batch(images, &Theme::paper(), &config).await;

    assert_eq!(out.len(), 8);
    assert_eq!(
        out.iter().map(|b| b.index).collect::<Vec<_>>(),
        (1..=8).collect::<Vec<_>>(),
        "completion order must not leak into output order"
    );
    assert_eq!((out[0].width, out[0].height), (512, 512));
}

#[tokio::test]
async fn empty_batch_returns_empty() {
    let out = recolor_batch(vec![], &Theme::midnight(), &PipelineConfig::default()).await;
    assert!(out.is_empty());
}

// ── Container contract ───────────────────────────────────────────────────────

#[test]
fn jpeg_input_yields_png_output_with_same_dimensions() {
    let pixels = image::DynamicImage::ImageRgba8(solid(6, 3, [128, 128, 128, 255]));
    let mut bytes = Vec::new();
    pixels
        .to_rgb8()
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
        .expect("JPEG encoding should succeed");
    let source = PageBitmap {
        index: 1,
        width: 6,
        height: 3,
        bytes,
        format: BitmapFormat::Jpeg,
    };

    let out = recolor(source, &Theme::sepia(), &PipelineConfig::default());
    assert!(!out.fallback);
    assert_eq!(out.format, BitmapFormat::Png);
    assert_eq!((out.width, out.height), (6, 3));
    assert_eq!(decode(&out.bytes).dimensions(), (6, 3));
}
