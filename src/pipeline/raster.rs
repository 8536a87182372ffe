//! PDF rasterisation: render pages to encoded bitmaps via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering. Pages within one
//! document are rendered sequentially: the document handle is not assumed
//! thread-safe, and page order falls out for free.
//!
//! ## Why tagged slots instead of skipping failed pages?
//!
//! Dropping a failed page from the output silently renumbers everything after
//! it — slot 4 suddenly holds page 5 and downstream consumers mislabel every
//! remaining page. A failed page therefore stays in the output as
//! [`PageSlot::Unavailable`] with its index intact, and only a failure to
//! parse the document at all aborts the call.

use crate::config::PipelineConfig;
use crate::error::{PageError, RasterError};
use crate::output::{BitmapFormat, DocumentInfo, PageBitmap, PageSlot};
use crate::pipeline::codec;
use pdfium_render::prelude::*;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Rasterise the first `min(total_pages, max_pages)` pages of a PDF.
///
/// Returns one [`PageSlot`] per page, 1-indexed and strictly in page order.
/// Pages that fail to render occupy their slot as `Unavailable`; a document
/// that cannot be parsed at all fails the whole call with
/// [`RasterError::Decode`].
///
/// The input must be a complete PDF byte stream. Transport decoding
/// (base64, data URLs) is the caller's responsibility.
pub async fn rasterize(
    pdf_bytes: &[u8],
    config: &PipelineConfig,
) -> Result<Vec<PageSlot>, RasterError> {
    config.validate()?;
    let bytes = pdf_bytes.to_vec();
    let config = config.clone();

    tokio::task::spawn_blocking(move || rasterize_blocking(&bytes, &config))
        .await
        .map_err(|e| RasterError::Internal(format!("Render task panicked: {}", e)))?
}

/// Blocking implementation of page rasterisation.
fn rasterize_blocking(
    bytes: &[u8],
    config: &PipelineConfig,
) -> Result<Vec<PageSlot>, RasterError> {
    let started = Instant::now();
    check_magic(bytes)?;

    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, config.password.as_deref())
        .map_err(|e| map_load_error(e, config.password.is_some()))?;

    let pages = document.pages();
    let total_pages = pages.len() as u32;
    let page_budget = total_pages.min(config.max_pages);
    info!(
        "PDF loaded: {} pages, rendering {} at scale {}",
        total_pages, page_budget, config.scale
    );

    if let Some(hook) = &config.progress {
        hook.on_render_start(page_budget as usize);
    }

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(config.scale as f32)
        .render_form_data(true)
        .render_annotations(true);

    let mut slots = Vec::with_capacity(page_budget as usize);
    for number in 1..=page_budget {
        if let Some(deadline) = config.deadline {
            if started.elapsed() > deadline {
                warn!("Render deadline expired before page {}", number);
                if let Some(hook) = &config.progress {
                    hook.on_page_unavailable(
                        number,
                        page_budget as usize,
                        "render deadline expired",
                    );
                }
                slots.push(PageSlot::Unavailable {
                    index: number,
                    error: PageError::DeadlineExpired { page: number },
                });
                continue;
            }
        }

        match render_page(&pages, number, &render_config, config.quality) {
            Ok(bitmap) => {
                debug!(
                    "Rendered page {} → {}x{} px",
                    number, bitmap.width, bitmap.height
                );
                if let Some(hook) = &config.progress {
                    hook.on_page_rendered(number, page_budget as usize);
                }
                slots.push(PageSlot::Rendered(bitmap));
            }
            Err(detail) => {
                warn!("Page {} unavailable: {}", number, detail);
                if let Some(hook) = &config.progress {
                    hook.on_page_unavailable(number, page_budget as usize, &detail);
                }
                slots.push(PageSlot::Unavailable {
                    index: number,
                    error: PageError::RenderFailed {
                        page: number,
                        detail,
                    },
                });
            }
        }
    }

    Ok(slots)
}

/// Render one page and encode it as JPEG. Errors are per-page detail strings;
/// the caller decides slot placement.
fn render_page(
    pages: &PdfPages<'_>,
    number: u32,
    render_config: &PdfRenderConfig,
    quality: f64,
) -> Result<PageBitmap, String> {
    let page = pages
        .get((number - 1) as u16)
        .map_err(|e| format!("failed to get page handle: {}", e))?;

    let bitmap = page
        .render_with_config(render_config)
        .map_err(|e| format!("pdfium render failed: {}", e))?;

    let image = bitmap.as_image();
    let (width, height) = (image.width(), image.height());
    let bytes =
        codec::encode_jpeg(&image, quality).map_err(|e| format!("JPEG encoding failed: {}", e))?;

    Ok(PageBitmap {
        index: number,
        width,
        height,
        bytes,
        format: BitmapFormat::Jpeg,
    })
}

/// Collect document facts (page count, byte length, version) without
/// rendering any page.
pub async fn inspect(
    pdf_bytes: &[u8],
    password: Option<&str>,
) -> Result<DocumentInfo, RasterError> {
    let bytes = pdf_bytes.to_vec();
    let pwd = password.map(|s| s.to_string());

    tokio::task::spawn_blocking(move || inspect_blocking(&bytes, pwd.as_deref()))
        .await
        .map_err(|e| RasterError::Internal(format!("Inspect task panicked: {}", e)))?
}

/// Blocking implementation of document inspection.
fn inspect_blocking(bytes: &[u8], password: Option<&str>) -> Result<DocumentInfo, RasterError> {
    check_magic(bytes)?;

    let pdfium = bind_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(bytes, password)
        .map_err(|e| map_load_error(e, password.is_some()))?;

    Ok(DocumentInfo {
        page_count: document.pages().len() as u32,
        byte_len: bytes.len(),
        version: version_label(document.version()),
    })
}

/// Dotted PDF version label ("1.7", "2.0") from pdfium's version enum.
fn version_label(version: PdfDocumentVersion) -> String {
    match version {
        PdfDocumentVersion::Pdf1_0 => "1.0".to_string(),
        PdfDocumentVersion::Pdf1_1 => "1.1".to_string(),
        PdfDocumentVersion::Pdf1_2 => "1.2".to_string(),
        PdfDocumentVersion::Pdf1_3 => "1.3".to_string(),
        PdfDocumentVersion::Pdf1_4 => "1.4".to_string(),
        PdfDocumentVersion::Pdf1_5 => "1.5".to_string(),
        PdfDocumentVersion::Pdf1_6 => "1.6".to_string(),
        PdfDocumentVersion::Pdf1_7 => "1.7".to_string(),
        PdfDocumentVersion::Pdf2_0 => "2.0".to_string(),
        // pdfium reports unrecognized versions as a raw two-digit number
        PdfDocumentVersion::Other(raw) => format!("{}.{}", raw / 10, raw % 10),
        PdfDocumentVersion::Unset => "unknown".to_string(),
    }
}

/// Cheap pre-parse check so obviously non-PDF buffers fail fast, before a
/// pdfium library is even bound.
fn check_magic(bytes: &[u8]) -> Result<(), RasterError> {
    if bytes.len() < 4 || &bytes[0..4] != b"%PDF" {
        return Err(RasterError::Decode {
            detail: "missing %PDF header".into(),
        });
    }
    Ok(())
}

/// Bind a pdfium library, creating a fresh instance per call.
///
/// Tries the executable's directory, then the conventional install prefix,
/// then the system library path.
fn bind_pdfium() -> Result<Pdfium, RasterError> {
    let bindings = Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| {
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(
                "/opt/pdfium/lib",
            ))
        })
        .or_else(|_| Pdfium::bind_to_system_library())
        .map_err(|e| RasterError::PdfiumBinding(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}

/// Translate pdfium's load error into the document-level taxonomy.
fn map_load_error(err: PdfiumError, password_provided: bool) -> RasterError {
    match err {
        PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
            if password_provided {
                RasterError::WrongPassword
            } else {
                RasterError::PasswordRequired
            }
        }
        other => RasterError::Decode {
            detail: format!("{}", other),
        },
    }
}
