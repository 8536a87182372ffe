//! Error types for the pdftint library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`RasterError`] — **Fatal**: the document cannot be processed at all
//!   (corrupt PDF, wrong password, no pdfium library). Returned as
//!   `Err(RasterError)` from [`crate::rasterize`] and the `tint*` functions.
//!
//! * [`PageError`] — **Non-fatal**: a single page failed to render but all
//!   other pages are fine. Stored inside [`crate::output::PageSlot`] and
//!   [`crate::output::ThemedPage`] so callers can inspect partial success
//!   rather than losing the whole document to one bad page, and so page
//!   indices never silently shift.
//!
//! The recolorer deliberately has no error type of its own: an image that
//! cannot be decoded passes through unchanged (see
//! [`crate::recolor`]), which keeps a single bad bitmap from failing a batch.

use thiserror::Error;

/// All fatal errors returned by the pdftint library.
///
/// Page-level failures use [`PageError`] and are stored in
/// [`crate::output::PageSlot::Unavailable`] rather than propagated here.
#[derive(Debug, Error)]
pub enum RasterError {
    // ── Document errors ───────────────────────────────────────────────────
    /// The byte buffer is not a parseable PDF document.
    #[error("PDF could not be decoded: {detail}\nThe input must be a complete PDF byte stream (transport decoding such as base64 is the caller's responsibility).")]
    Decode { detail: String },

    /// The document is encrypted and no password was provided.
    #[error("PDF is encrypted and requires a password.\nProvide one with PipelineConfig::builder().password(..).")]
    PasswordRequired,

    /// A password was provided but it is wrong.
    #[error("Wrong password for encrypted PDF")]
    WrongPassword,

    /// A specific page produced no bitmap.
    ///
    /// Returned by [`crate::output::PageSlot::into_rendered`] when the caller
    /// wants to treat a gap in the rendered pages as fatal. The batch call
    /// itself never fails for a single page; it marks the slot instead.
    #[error("Page {page} is unavailable: rendering failed and the slot holds no bitmap")]
    PageUnavailable { page: u32 },

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
The pdfium shared library must be available at runtime. You can:\n\
  • Place libpdfium next to the executable.\n\
  • Install it under /opt/pdfium/lib.\n\
  • Install it as a system library (e.g. /usr/lib).\n"
    )]
    PdfiumBinding(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (a panicked worker task, for example).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::output::PageSlot::Unavailable`] (and surfaced through
/// [`crate::output::ThemedPage::error`]) when one page fails. The slot keeps
/// its 1-based index so later pages never shift position.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: u32, detail: String },

    /// The per-call deadline expired before this page was started.
    #[error("Page {page}: skipped, render deadline expired")]
    DeadlineExpired { page: u32 },
}

impl PageError {
    /// The 1-based index of the page this error belongs to.
    pub fn page(&self) -> u32 {
        match self {
            PageError::RenderFailed { page, .. } => *page,
            PageError::DeadlineExpired { page } => *page,
        }
    }
}
