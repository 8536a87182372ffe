//! Configuration types for the rasterize/recolor pipeline.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built via
//! its [`PipelineConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs across calls, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field. The
//! builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::RasterError;
use crate::pipeline::recolor::DEFAULT_CHROMATIC_THRESHOLD;
use crate::progress::ProgressHook;
use std::fmt;
use std::time::Duration;

/// Configuration for rasterization and recoloring.
///
/// Built via [`PipelineConfig::builder()`] or using
/// [`PipelineConfig::default()`]. One config drives both pipeline stages;
/// the raster stage reads `scale`/`quality`/`max_pages`, the recolor stage
/// reads `chromatic_threshold`/`concurrency`, and `deadline`/`progress`
/// apply to both.
///
/// # Example
/// ```rust
/// use pdftint::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .scale(2.0)
///     .max_pages(10)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct PipelineConfig {
    /// Multiplier applied to each page's native size. Range: 0.1–8.0. Default: 1.5.
    ///
    /// PDF pages have intrinsic dimensions in points (a US Letter page is
    /// 612 × 792 pt). At scale 1.0 one point becomes one pixel; the 1.5
    /// default renders that page at 918 × 1188 px, sharp enough for on-screen
    /// preview without ballooning memory. Raise it for zoomable viewers,
    /// lower it for thumbnails.
    pub scale: f64,

    /// JPEG quality for rasterized pages, in (0, 1]. Default: 0.8.
    ///
    /// Pages are stored lossy because they can carry photographic content;
    /// 0.8 keeps body text legible at a fraction of the PNG size. The knob
    /// only affects the raster stage — recolored output is always PNG so
    /// theming never re-compresses an already-lossy image.
    pub quality: f64,

    /// Upper bound on rendered pages. Default: 50.
    ///
    /// `min(total_pages, max_pages)` pages are rendered, always starting at
    /// page 1. The cap keeps a 1 000-page upload from monopolising the
    /// blocking pool; callers that genuinely need everything can raise it.
    pub max_pages: u32,

    /// Saturation above which a pixel counts as chromatic and keeps its
    /// colour. Range: 0.0–1.0. Default: 0.18.
    ///
    /// Saturation is measured as `(max − min) / max` over the RGB channels.
    /// The default is calibrated, not derived: it separates anti-aliased
    /// text (low saturation, remapped into the theme) from logos and charts
    /// (high saturation, preserved). Tune per corpus rather than trusting it.
    pub chromatic_threshold: f32,

    /// Number of images recolored concurrently in a batch. Default: 8.
    ///
    /// Recoloring is CPU-bound (decode, per-pixel remap, encode), so the
    /// useful ceiling is the machine's core count; 8 matches common desktop
    /// and CI hardware. Results are returned in input order regardless.
    pub concurrency: usize,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Soft per-call deadline. Default: none (run to completion).
    ///
    /// When the deadline passes mid-call, remaining raster pages become
    /// `Unavailable` slots and remaining batch recolors degrade to
    /// passthrough. Work already finished is kept; nothing is torn down.
    pub deadline: Option<Duration>,

    /// Optional progress observer for per-page events.
    pub progress: Option<ProgressHook>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            scale: 1.5,
            quality: 0.8,
            max_pages: 50,
            chromatic_threshold: DEFAULT_CHROMATIC_THRESHOLD,
            concurrency: 8,
            password: None,
            deadline: None,
            progress: None,
        }
    }
}

impl fmt::Debug for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineConfig")
            .field("scale", &self.scale)
            .field("quality", &self.quality)
            .field("max_pages", &self.max_pages)
            .field("chromatic_threshold", &self.chromatic_threshold)
            .field("concurrency", &self.concurrency)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("deadline", &self.deadline)
            .field("progress", &self.progress.as_ref().map(|_| "<dyn PipelineProgress>"))
            .finish()
    }
}

impl PipelineConfig {
    /// Create a new builder for `PipelineConfig`.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check every constraint the builder enforces.
    ///
    /// Called by [`PipelineConfigBuilder::build`] and again at the pipeline
    /// entry points, so a hand-constructed config cannot smuggle in a zero
    /// scale or an empty page budget.
    pub fn validate(&self) -> Result<(), RasterError> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(RasterError::InvalidConfig(format!(
                "scale must be > 0, got {}",
                self.scale
            )));
        }
        if !self.quality.is_finite() || self.quality <= 0.0 || self.quality > 1.0 {
            return Err(RasterError::InvalidConfig(format!(
                "quality must be in (0, 1], got {}",
                self.quality
            )));
        }
        if self.max_pages == 0 {
            return Err(RasterError::InvalidConfig("max_pages must be ≥ 1".into()));
        }
        if !self.chromatic_threshold.is_finite()
            || !(0.0..=1.0).contains(&self.chromatic_threshold)
        {
            return Err(RasterError::InvalidConfig(format!(
                "chromatic_threshold must be in [0, 1], got {}",
                self.chromatic_threshold
            )));
        }
        if self.concurrency == 0 {
            return Err(RasterError::InvalidConfig("concurrency must be ≥ 1".into()));
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn scale(mut self, scale: f64) -> Self {
        self.config.scale = scale.clamp(0.1, 8.0);
        self
    }

    pub fn quality(mut self, quality: f64) -> Self {
        self.config.quality = quality.clamp(0.01, 1.0);
        self
    }

    pub fn max_pages(mut self, n: u32) -> Self {
        self.config.max_pages = n.max(1);
        self
    }

    pub fn chromatic_threshold(mut self, t: f32) -> Self {
        self.config.chromatic_threshold = t.clamp(0.0, 1.0);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.config.deadline = Some(deadline);
        self
    }

    pub fn progress(mut self, hook: ProgressHook) -> Self {
        self.config.progress = Some(hook);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, RasterError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
