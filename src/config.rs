//! Configuration types for PDF export.
//!
//! [`RenderOptions`] is the fixed render table handed to the rendering
//! capability on every export: margins, image encoding, rasterisation
//! parameters and page geometry. It is an immutable value built once and
//! passed into the exporter, never a literal buried inside the export call,
//! so tests can swap it and renderers can read it without globals.
//!
//! The serde representation of [`RenderOptions`] is exactly the option object
//! understood by the browser-side html2pdf pipeline (`margin`, `filename`,
//! `image`, `html2canvas`, `jsPDF`). [`RenderOptions::to_html2pdf_json`]
//! produces it for front-ends that still render in the browser.
//!
//! [`ExportConfig`] adds the one thing a native exporter needs on top:
//! where the downloaded file lands.

use crate::error::ExportError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name used when the caller gives none (or an empty one).
pub const DEFAULT_FILENAME: &str = "belge.pdf";

/// Resolve the caller-supplied filename, falling back to [`DEFAULT_FILENAME`].
///
/// An empty string counts as "not given".
pub fn resolve_filename(filename: Option<&str>) -> String {
    match filename {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_FILENAME.to_string(),
    }
}

/// Fixed render configuration for one export.
///
/// Built via [`RenderOptions::builder()`] or [`RenderOptions::default()`],
/// which reproduces the reference table: 15 mm margins, JPEG at 0.98,
/// scale 2, CORS on, improved letter rendering on, logging off, A4 portrait.
///
/// # Example
/// ```rust
/// use cvpdf::RenderOptions;
///
/// let options = RenderOptions::builder()
///     .filename("cv.pdf")
///     .build()
///     .unwrap();
/// assert_eq!(options.margin.top, 15.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Page insets, in [`PageOptions::unit`].
    pub margin: Margins,

    /// Name of the produced file.
    pub filename: String,

    /// Encoding of the rasterised page images.
    pub image: ImageOptions,

    /// Parameters for rasterising the prepared content.
    #[serde(rename = "html2canvas")]
    pub raster: RasterOptions,

    /// Output page geometry.
    #[serde(rename = "jsPDF")]
    pub page: PageOptions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            margin: Margins::uniform(15.0),
            filename: DEFAULT_FILENAME.to_string(),
            image: ImageOptions::default(),
            raster: RasterOptions::default(),
            page: PageOptions::default(),
        }
    }
}

impl RenderOptions {
    /// Create a new builder for `RenderOptions`.
    pub fn builder() -> RenderOptionsBuilder {
        RenderOptionsBuilder {
            options: Self::default(),
        }
    }

    /// Copy of these options with the filename replaced.
    pub fn with_filename(&self, filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..self.clone()
        }
    }

    /// Serialise to the html2pdf option object.
    pub fn to_html2pdf_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::Internal(format!("serialise render options: {e}")))
    }
}

/// Builder for [`RenderOptions`].
#[derive(Debug)]
pub struct RenderOptionsBuilder {
    options: RenderOptions,
}

impl RenderOptionsBuilder {
    /// Same inset on all four sides.
    pub fn margin(mut self, inset: f64) -> Self {
        self.options.margin = Margins::uniform(inset);
        self
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.options.margin = margins;
        self
    }

    pub fn filename(mut self, name: impl Into<String>) -> Self {
        self.options.filename = name.into();
        self
    }

    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.options.image.format = format;
        self
    }

    pub fn image_quality(mut self, quality: f64) -> Self {
        self.options.image.quality = quality;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.options.raster.scale = scale;
        self
    }

    pub fn use_cors(mut self, v: bool) -> Self {
        self.options.raster.use_cors = v;
        self
    }

    pub fn letter_rendering(mut self, v: bool) -> Self {
        self.options.raster.letter_rendering = v;
        self
    }

    pub fn logging(mut self, v: bool) -> Self {
        self.options.raster.logging = v;
        self
    }

    pub fn unit(mut self, unit: Unit) -> Self {
        self.options.page.unit = unit;
        self
    }

    pub fn format(mut self, format: PaperFormat) -> Self {
        self.options.page.format = format;
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.options.page.orientation = orientation;
        self
    }

    /// Build the options, validating constraints.
    pub fn build(self) -> Result<RenderOptions, ExportError> {
        let o = &self.options;
        if !(0.0..=1.0).contains(&o.image.quality) {
            return Err(ExportError::InvalidConfig(format!(
                "Image quality must be 0–1, got {}",
                o.image.quality
            )));
        }
        if o.raster.scale.is_nan() || o.raster.scale <= 0.0 {
            return Err(ExportError::InvalidConfig(format!(
                "Scale must be > 0, got {}",
                o.raster.scale
            )));
        }
        if o.margin.as_array().iter().any(|m| m.is_nan() || *m < 0.0) {
            return Err(ExportError::InvalidConfig(format!(
                "Margins must be ≥ 0, got {:?}",
                o.margin.as_array()
            )));
        }
        if o.filename.is_empty() {
            return Err(ExportError::InvalidConfig("Filename must not be empty".into()));
        }
        Ok(self.options)
    }
}

// ── Margins ──────────────────────────────────────────────────────────────

/// Four page insets.
///
/// Serialised as the `[top, left, bottom, right]` array html2pdf expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct Margins {
    pub top: f64,
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
}

impl Margins {
    pub fn uniform(inset: f64) -> Self {
        Self {
            top: inset,
            left: inset,
            bottom: inset,
            right: inset,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.top, self.left, self.bottom, self.right]
    }
}

impl From<[f64; 4]> for Margins {
    fn from([top, left, bottom, right]: [f64; 4]) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }
}

impl From<Margins> for [f64; 4] {
    fn from(m: Margins) -> Self {
        m.as_array()
    }
}

// ── Image encoding ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImageOptions {
    #[serde(rename = "type")]
    pub format: ImageFormat,
    /// Encoder quality, 0–1. Default: 0.98.
    pub quality: f64,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            format: ImageFormat::Jpeg,
            quality: 0.98,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

// ── Rasterisation ────────────────────────────────────────────────────────

/// How the prepared content is rasterised before pagination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterOptions {
    /// Device-pixel multiplier. Default: 2.
    ///
    /// At 2× a 15 mm-margin A4 page comes out sharp enough for print while
    /// keeping the embedded JPEGs to a few hundred kilobytes each.
    pub scale: f64,

    /// Load cross-origin images (profile photos hosted on a CDN). Default: true.
    #[serde(rename = "useCORS")]
    pub use_cors: bool,

    /// Improved letter rendering. Default: true.
    #[serde(rename = "letterRendering")]
    pub letter_rendering: bool,

    /// Rasteriser's own diagnostic logging. Default: false.
    pub logging: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            use_cors: true,
            letter_rendering: true,
            logging: false,
        }
    }
}

// ── Page geometry ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageOptions {
    pub unit: Unit,
    pub format: PaperFormat,
    pub orientation: Orientation,
}

/// Length unit for margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Mm,
    Cm,
    In,
    Pt,
    Px,
}

impl Unit {
    /// Convert a length in this unit to inches (CSS pixels are 1/96 in).
    pub fn to_inches(self, value: f64) -> f64 {
        match self {
            Unit::Mm => value / 25.4,
            Unit::Cm => value / 2.54,
            Unit::In => value,
            Unit::Pt => value / 72.0,
            Unit::Px => value / 96.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaperFormat {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PaperFormat {
    /// Portrait width and height in millimetres.
    pub fn size_mm(self) -> (f64, f64) {
        match self {
            PaperFormat::A3 => (297.0, 420.0),
            PaperFormat::A4 => (210.0, 297.0),
            PaperFormat::A5 => (148.0, 210.0),
            PaperFormat::Letter => (215.9, 279.4),
            PaperFormat::Legal => (215.9, 355.6),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

// ── Export configuration ─────────────────────────────────────────────────

/// Configuration for a [`crate::export::PdfExporter`].
///
/// # Example
/// ```rust
/// use cvpdf::ExportConfig;
///
/// let config = ExportConfig::builder()
///     .output_dir("out")
///     .build()
///     .unwrap();
/// assert_eq!(config.options.filename, "belge.pdf");
/// ```
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Render table used for every export. The filename is replaced per call.
    pub options: RenderOptions,

    /// Directory the finished PDF is written to. Default: current directory.
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            options: RenderOptions::default(),
            output_dir: PathBuf::from("."),
        }
    }
}

impl ExportConfig {
    pub fn builder() -> ExportConfigBuilder {
        ExportConfigBuilder {
            config: Self::default(),
        }
    }

    /// Where a file with the given name ends up.
    ///
    /// Only the final path component of `filename` is used, the same way a
    /// browser strips directories from a download name.
    pub fn output_path(&self, filename: &str) -> PathBuf {
        let name = Path::new(filename)
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_FILENAME.into());
        self.output_dir.join(name)
    }
}

/// Builder for [`ExportConfig`].
#[derive(Debug)]
pub struct ExportConfigBuilder {
    config: ExportConfig,
}

impl ExportConfigBuilder {
    pub fn options(mut self, options: RenderOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExportConfig, ExportError> {
        if self.config.output_dir.as_os_str().is_empty() {
            return Err(ExportError::InvalidConfig(
                "Output directory must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
