//! Configuration types for the catalog pipeline

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Extensions picked up when scanning a directory of source photos
pub const SUPPORTED_INPUT_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif"];

/// Extensions annotated by the full run after resizing
pub const PIPELINE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Extensions accepted for the logo asset
pub const LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Target resolution of the resize stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self::new(1280, 960)
    }
}

impl std::fmt::Display for CanvasSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// An opaque RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbColor(pub [u8; 3]);

impl RgbColor {
    pub const WHITE: Self = Self([255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0]);

    /// Parse `RRGGBB` or `#RRGGBB`
    pub fn parse_hex(value: &str) -> Result<Self> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(CatalogError::invalid_config(format!(
                "Color '{value}' must be six hex digits (RRGGBB)"
            )));
        }

        let channel = |range: std::ops::Range<usize>| {
            hex.get(range)
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                .ok_or_else(|| {
                    CatalogError::invalid_config(format!("Color '{value}' is not valid hex"))
                })
        };

        Ok(Self([channel(0..2)?, channel(2..4)?, channel(4..6)?]))
    }

    #[must_use]
    pub fn to_rgb(self) -> image::Rgb<u8> {
        image::Rgb(self.0)
    }
}

impl std::fmt::Display for RgbColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Where the scalable annotation font comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontSource {
    /// Family name looked up in the system font database
    Family(String),
    /// Explicit TrueType/OpenType file
    File(PathBuf),
}

impl FontSource {
    /// Interpret a user-supplied font argument.
    ///
    /// Values that name an existing file or end in a font extension are treated
    /// as paths, everything else as a family name.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        let path = Path::new(value);
        let has_font_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "ttf" | "otf" | "ttc"));

        if has_font_extension || path.is_file() {
            Self::File(path.to_path_buf())
        } else {
            Self::Family(value.to_string())
        }
    }
}

impl Default for FontSource {
    fn default() -> Self {
        Self::Family("Arial".to_string())
    }
}

impl std::fmt::Display for FontSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Family(name) => write!(f, "{name}"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Text style of the burned-in product code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Preferred scalable font
    pub font: FontSource,
    /// Pixels per em
    pub size: f32,
    pub color: RgbColor,
    /// Top-left origin of the text in canvas pixels
    pub position: (i32, i32),
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font: FontSource::default(),
            size: 50.0,
            color: RgbColor::BLACK,
            position: (250, 800),
        }
    }
}

/// Label text pieces: `{base_text}{counter}{suffix}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelConfig {
    pub base_text: String,
    /// First counter value of a run
    pub start: u64,
    pub suffix: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            base_text: "A4P-".to_string(),
            start: 25,
            suffix: " SIZE-10X14 CODE-BGN".to_string(),
        }
    }
}

/// Logo bounding box and placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoPlacement {
    pub max_width: u32,
    pub max_height: u32,
    /// Top-left offset on the target image
    pub offset: (i32, i32),
}

impl Default for LogoPlacement {
    fn default() -> Self {
        Self {
            max_width: 170,
            max_height: 170,
            offset: (0, 0),
        }
    }
}

/// Complete configuration of one pipeline run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub canvas: CanvasSize,
    pub background: RgbColor,
    pub text: TextStyle,
    pub label: LabelConfig,
    pub logo: LogoPlacement,
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl PipelineConfig {
    /// Create a new pipeline configuration builder
    #[must_use]
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::new()
    }

    /// Validate configuration values
    ///
    /// # Errors
    /// - Zero canvas or logo box dimensions
    /// - Non-positive or non-finite font size
    pub fn validate(&self) -> Result<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(CatalogError::invalid_config(format!(
                "Canvas size must be non-zero, got {}",
                self.canvas
            )));
        }
        if self.logo.max_width == 0 || self.logo.max_height == 0 {
            return Err(CatalogError::invalid_config(format!(
                "Logo bounding box must be non-zero, got {}x{}",
                self.logo.max_width, self.logo.max_height
            )));
        }
        if !self.text.size.is_finite() || self.text.size <= 0.0 {
            return Err(CatalogError::invalid_config(format!(
                "Font size must be positive, got {}",
                self.text.size
            )));
        }
        Ok(())
    }
}

/// Builder for `PipelineConfig`
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn canvas_size(mut self, width: u32, height: u32) -> Self {
        self.config.canvas = CanvasSize::new(width, height);
        self
    }

    #[must_use]
    pub fn background(mut self, color: RgbColor) -> Self {
        self.config.background = color;
        self
    }

    #[must_use]
    pub fn font(mut self, font: FontSource) -> Self {
        self.config.text.font = font;
        self
    }

    #[must_use]
    pub fn font_size(mut self, size: f32) -> Self {
        self.config.text.size = size;
        self
    }

    #[must_use]
    pub fn text_color(mut self, color: RgbColor) -> Self {
        self.config.text.color = color;
        self
    }

    #[must_use]
    pub fn text_position(mut self, x: i32, y: i32) -> Self {
        self.config.text.position = (x, y);
        self
    }

    #[must_use]
    pub fn base_text<S: Into<String>>(mut self, base_text: S) -> Self {
        self.config.label.base_text = base_text.into();
        self
    }

    #[must_use]
    pub fn counter_start(mut self, start: u64) -> Self {
        self.config.label.start = start;
        self
    }

    #[must_use]
    pub fn label_suffix<S: Into<String>>(mut self, suffix: S) -> Self {
        self.config.label.suffix = suffix.into();
        self
    }

    #[must_use]
    pub fn logo_box(mut self, max_width: u32, max_height: u32) -> Self {
        self.config.logo.max_width = max_width;
        self.config.logo.max_height = max_height;
        self
    }

    #[must_use]
    pub fn logo_offset(mut self, x: i32, y: i32) -> Self {
        self.config.logo.offset = (x, y);
        self
    }

    /// Build the pipeline configuration
    ///
    /// # Errors
    /// Returns `CatalogError::InvalidConfig` when validation fails
    pub fn build(self) -> Result<PipelineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Case-insensitive extension check against an allow-list
#[must_use]
pub fn has_extension<P: AsRef<Path>>(path: P, extensions: &[&str]) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| extensions.contains(&ext.to_lowercase().as_str()))
}
