// Mount-time configuration.
// `CanvasProps` is what the embedder renders the canvas with; `CanvasConfig` is
// the same thing in file form (JSON), used by the viewer.

use crate::background::Background;
use crate::error::ConfigError;
use crate::export::ExportFormat;
use crate::types::{Color, LineJoin, StrokeStyle};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

pub const DEFAULT_WIDTH: u32 = 600;
pub const DEFAULT_HEIGHT: u32 = 600;

/// Everything a render pass depends on.
#[derive(Debug, Clone, Default)]
pub struct CanvasProps {
    pub width: u32,
    pub height: u32,
    pub background: Option<Background>,
    pub style: StrokeStyle,
}

impl CanvasProps {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_background(mut self, background: Option<Background>) -> Self {
        self.background = background;
        self
    }

    pub fn with_style(mut self, style: StrokeStyle) -> Self {
        self.style = style;
        self
    }

    pub fn line_color(mut self, color: Color) -> Self {
        self.style.color = color;
        self
    }

    pub fn line_join(mut self, join: LineJoin) -> Self {
        self.style.join = join;
        self
    }

    pub fn line_width(mut self, width: f32) -> Self {
        self.style.width = width;
        self
    }
}

/// File form of the mount configuration.
///
/// ```json
/// { "width": 800, "height": 600, "lineColor": "#0000ff", "lineWidth": 3,
///   "export": { "format": "png" } }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    #[serde(flatten)]
    pub style: StrokeStyle,
    pub export: ExportFormat,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            style: StrokeStyle::default(),
            export: ExportFormat::default(),
        }
    }
}

impl CanvasConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: CanvasConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let config = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.style.width.is_finite() && self.style.width > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "lineWidth must be a positive number, got {}",
                self.style.width
            )));
        }
        if let ExportFormat::Jpeg { quality } = self.export {
            if !(1..=100).contains(&quality) {
                return Err(ConfigError::Invalid(format!(
                    "jpeg quality must be within 1..=100, got {quality}"
                )));
            }
        }
        Ok(())
    }

    pub fn props(&self) -> CanvasProps {
        CanvasProps::new(self.width, self.height).with_style(self.style)
    }
}
