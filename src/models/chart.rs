//! Chart configuration and output models

use std::io::Cursor;
use std::str::FromStr;

use chrono::{FixedOffset, Offset, Utc};

use crate::utils::ChartError;

/// Glyph used to draw each sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphStyle {
    /// Rectangular body with two circular base caps and one round tip
    #[default]
    Rocket,
}

impl FromStr for GlyphStyle {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            // "triangle" is the name older callers used for the rocket glyph
            "rocket" | "triangle" => Ok(GlyphStyle::Rocket),
            other => Err(ChartError::InvalidConfig(format!("unknown glyph style '{}'", other))),
        }
    }
}

/// Caller-supplied chart options
#[derive(Debug, Clone)]
pub struct ChartConfig {
    pub glyph_style: GlyphStyle,
    pub candle_width: f64,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Offset used when printing time-of-day tick labels
    pub utc_offset: FixedOffset,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            glyph_style: GlyphStyle::Rocket,
            candle_width: 0.4,
            title: "Candlestick Chart".to_string(),
            x_label: "Date".to_string(),
            y_label: "Price".to_string(),
            utc_offset: Utc.fix(),
        }
    }
}

impl ChartConfig {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_labels(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self
    }

    pub fn with_candle_width(mut self, candle_width: f64) -> Self {
        self.candle_width = candle_width;
        self
    }

    pub fn with_glyph_style(mut self, glyph_style: GlyphStyle) -> Self {
        self.glyph_style = glyph_style;
        self
    }

    pub fn with_utc_offset(mut self, utc_offset: FixedOffset) -> Self {
        self.utc_offset = utc_offset;
        self
    }

    pub fn validate(&self) -> Result<(), ChartError> {
        if !(self.candle_width.is_finite() && self.candle_width > 0.0) {
            return Err(ChartError::InvalidConfig(format!(
                "candle width must be positive, got {}",
                self.candle_width
            )));
        }
        Ok(())
    }
}

/// Encoded PNG produced from a finished canvas
#[derive(Debug, Clone)]
pub struct RenderedImage {
    bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl RenderedImage {
    pub fn new(bytes: Vec<u8>, width: u32, height: u32) -> Self {
        Self { bytes, width, height }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Reader positioned at the first byte
    pub fn into_reader(self) -> Cursor<Vec<u8>> {
        Cursor::new(self.bytes)
    }
}
