//! Data models for the chart bot
//!
//! Plain data passed between the data source, the rendering services and commands.

pub mod chart;
pub mod ohlc;
pub mod summary;

pub use chart::{ChartConfig, GlyphStyle, RenderedImage};
pub use ohlc::{OhlcSample, SampleTime};
pub use summary::CoinSummary;
