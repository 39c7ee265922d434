//! OHLC price sample models

use chrono::{DateTime, Utc};

/// Horizontal identity of a sample: a point in time or a plain position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleTime {
    Instant(DateTime<Utc>),
    Ordinal(usize),
}

/// One trading interval summarised as open/high/low/close
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OhlcSample {
    pub time: SampleTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl OhlcSample {
    pub fn new(time: SampleTime, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self { time, open, high, low, close }
    }

    /// Bullish iff the interval closed strictly above its open.
    /// A doji (`close == open`) is not bullish.
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }
}
