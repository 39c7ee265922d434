//! Market summary shown next to a chart

/// Spot figures for one coin in the quote currency
#[derive(Debug, Clone, PartialEq)]
pub struct CoinSummary {
    pub price: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
}
