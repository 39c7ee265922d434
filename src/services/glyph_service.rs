use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use crate::models::{GlyphStyle, OhlcSample};
use crate::services::scale_service::round2;
use crate::utils::ChartError;

/// Chart context every glyph draws into: sample index on x, price on y
pub type PriceChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

pub const BULLISH_COLOR: RGBColor = RGBColor(0x1E, 0xCD, 0x1E);
pub const BEARISH_COLOR: RGBColor = RGBColor(0xFC, 0x41, 0x3B);
pub const WICK_COLOR: RGBColor = RGBColor(0xD1, 0xD5, 0xDB);
const WICK_OPACITY: f64 = 0.6;

/// Canvas resolution, used to turn marker sizes (points squared) into pixels
pub const DPI: f64 = 100.0;

const BODY_WIDTH_RATIO: f64 = 0.8;
const BASE_CAP_OFFSET_RATIO: f64 = 1.2;
pub const BASE_CAP_SIZE: f64 = 500.0;
pub const TOP_CAP_SIZE_FACTOR: f64 = 7800.0;

const DOJI_HEIGHT_RATIO: f64 = 0.005;
/// Stand-in for a zero price range
pub const DEGENERATE_RANGE: f64 = 0.001;

/// Fill color for a sample: green when bullish, red otherwise
pub fn candle_color(sample: &OhlcSample) -> RGBColor {
    if sample.is_bullish() {
        BULLISH_COLOR
    } else {
        BEARISH_COLOR
    }
}

/// Pixel radius of a round marker whose area is `size` points squared
pub fn marker_radius_px(size: f64) -> i32 {
    (size.max(0.0).sqrt() / 2.0 * DPI / 72.0).round() as i32
}

/// Geometry of one rocket candle in data coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct RocketGeometry {
    pub bullish: bool,
    pub wick: [(f64, f64); 2],
    /// Lower-left and upper-right body corners
    pub body: [(f64, f64); 2],
    pub half_width: f64,
    pub base_caps: [(f64, f64); 2],
    pub base_cap_size: f64,
    pub top_cap: (f64, f64),
    pub top_cap_size: f64,
}

impl RocketGeometry {
    pub fn compute(x: f64, sample: &OhlcSample, candle_width: f64) -> Self {
        let bullish = sample.is_bullish();
        let y_base = sample.open;
        let mut y_tip = sample.close;

        // Doji: give the body a minimum height so it never collapses to a line
        if (sample.open - sample.close).abs() == 0.0 {
            let mut range = sample.high - sample.low;
            if range == 0.0 {
                range = DEGENERATE_RANGE;
            }
            let min_height = DOJI_HEIGHT_RATIO * range;
            if bullish {
                y_tip += min_height;
            } else {
                y_tip -= min_height;
            }
        }

        let half_width = round2(candle_width * BODY_WIDTH_RATIO / 2.0);
        let offset = half_width * BASE_CAP_OFFSET_RATIO;
        let top_cap_size = half_width.powi(2) * TOP_CAP_SIZE_FACTOR;

        // The two branches are not mirror images: the base cap stays on the open
        // price and the round tip on the close price whichever way the body points.
        let (body_bottom, body_top, base_y, tip_y) = if bullish {
            let body_top = y_tip;
            let body_bottom = y_base;
            (body_bottom, body_top, body_bottom, body_top)
        } else {
            let body_top = y_base;
            let body_bottom = y_tip;
            (body_bottom, body_top, body_top, body_bottom)
        };

        Self {
            bullish,
            wick: [(x, sample.low), (x, sample.high)],
            body: [(x - half_width, body_bottom), (x + half_width, body_top)],
            half_width,
            base_caps: [(x - offset, base_y), (x + offset, base_y)],
            base_cap_size: BASE_CAP_SIZE,
            top_cap: (x, tip_y),
            top_cap_size,
        }
    }
}

/// Draw one sample at index `x` with the selected glyph style
pub fn draw_glyph<DB: DrawingBackend>(
    chart: &mut PriceChart<'_, DB>,
    style: GlyphStyle,
    x: f64,
    sample: &OhlcSample,
    candle_width: f64,
    color: RGBColor,
) -> Result<(), ChartError> {
    match style {
        GlyphStyle::Rocket => {
            let geometry = RocketGeometry::compute(x, sample, candle_width);
            draw_rocket(chart, &geometry, color)
        }
    }
}

/// Wick first, then caps, then the body so the caps merge into its edges
fn draw_rocket<DB: DrawingBackend>(
    chart: &mut PriceChart<'_, DB>,
    geometry: &RocketGeometry,
    color: RGBColor,
) -> Result<(), ChartError> {
    chart
        .draw_series(std::iter::once(PathElement::new(
            geometry.wick.to_vec(),
            WICK_COLOR.mix(WICK_OPACITY).stroke_width(1),
        )))
        .map_err(ChartError::drawing)?;

    let base_radius = marker_radius_px(geometry.base_cap_size);
    chart
        .draw_series(
            geometry
                .base_caps
                .iter()
                .map(|&center| Circle::new(center, base_radius, color.filled())),
        )
        .map_err(ChartError::drawing)?;

    chart
        .draw_series(std::iter::once(Circle::new(
            geometry.top_cap,
            marker_radius_px(geometry.top_cap_size),
            color.filled(),
        )))
        .map_err(ChartError::drawing)?;

    chart
        .draw_series(std::iter::once(Rectangle::new(geometry.body, color.filled())))
        .map_err(ChartError::drawing)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SampleTime;

    fn sample(open: f64, high: f64, low: f64, close: f64) -> OhlcSample {
        OhlcSample::new(SampleTime::Ordinal(0), open, high, low, close)
    }

    #[test]
    fn test_bullish_caps_on_open_and_close() {
        let g = RocketGeometry::compute(0.0, &sample(100.0, 110.0, 90.0, 105.0), 0.4);
        assert!(g.bullish);
        assert_eq!(g.base_caps[0].1, 100.0);
        assert_eq!(g.base_caps[1].1, 100.0);
        assert_eq!(g.top_cap, (0.0, 105.0));
        assert_eq!(g.body[0].1, 100.0);
        assert_eq!(g.body[1].1, 105.0);
        assert_eq!(candle_color(&sample(100.0, 110.0, 90.0, 105.0)), BULLISH_COLOR);
    }

    #[test]
    fn test_bearish_caps_swap() {
        let g = RocketGeometry::compute(0.0, &sample(100.0, 110.0, 90.0, 95.0), 0.4);
        assert!(!g.bullish);
        // base cap stays on the open price, which is now the top of the body
        assert_eq!(g.base_caps[0].1, 100.0);
        assert_eq!(g.top_cap.1, 95.0);
        assert_eq!(g.body[0].1, 95.0);
        assert_eq!(g.body[1].1, 100.0);
        assert_eq!(candle_color(&sample(100.0, 110.0, 90.0, 95.0)), BEARISH_COLOR);
    }

    #[test]
    fn test_wick_spans_low_to_high() {
        let g = RocketGeometry::compute(3.0, &sample(10.0, 12.5, 7.25, 11.0), 0.4);
        assert_eq!(g.wick, [(3.0, 7.25), (3.0, 12.5)]);
    }

    #[test]
    fn test_body_and_cap_widths() {
        let g = RocketGeometry::compute(2.0, &sample(1.0, 3.0, 0.5, 2.0), 0.4);
        assert_eq!(g.half_width, 0.16);
        assert!((g.body[0].0 - 1.84).abs() < 1e-12);
        assert!((g.body[1].0 - 2.16).abs() < 1e-12);
        assert!((g.base_caps[0].0 - (2.0 - 0.192)).abs() < 1e-12);
        assert!((g.base_caps[1].0 - (2.0 + 0.192)).abs() < 1e-12);
        assert!((g.top_cap_size - 0.0256 * 7800.0).abs() < 1e-9);
        assert_eq!(g.base_cap_size, 500.0);
    }

    #[test]
    fn test_doji_gets_minimum_height() {
        let doji = sample(100.0, 102.0, 98.0, 100.0);
        assert!(!doji.is_bullish());

        let g = RocketGeometry::compute(0.0, &doji, 0.4);
        let height = g.body[1].1 - g.body[0].1;
        assert!((height - 0.02).abs() < 1e-9);
        assert_eq!(g.base_caps[0].1, 100.0);
        assert!((g.top_cap.1 - 99.98).abs() < 1e-9);
    }

    #[test]
    fn test_flat_doji_uses_fallback_range() {
        let g = RocketGeometry::compute(0.0, &sample(5.0, 5.0, 5.0, 5.0), 0.4);
        let height = g.body[1].1 - g.body[0].1;
        assert!(height > 0.0);
        assert!((height - 0.005 * DEGENERATE_RANGE).abs() < 1e-12);
    }

    #[test]
    fn test_marker_radius() {
        // 500 pt^2 is a ~22.4 pt wide marker, ~15.5 px radius at 100 dpi
        assert_eq!(marker_radius_px(500.0), 16);
        assert_eq!(marker_radius_px(0.0), 0);
    }

    #[test]
    fn test_body_drawn_over_wick() {
        let (w, h) = (200u32, 200u32);
        let background = RGBColor(0x11, 0x11, 0x11);
        let mut buffer = vec![0u8; (w * h * 3) as usize];
        let (body_px, corner_px) = {
            let root = BitMapBackend::with_buffer(&mut buffer, (w, h)).into_drawing_area();
            root.fill(&background).unwrap();
            let mut chart = ChartBuilder::on(&root)
                .build_cartesian_2d(-1.0..1.0, 80.0..120.0)
                .unwrap();
            let s = sample(100.0, 110.0, 90.0, 105.0);
            draw_glyph(&mut chart, GlyphStyle::Rocket, 0.0, &s, 0.4, candle_color(&s)).unwrap();
            let body_px = chart.backend_coord(&(0.0, 102.5));
            let corner_px = chart.backend_coord(&(-0.95, 82.0));
            root.present().unwrap();
            (body_px, corner_px)
        };

        let pixel = |(x, y): (i32, i32)| {
            let i = (y as usize * w as usize + x as usize) * 3;
            (buffer[i], buffer[i + 1], buffer[i + 2])
        };
        assert_eq!(pixel(body_px), (0x1E, 0xCD, 0x1E));
        assert_eq!(pixel(corner_px), (0x11, 0x11, 0x11));
    }
}
