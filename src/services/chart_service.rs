use std::ops::Range;

use chrono::{DateTime, FixedOffset, Utc};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use tracing::debug;

use crate::models::{ChartConfig, OhlcSample, RenderedImage, SampleTime};
use crate::services::export_service;
use crate::services::glyph_service::{self, DEGENERATE_RANGE};
use crate::utils::ChartError;

pub const BACKGROUND_COLOR: RGBColor = RGBColor(0x11, 0x11, 0x11);

/// 18 x 8 inches at 100 dpi
pub const CANVAS_WIDTH: u32 = 1800;
pub const CANVAS_HEIGHT: u32 = 800;

const MAX_TIME_LABELS: usize = 15;
const Y_PADDING_RATIO: f64 = 0.10;
const TICK_LENGTH: i32 = 5;
const FONT: &str = "sans-serif";

/// In-memory RGB drawing surface. Owned by exactly one composer, then handed
/// to the exporter which consumes it.
pub struct Canvas {
    width: u32,
    height: u32,
    background: RGBColor,
    buffer: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: RGBColor) -> Self {
        Self {
            width,
            height,
            background,
            buffer: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn background(&self) -> RGBColor {
        self.background
    }

    pub fn drawing_area(&mut self) -> DrawingArea<BitMapBackend<'_>, Shift> {
        BitMapBackend::with_buffer(&mut self.buffer, (self.width, self.height)).into_drawing_area()
    }

    pub(crate) fn into_pixels(self) -> Vec<u8> {
        self.buffer
    }
}

/// Axis ranges and tick labels for a non-empty series
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLayout {
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    /// One entry per sample index, empty strings for unlabeled ticks
    pub tick_labels: Vec<String>,
    pub time_bearing: bool,
}

/// `[-2w, (n - 1) + 2w]`
pub fn x_range(sample_count: usize, candle_width: f64) -> Range<f64> {
    let margin = candle_width * 2.0;
    -margin..(sample_count as f64 - 1.0 + margin)
}

/// Lowest low to highest high, padded by 10% of that span on each side
pub fn y_range(series: &[OhlcSample]) -> Option<Range<f64>> {
    if series.is_empty() {
        return None;
    }
    let min_y = series.iter().map(|s| s.low).fold(f64::INFINITY, f64::min);
    let max_y = series.iter().map(|s| s.high).fold(f64::NEG_INFINITY, f64::max);

    let mut padding = (max_y - min_y) * Y_PADDING_RATIO;
    if padding == 0.0 {
        padding = DEGENERATE_RANGE;
    }
    Some((min_y - padding)..(max_y + padding))
}

pub fn tick_label_stride(sample_count: usize) -> usize {
    (sample_count / MAX_TIME_LABELS).max(1)
}

/// `HH:MM` every `stride` samples, `MM-DD HH:MM` on the first label and
/// wherever the calendar date changed since the previous label
pub fn time_tick_labels(times: &[DateTime<Utc>], offset: &FixedOffset) -> Vec<String> {
    let step = tick_label_stride(times.len());
    let mut labels = vec![String::new(); times.len()];

    for i in (0..times.len()).step_by(step) {
        let local = times[i].with_timezone(offset);
        let new_day = i == 0 || local.date_naive() != times[i - step].with_timezone(offset).date_naive();
        labels[i] = if new_day {
            local.format("%m-%d %H:%M").to_string()
        } else {
            local.format("%H:%M").to_string()
        };
    }
    labels
}

/// Time labels when every sample carries an instant, plain indices otherwise
pub fn tick_labels(series: &[OhlcSample], offset: &FixedOffset) -> (Vec<String>, bool) {
    let times: Option<Vec<DateTime<Utc>>> = series
        .iter()
        .map(|s| match s.time {
            SampleTime::Instant(t) => Some(t),
            SampleTime::Ordinal(_) => None,
        })
        .collect();

    match times {
        Some(times) if !times.is_empty() => (time_tick_labels(&times, offset), true),
        _ => ((0..series.len()).map(|i| i.to_string()).collect(), false),
    }
}

pub fn compute_layout(series: &[OhlcSample], config: &ChartConfig) -> Option<AxisLayout> {
    let y_range = y_range(series)?;
    let (tick_labels, time_bearing) = tick_labels(series, &config.utc_offset);
    Some(AxisLayout {
        x_range: x_range(series.len(), config.candle_width),
        y_range,
        tick_labels,
        time_bearing,
    })
}

/// Draws a series onto its own canvas
pub struct ChartComposer {
    config: ChartConfig,
    canvas: Canvas,
}

impl ChartComposer {
    pub fn new(config: ChartConfig) -> Result<Self, ChartError> {
        Self::with_canvas(config, Canvas::new(CANVAS_WIDTH, CANVAS_HEIGHT, BACKGROUND_COLOR))
    }

    pub fn with_canvas(config: ChartConfig, canvas: Canvas) -> Result<Self, ChartError> {
        config.validate()?;
        Ok(Self { config, canvas })
    }

    /// Render every sample, lay out the axes and hand back the finished canvas
    pub fn compose(mut self, series: &[OhlcSample]) -> Result<Canvas, ChartError> {
        let background = self.canvas.background();
        {
            let root = self.canvas.drawing_area();
            root.fill(&background).map_err(ChartError::drawing)?;

            match compute_layout(series, &self.config) {
                Some(layout) => {
                    debug!(
                        "Composing {} samples: x {:?}, y {:?}, time labels: {}",
                        series.len(),
                        layout.x_range,
                        layout.y_range,
                        layout.time_bearing
                    );
                    draw_chart(&root, series, &self.config, &layout)?;
                }
                None => debug!("Empty series, leaving canvas blank"),
            }

            root.present().map_err(ChartError::drawing)?;
        }
        Ok(self.canvas)
    }
}

/// Compose `series` on a fresh canvas and export it as PNG
pub fn render_chart(series: &[OhlcSample], config: ChartConfig) -> Result<RenderedImage, ChartError> {
    let canvas = ChartComposer::new(config)?.compose(series)?;
    export_service::export_png(canvas)
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    series: &[OhlcSample],
    config: &ChartConfig,
    layout: &AxisLayout,
) -> Result<(), ChartError> {
    let mut builder = ChartBuilder::on(root);
    builder
        .margin(15)
        .x_label_area_size(if layout.time_bearing { 110 } else { 50 })
        .y_label_area_size(90);
    if !config.title.is_empty() {
        builder.caption(&config.title, (FONT, 28).into_font().color(&WHITE));
    }
    let mut chart = builder
        .build_cartesian_2d(layout.x_range.clone(), layout.y_range.clone())
        .map_err(ChartError::drawing)?;

    for (i, sample) in series.iter().enumerate() {
        let color = glyph_service::candle_color(sample);
        glyph_service::draw_glyph(
            &mut chart,
            config.glyph_style,
            i as f64,
            sample,
            config.candle_width,
            color,
        )?;
    }

    // x ticks are drawn by hand below: one per sample index
    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .axis_style(WHITE.stroke_width(1))
        .label_style((FONT, 14).into_font().color(&WHITE))
        .axis_desc_style((FONT, 16).into_font().color(&WHITE))
        .y_desc(config.y_label.as_str())
        .y_label_formatter(&|y| format!("{:.2}", y))
        .draw()
        .map_err(ChartError::drawing)?;

    let (x_pixels, y_pixels) = chart.plotting_area().get_pixel_range();
    root.draw(&Rectangle::new(
        [(x_pixels.start, y_pixels.start), (x_pixels.end - 1, y_pixels.end - 1)],
        WHITE.stroke_width(1),
    ))
    .map_err(ChartError::drawing)?;

    let label_style = if layout.time_bearing {
        (FONT, 14).into_font().color(&WHITE).transform(FontTransform::Rotate90)
    } else {
        (FONT, 14)
            .into_font()
            .color(&WHITE)
            .pos(Pos::new(HPos::Center, VPos::Top))
    };

    for (i, label) in layout.tick_labels.iter().enumerate() {
        let (px, py) = chart.backend_coord(&(i as f64, layout.y_range.start));
        root.draw(&PathElement::new(
            vec![(px, py), (px, py + TICK_LENGTH)],
            WHITE.stroke_width(1),
        ))
        .map_err(ChartError::drawing)?;

        if !label.is_empty() {
            let anchor = if layout.time_bearing {
                (px + 7, py + TICK_LENGTH + 3)
            } else {
                (px, py + TICK_LENGTH + 3)
            };
            root.draw(&Text::new(label.as_str(), anchor, label_style.clone()))
                .map_err(ChartError::drawing)?;
        }
    }

    if !config.x_label.is_empty() {
        let (_, height) = root.dim_in_pixel();
        let center = (x_pixels.start + x_pixels.end) / 2;
        root.draw(&Text::new(
            config.x_label.as_str(),
            (center, height as i32 - 15),
            (FONT, 16)
                .into_font()
                .color(&WHITE)
                .pos(Pos::new(HPos::Center, VPos::Bottom)),
        ))
        .map_err(ChartError::drawing)?;
    }

    Ok(())
}
