//! SVG bar charts drawn with plotters

use async_trait::async_trait;
use plotters::prelude::*;
use tracing::{debug, instrument};

use super::{ChartRenderer, RenderTarget};
use crate::config::ChartConfig;
use crate::models::ChartSpec;
use crate::{ForecastError, Result};

const BAR_COLORS: [RGBColor; 2] = [RGBColor(54, 162, 235), RGBColor(255, 99, 132)];

#[derive(Debug, Clone)]
pub struct SvgRenderer {
    width: u32,
    height: u32,
    /// Caption used when the chart carries none
    default_title: Option<String>,
}

impl SvgRenderer {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            default_title: None,
        }
    }

    #[must_use]
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            default_title: Some(config.title.clone()).filter(|t| !t.is_empty()),
        }
    }

    /// Draw the chart into an SVG document
    pub fn render_to_string(&self, chart: &ChartSpec) -> Result<String> {
        let mut svg = String::new();
        {
            let root = SVGBackend::with_string(&mut svg, (self.width, self.height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(draw_err)?;

            let labels = &chart.labels;
            let (low, high) = chart.value_bounds();
            let headroom = (high - low) * 0.1;
            let y_low = if low < 0.0 { low - headroom } else { 0.0 };

            let mut builder = ChartBuilder::on(&root);
            builder
                .margin(20)
                .x_label_area_size(40)
                .y_label_area_size(80);
            if let Some(title) = chart.title.as_ref().or(self.default_title.as_ref()) {
                builder.caption(title, ("sans-serif", 24));
            }

            // Integer ranges are inclusive once segmented, so `0..n-1` gives
            // one segment per label. A single label still gets two segments
            // because plotters cannot map a one-value range.
            let last_segment = labels.len().max(2) - 1;
            let mut ctx = builder
                .build_cartesian_2d(
                    (0..last_segment).into_segmented(),
                    y_low..high + headroom,
                )
                .map_err(draw_err)?;

            ctx.configure_mesh()
                .disable_x_mesh()
                .x_label_formatter(&|x| match x {
                    SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                    _ => String::new(),
                })
                .y_label_formatter(&|y| format!("{y:.0}"))
                .draw()
                .map_err(draw_err)?;

            let bars: Vec<_> = chart
                .bars()
                .enumerate()
                .filter_map(|(i, (_, value))| value.map(|v| (i, v)))
                .map(|(i, value)| {
                    let color = BAR_COLORS[i % BAR_COLORS.len()];
                    let mut bar = Rectangle::new(
                        [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), value)],
                        color.filled(),
                    );
                    bar.set_margin(0, 0, 15, 15);
                    bar
                })
                .collect();
            ctx.draw_series(bars).map_err(draw_err)?;

            root.present().map_err(draw_err)?;
        }
        Ok(svg)
    }
}

fn draw_err<E: std::fmt::Display>(err: E) -> ForecastError {
    ForecastError::render(format!("SVG drawing failed: {err}"))
}

#[async_trait]
impl ChartRenderer for SvgRenderer {
    #[instrument(name = "render_svg", level = "debug", skip(self, chart), fields(target = %target))]
    async fn render(&self, target: &RenderTarget, chart: &ChartSpec) -> Result<()> {
        let renderer = self.clone();
        let chart = chart.clone();
        let svg = tokio::task::spawn_blocking(move || renderer.render_to_string(&chart))
            .await
            .map_err(|e| ForecastError::render(format!("SVG render task failed: {e}")))??;

        debug!(bytes = svg.len(), "SVG chart drawn");
        target.write(&svg).await
    }
}
