//! Plain-text bar charts for terminals and logs

use async_trait::async_trait;
use std::fmt::Write;

use super::{ChartRenderer, RenderTarget};
use crate::Result;
use crate::models::ChartSpec;

const BAR_GLYPH: char = '█';

#[derive(Debug, Clone)]
pub struct TextRenderer {
    /// Characters used by the longest bar
    bar_width: usize,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self { bar_width: 40 }
    }
}

impl TextRenderer {
    #[must_use]
    pub fn new(bar_width: usize) -> Self {
        Self {
            bar_width: bar_width.max(1),
        }
    }

    #[must_use]
    pub fn render_to_string(&self, chart: &ChartSpec) -> String {
        let mut out = String::new();
        match &chart.title {
            Some(title) => {
                let _ = writeln!(out, "{title} ({})", chart.kind.as_str());
            }
            None => {
                let _ = writeln!(out, "[{} chart]", chart.kind.as_str());
            }
        }

        let label_width = chart.labels.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let (_, high) = chart.value_bounds();

        for (label, value) in chart.bars() {
            let (bar, shown) = match value {
                Some(v) => {
                    let ratio = (v.max(0.0) / high).clamp(0.0, 1.0);
                    let len = (ratio * self.bar_width as f64).round() as usize;
                    (BAR_GLYPH.to_string().repeat(len), format_value(v))
                }
                None => (String::new(), "n/a".to_string()),
            };
            let _ = writeln!(
                out,
                "{label:<label_width$} | {bar:<width$} {shown}",
                width = self.bar_width
            );
        }
        out
    }
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[async_trait]
impl ChartRenderer for TextRenderer {
    async fn render(&self, target: &RenderTarget, chart: &ChartSpec) -> Result<()> {
        target.write(&self.render_to_string(chart)).await
    }
}
