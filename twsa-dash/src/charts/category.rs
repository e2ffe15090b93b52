//! Sentiment distribution bar chart

use super::fonts::FONT_FAMILY;
use super::palette::sentiment_color;
use super::{backend_error, draw_png, ChartRenderer, RenderError};
use crate::pipeline::CategoryCounts;
use plotters::prelude::*;

impl ChartRenderer {
    /// One bar per sentiment label, height = record count
    pub fn render_category_chart(&self, counts: &CategoryCounts) -> Result<Vec<u8>, RenderError> {
        if counts.is_empty() || counts.total() == 0 {
            return Err(RenderError::EmptyView("category counts"));
        }

        let bars: Vec<(String, usize, RGBColor)> = counts
            .iter()
            .map(|(label, count)| (label.to_string(), count, sentiment_color(label)))
            .collect();
        let max_count = bars.iter().map(|(_, count, _)| *count).max().unwrap_or(0);
        // Integer ranges are inclusive: n - 1 yields exactly n segments. A single
        // bar gets a second, empty segment so the range is never degenerate.
        let last_index = bars.len().saturating_sub(1).max(1);
        let y_top = max_count + max_count / 10 + 1;
        let text = self.text;

        draw_png(self.config.width, self.config.height, |root| {
            let mut builder = ChartBuilder::on(root);
            builder.margin(20);
            if text {
                builder
                    .caption("Sentiment Distribution", (FONT_FAMILY, 28.0))
                    .x_label_area_size(45)
                    .y_label_area_size(60);
            }

            let mut chart = builder
                .build_cartesian_2d((0..last_index).into_segmented(), 0usize..y_top)
                .map_err(backend_error)?;

            if text {
                let names: Vec<&str> = bars.iter().map(|(name, _, _)| name.as_str()).collect();
                chart
                    .configure_mesh()
                    .disable_x_mesh()
                    .x_labels(names.len() + 1)
                    .x_label_formatter(&|value: &SegmentValue<usize>| match value {
                        SegmentValue::Exact(i) | SegmentValue::CenterOf(i) => {
                            names.get(*i).map(|n| n.to_string()).unwrap_or_default()
                        }
                        SegmentValue::Last => String::new(),
                    })
                    .x_desc("Sentiment")
                    .y_desc("Count")
                    .label_style((FONT_FAMILY, 16.0))
                    .draw()
                    .map_err(backend_error)?;
            }

            chart
                .draw_series(bars.iter().enumerate().map(|(i, (_, count, color))| {
                    let mut bar = Rectangle::new(
                        [
                            (SegmentValue::Exact(i), 0usize),
                            (SegmentValue::Exact(i + 1), *count),
                        ],
                        color.filled(),
                    );
                    bar.set_margin(0, 0, 15, 15);
                    bar
                }))
                .map_err(backend_error)?;

            Ok(())
        })
    }
}
