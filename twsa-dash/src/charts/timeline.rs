//! Sentiment over time line chart

use super::fonts::FONT_FAMILY;
use super::palette::sentiment_color;
use super::{backend_error, draw_png, ChartRenderer, RenderError};
use crate::pipeline::TimeSeries;
use chrono::NaiveDate;
use plotters::prelude::*;

impl ChartRenderer {
    /// One line per sentiment label across the ascending dates
    ///
    /// Dates are spaced evenly by position, so gaps between days do not
    /// stretch the x axis.
    pub fn render_time_series_chart(&self, series: &TimeSeries) -> Result<Vec<u8>, RenderError> {
        if series.is_empty() || series.labels().is_empty() {
            return Err(RenderError::EmptyView("time series"));
        }

        let dates: Vec<NaiveDate> = series.dates().copied().collect();
        let lines: Vec<(String, RGBColor, Vec<(usize, usize)>)> = series
            .labels()
            .iter()
            .map(|label| {
                let points = dates
                    .iter()
                    .enumerate()
                    .map(|(x, date)| (x, series.count(date, label)))
                    .collect();
                (label.to_string(), sentiment_color(label), points)
            })
            .collect();

        let max_count = series.max_count();
        let x_last = dates.len().saturating_sub(1).max(1);
        let y_top = max_count + max_count / 10 + 1;
        let text = self.text;

        draw_png(self.config.width, self.config.height, |root| {
            let mut builder = ChartBuilder::on(root);
            builder.margin(20);
            if text {
                builder
                    .caption("Sentiment Over Time", (FONT_FAMILY, 28.0))
                    .x_label_area_size(45)
                    .y_label_area_size(60);
            }

            let mut chart = builder
                .build_cartesian_2d(0usize..x_last, 0usize..y_top)
                .map_err(backend_error)?;

            if text {
                chart
                    .configure_mesh()
                    .x_labels(dates.len().clamp(2, 12))
                    .x_label_formatter(&|x: &usize| {
                        dates
                            .get(*x)
                            .map(|d| d.format("%Y-%m-%d").to_string())
                            .unwrap_or_default()
                    })
                    .x_desc("Date")
                    .y_desc("Count")
                    .label_style((FONT_FAMILY, 14.0))
                    .draw()
                    .map_err(backend_error)?;
            }

            for (name, color, points) in &lines {
                let color = *color;
                chart
                    .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))
                    .map_err(backend_error)?
                    .label(name.as_str())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                    });
                chart
                    .draw_series(
                        points
                            .iter()
                            .map(|&point| Circle::new(point, 4, color.filled())),
                    )
                    .map_err(backend_error)?;
            }

            if text {
                chart
                    .configure_series_labels()
                    .label_font((FONT_FAMILY, 14.0))
                    .background_style(&WHITE.mix(0.8))
                    .border_style(&BLACK)
                    .position(SeriesLabelPosition::UpperRight)
                    .draw()
                    .map_err(backend_error)?;
            }

            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::charts::test_support::*;
    use crate::charts::{ChartRenderer, RenderError};
    use crate::pipeline::TimeSeries;
    use chrono::NaiveDate;
    use twsa_common::config::ChartConfig;
    use twsa_common::Sentiment;

    fn renderer() -> ChartRenderer {
        ChartRenderer::without_text(ChartConfig {
            width: 400,
            height: 240,
            ..ChartConfig::default()
        })
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_renders_png_of_configured_size() {
        let series = TimeSeries::from_observations(vec![
            (date(1), Sentiment::Positive),
            (date(1), Sentiment::Negative),
            (date(2), Sentiment::Neutral),
            (date(5), Sentiment::Positive),
        ]);

        let png = renderer().render_time_series_chart(&series).unwrap();
        assert_eq!(&png[..8], &PNG_SIGNATURE);
        assert_eq!(png_dimensions(&png), (400, 240));
    }

    #[test]
    fn test_single_date_renders() {
        let series = TimeSeries::from_observations(vec![(date(3), Sentiment::Positive)]);
        assert!(renderer().render_time_series_chart(&series).is_ok());
    }

    #[test]
    fn test_empty_series_rejected() {
        let series = TimeSeries::from_observations(Vec::new());
        assert_eq!(
            renderer().render_time_series_chart(&series).unwrap_err(),
            RenderError::EmptyView("time series")
        );
    }
}
