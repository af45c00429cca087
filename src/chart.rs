//! Per-date asteroid counts and their line-chart rendering.

use std::path::Path;

use anyhow::{Result, anyhow, ensure};
use plotters::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::feed::NearEarthObjects;

pub const CHART_TITLE: &str = "Asteroids Near Earth By Date";
pub const SERIES_LABEL: &str = "Number of Asteroids Close To Earth";

/// Date labels and asteroid counts, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub counts: Vec<usize>,
}

impl ChartSeries {
    /// Maps each date to its asteroid count, keeping the upstream key order.
    pub fn from_objects(objects: &NearEarthObjects) -> Self {
        let (labels, counts) = objects
            .iter()
            .map(|(date, records)| (date.to_string(), records.len()))
            .unzip();
        Self { labels, counts }
    }

    /// Copy sorted by label, which is chronological for ISO dates.
    pub fn chronological(&self) -> Self {
        let mut points: Vec<_> = self.points().map(|(label, count)| (label.to_string(), count)).collect();
        points.sort_by(|a, b| a.0.cmp(&b.0));
        let (labels, counts) = points.into_iter().unzip();
        Self { labels, counts }
    }

    pub fn points(&self) -> impl Iterator<Item = (&str, usize)> {
        self.labels.iter().map(String::as_str).zip(self.counts.iter().copied())
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Draws the series as a PNG line chart at `path`.
pub fn render_png(series: &ChartSeries, path: &Path, (width, height): (u32, u32)) -> Result<()> {
    ensure!(!series.is_empty(), "cannot chart an empty series");

    {
        let root = BitMapBackend::new(path, (width, height)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("failed to fill canvas: {e}"))?;

        let x_max = (series.len() - 1).max(1);
        let y_max = series.counts.iter().copied().max().unwrap_or(0) + 1;

        let mut chart = ChartBuilder::on(&root)
            .caption(CHART_TITLE, ("sans-serif", 30).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(0..x_max, 0..y_max)
            .map_err(|e| anyhow!("failed to build chart: {e}"))?;

        let label_at = |index: &usize| series.labels.get(*index).cloned().unwrap_or_default();
        chart
            .configure_mesh()
            .x_labels(series.len())
            .x_label_formatter(&label_at)
            .y_desc("Asteroids")
            .draw()
            .map_err(|e| anyhow!("failed to draw mesh: {e}"))?;

        chart
            .draw_series(LineSeries::new(series.counts.iter().copied().enumerate(), &BLUE))
            .map_err(|e| anyhow!("failed to draw series: {e}"))?
            .label(SERIES_LABEL)
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));
        chart
            .draw_series(
                series
                    .counts
                    .iter()
                    .copied()
                    .enumerate()
                    .map(|point| Circle::new(point, 3, BLUE.filled())),
            )
            .map_err(|e| anyhow!("failed to draw points: {e}"))?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()
            .map_err(|e| anyhow!("failed to draw legend: {e}"))?;

        root.present()
            .map_err(|e| anyhow!("failed to render chart: {e}"))?;
    }

    info!(path = %path.display(), points = series.len(), "Chart written");
    Ok(())
}
