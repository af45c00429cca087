//! Terminal renderings of the stats panel, the series and the view state.
//!
//! Supports comfy-table panels, JSON serialization and CSV export of the series.

use std::io::Write;

use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color, Table, modifiers, presets};
use serde::Serialize;
use tracing::debug;

use crate::chart::ChartSeries;
use crate::dashboard::Dashboard;
use crate::session::{Phase, ViewState};
use crate::stats::StatsSummary;

pub const PANEL_TITLE: &str = "Neo Stats";

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table
}

/// The four headline numbers, labeled for display.
pub fn stats_table(summary: &StatsSummary) -> Table {
    let mut table = new_table();
    table.set_header(vec![PANEL_TITLE, ""]);
    let rows = [
        ("Total Asteroids Count", summary.total_count.to_string()),
        ("Fastest Asteroid Velocity", format!("{:.2} km/h", summary.max_speed)),
        ("Closest Asteroid Distance", format!("{:.2} km", summary.min_distance)),
        ("Average Size of Asteroids", format!("{:.2} km", summary.avg_size)),
    ];
    for (label, value) in rows {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn series_table(series: &ChartSeries) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Date", "Asteroids"]);
    for (label, count) in series.points() {
        table.add_row(vec![
            Cell::new(label),
            Cell::new(count).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn to_json(dashboard: &Dashboard) -> Result<String> {
    Ok(serde_json::to_string_pretty(dashboard)?)
}

#[derive(Serialize)]
struct SeriesRow<'a> {
    date: &'a str,
    count: usize,
}

/// Writes the series as `date,count` CSV rows, header first.
pub fn write_series_csv<W: Write>(writer: W, series: &ChartSeries) -> Result<()> {
    debug!(rows = series.len(), "Writing series as CSV");
    let mut writer = csv::Writer::from_writer(writer);
    for (date, count) in series.points() {
        writer.serialize(SeriesRow { date, count })?;
    }
    writer.flush()?;
    Ok(())
}

/// Text for one view state: loading indicator, results, or the failure.
///
/// The panel shows zeros until a fetch succeeds, and a failure never shows
/// the previous results.
pub fn render_state(state: &ViewState) -> String {
    match &state.phase {
        Phase::Idle => stats_table(&StatsSummary::default()).to_string(),
        Phase::Loading(range) => format!("Loading {range}…"),
        Phase::Ready(range, dashboard) => format!(
            "Asteroids near Earth, {range}\n{}\n{}",
            series_table(&dashboard.series),
            stats_table(&dashboard.summary)
        ),
        Phase::Failed(range, failure) => {
            let mut table = new_table();
            table.set_header(vec![
                Cell::new(format!("Failed: {}", failure.kind)).fg(Color::Red),
            ]);
            table.add_row(vec![format!("{range}")]);
            table.add_row(vec![failure.message.clone()]);
            table.to_string()
        }
    }
}
