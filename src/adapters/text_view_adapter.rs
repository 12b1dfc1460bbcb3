//! Terminal view: preview table plus a one-line summary per strategy.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::domain::catalog::{Resolution, ResolvedPeriod};
use crate::domain::error::PricedashError;
use crate::domain::price::PriceRow;
use crate::domain::session::DashboardView;
use crate::ports::view_port::ViewPort;

/// Preview cells in column order. Undefined numbers render as empty cells.
pub fn preview_cells(columns: &[String], rows: &[PriceRow]) -> Vec<Vec<String>> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .map(|column| {
                    if column == "date" {
                        return row.date.to_string();
                    }
                    match row.value(column) {
                        Some(v) if v.is_finite() => format_number(v),
                        _ => String::new(),
                    }
                })
                .collect()
        })
        .collect()
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{:.0}", v)
    } else {
        format!("{:.4}", v)
    }
}

pub fn render_preview_table(view: &DashboardView) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(view.columns.iter().map(Cell::new));

    for cells in preview_cells(&view.columns, &view.preview) {
        table.add_row(
            cells
                .into_iter()
                .map(|c| Cell::new(c).set_alignment(CellAlignment::Right)),
        );
    }
    table.to_string()
}

pub fn render_periods(resolved: &[ResolvedPeriod]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["period", "data file"]);
    for period in resolved {
        let file = match &period.resolution {
            Resolution::Available(key) if period.ignored_parts > 0 => {
                format!("{key} (+{} parts ignored)", period.ignored_parts)
            }
            Resolution::Available(key) => key.clone(),
            Resolution::Unavailable => "unavailable".to_string(),
        };
        table.add_row(vec![period.label.to_string(), file]);
    }
    table.to_string()
}

pub fn render_view(view: &DashboardView) -> String {
    let mut out = format!(
        "Preview: {} ({} of {} rows from {})\n",
        view.period,
        view.preview.len(),
        view.total_rows,
        view.key
    );
    out.push_str(&render_preview_table(view));
    out.push('\n');

    match &view.notice {
        Some(notice) => {
            out.push_str(notice);
            out.push('\n');
        }
        None => {
            out.push_str("Cumulative PnL of selected strategies:\n");
            for result in &view.strategies {
                out.push_str(&format!(
                    "  {:<14} {:>10.4}\n",
                    result.name(),
                    result.final_value()
                ));
            }
        }
    }
    out
}

/// Prints the rendered view to stdout.
pub struct TextViewAdapter;

impl TextViewAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TextViewAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewPort for TextViewAdapter {
    fn show(&self, view: &DashboardView) -> Result<(), PricedashError> {
        print!("{}", render_view(view));
        Ok(())
    }
}
