//! HTML dashboard adapter implementing ViewPort.
//!
//! Writes one self-contained page: preview table, candle chart and strategy
//! PnL chart as inline SVG, or the empty-state notice.

use std::fs;
use std::path::PathBuf;

use askama::Template;

use crate::adapters::svg_chart::{render_candle_svg, render_pnl_svg};
use crate::adapters::text_view_adapter::preview_cells;
use crate::domain::error::PricedashError;
use crate::domain::session::DashboardView;
use crate::ports::view_port::ViewPort;

struct StrategySummary {
    name: String,
    final_value: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate<'a> {
    title: &'a str,
    period: String,
    key: &'a str,
    total_rows: usize,
    columns: &'a [String],
    rows: Vec<Vec<String>>,
    candle_svg: String,
    pnl_svg: Option<String>,
    summaries: Vec<StrategySummary>,
    notice: Option<&'a str>,
    background: &'a str,
    foreground: &'a str,
    grid_color: &'a str,
}

pub struct HtmlViewAdapter {
    output_path: PathBuf,
    title: String,
}

impl HtmlViewAdapter {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            title: "Price Version Browser".to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn render(&self, view: &DashboardView) -> Result<String, PricedashError> {
        let theme = &view.theme;
        let template = DashboardTemplate {
            title: &self.title,
            period: view.period.to_string(),
            key: &view.key,
            total_rows: view.total_rows,
            columns: &view.columns,
            rows: preview_cells(&view.columns, &view.preview),
            candle_svg: render_candle_svg(&view.candle_chart, theme),
            pnl_svg: view
                .pnl_chart
                .as_ref()
                .map(|chart| render_pnl_svg(chart, theme)),
            summaries: view
                .strategies
                .iter()
                .map(|r| StrategySummary {
                    name: r.name().to_string(),
                    final_value: format!("{:.4}", r.final_value()),
                })
                .collect(),
            notice: view.notice.as_deref(),
            background: &theme.background,
            foreground: &theme.foreground,
            grid_color: &theme.grid_color,
        };

        template.render().map_err(|e| PricedashError::Render {
            reason: e.to_string(),
        })
    }
}

impl ViewPort for HtmlViewAdapter {
    fn show(&self, view: &DashboardView) -> Result<(), PricedashError> {
        let html = self.render(view)?;
        fs::write(&self.output_path, html)?;
        tracing::info!(path = %self.output_path.display(), "dashboard written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::{build_candle_chart, build_pnl_chart, CandleStyle, Theme};
    use crate::domain::indicator::Indicators;
    use crate::domain::period::PeriodLabel;
    use crate::domain::price::{PriceRow, PriceTable};
    use crate::domain::session::NO_STRATEGY_NOTICE;
    use crate::domain::strategy::{run_strategies, StrategyKind};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn view(strategies: &[StrategyKind]) -> DashboardView {
        let start = NaiveDate::from_ymd_opt(1980, 12, 12).unwrap();
        let table = PriceTable::from_rows(
            (0..25)
                .map(|i| {
                    let c = 10.0 + i as f64 * 0.25;
                    PriceRow::new(start + chrono::Duration::days(i), c - 0.1, c + 0.5, c - 0.5, c)
                })
                .collect(),
        );
        let theme = Theme::default();
        let indicators = Indicators::compute(&table);
        let results = run_strategies(&indicators, strategies);
        DashboardView {
            period: PeriodLabel::new("1 year (1980)"),
            key: "aapl_versions_export/ver_0.parquet/part-0.parquet".into(),
            columns: table.columns().to_vec(),
            preview: table.head(10).to_vec(),
            total_rows: table.len(),
            candle_chart: build_candle_chart("Prices", &table, Some(&indicators), CandleStyle::Ohlc, &theme),
            pnl_chart: build_pnl_chart("Cumulative PnL", &table, &results, &theme),
            notice: results.is_empty().then(|| NO_STRATEGY_NOTICE.to_string()),
            strategies: results,
            theme,
        }
    }

    #[test]
    fn renders_preview_and_charts() {
        let adapter = HtmlViewAdapter::new(PathBuf::from("unused.html"));
        let html = adapter
            .render(&view(&[StrategyKind::BuyAndHold, StrategyKind::Momentum]))
            .unwrap();

        assert!(html.contains("Data preview: 1 year (1980)"));
        assert!(html.contains("Showing 10 of 25 rows"));
        assert!(html.contains("<th>close</th>"));
        assert!(html.contains("<td>1980-12-12</td>"));
        assert_eq!(html.matches("<svg").count(), 2);
        assert!(html.contains("Selected strategy performance"));
        assert!(!html.contains(NO_STRATEGY_NOTICE));
    }

    #[test]
    fn empty_selection_shows_notice_without_pnl_chart() {
        let adapter = HtmlViewAdapter::new(PathBuf::from("unused.html"));
        let html = adapter.render(&view(&[])).unwrap();

        assert_eq!(html.matches("<svg").count(), 1);
        assert!(html.contains(NO_STRATEGY_NOTICE));
    }

    #[test]
    fn show_writes_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dashboard.html");
        let adapter = HtmlViewAdapter::new(path.clone()).with_title("AAPL");
        adapter.show(&view(&[StrategyKind::SmaCrossover])).unwrap();

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("<title>AAPL</title>"));
        assert!(html.contains("SMA Crossover"));
    }
}
