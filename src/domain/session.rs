//! One user session: memoized store reads and the recompute pipeline.
//!
//! The listing is fetched at most once and each table at most once per key
//! until [`Session::clear_cache`] is called. There is no staleness check
//! against the store.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::catalog::{resolve_catalog, ResolvedPeriod, DEFAULT_EXTENSION};
use crate::domain::chart::{
    build_candle_chart, build_pnl_chart, CandleChart, CandleStyle, PnlChart, Theme,
};
use crate::domain::error::PricedashError;
use crate::domain::indicator::Indicators;
use crate::domain::loader::decode_price_table;
use crate::domain::period::{PeriodCatalog, PeriodLabel, DEFAULT_LISTING_PREFIX};
use crate::domain::price::{PriceRow, PriceTable};
use crate::domain::strategy::{run_strategies, StrategyKind, StrategyResult};
use crate::ports::store_port::StorePort;

pub const DEFAULT_PREVIEW_ROWS: usize = 100;
pub const NO_STRATEGY_NOTICE: &str =
    "No strategy selected. Pick at least one to compare cumulative PnL.";

#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub listing_prefix: String,
    pub extension: String,
    pub preview_rows: usize,
    pub candle_style: CandleStyle,
    /// Draw SMA overlays on the candle chart.
    pub show_overlays: bool,
    pub theme: Theme,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            listing_prefix: DEFAULT_LISTING_PREFIX.into(),
            extension: DEFAULT_EXTENSION.into(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            candle_style: CandleStyle::default(),
            show_overlays: true,
            theme: Theme::default(),
        }
    }
}

/// Everything the presentation shell needs for one interaction.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub period: PeriodLabel,
    pub key: String,
    pub columns: Vec<String>,
    pub preview: Vec<PriceRow>,
    pub total_rows: usize,
    pub candle_chart: CandleChart,
    pub pnl_chart: Option<PnlChart>,
    pub strategies: Vec<StrategyResult>,
    pub notice: Option<String>,
    pub theme: Theme,
}

pub struct Session<S: StorePort> {
    store: S,
    periods: PeriodCatalog,
    settings: SessionSettings,
    listing: Option<Vec<String>>,
    tables: HashMap<String, Arc<PriceTable>>,
}

impl<S: StorePort> Session<S> {
    pub fn new(store: S, periods: PeriodCatalog, settings: SessionSettings) -> Self {
        Self {
            store,
            periods,
            settings,
            listing: None,
            tables: HashMap::new(),
        }
    }

    /// Sorted data-file keys under the listing prefix.
    pub fn listing(&mut self) -> Result<&[String], PricedashError> {
        if self.listing.is_none() {
            let mut keys: Vec<String> = self
                .store
                .list(&self.settings.listing_prefix)?
                .into_iter()
                .filter(|k| k.ends_with(&self.settings.extension))
                .collect();
            keys.sort();
            tracing::info!(
                prefix = %self.settings.listing_prefix,
                files = keys.len(),
                "fetched store listing"
            );
            self.listing = Some(keys);
        }
        Ok(self.listing.as_deref().unwrap_or_default())
    }

    pub fn resolve(&mut self) -> Result<Vec<ResolvedPeriod>, PricedashError> {
        let extension = self.settings.extension.clone();
        let listing = self.listing()?.to_vec();
        Ok(resolve_catalog(&listing, &self.periods, &extension))
    }

    /// Key for `label`; `UnknownPeriod` or `CatalogEmpty` otherwise.
    pub fn resolve_period(&mut self, label: &str) -> Result<String, PricedashError> {
        if self.periods.prefix_for(label).is_none() {
            return Err(PricedashError::UnknownPeriod(label.to_string()));
        }
        let resolved = self.resolve()?;
        let period = resolved
            .iter()
            .find(|r| r.label.as_str() == label)
            .ok_or_else(|| PricedashError::UnknownPeriod(label.to_string()))?;
        period.require_key().map(str::to_string)
    }

    pub fn load_table(&mut self, key: &str) -> Result<Arc<PriceTable>, PricedashError> {
        if let Some(table) = self.tables.get(key) {
            tracing::debug!(key, "table cache hit");
            return Ok(Arc::clone(table));
        }

        tracing::debug!(key, "table cache miss");
        let data = self.store.get(key)?;
        let table = Arc::new(decode_price_table(key, data)?);
        tracing::info!(key, rows = table.len(), "loaded price table");
        self.tables.insert(key.to_string(), Arc::clone(&table));
        Ok(table)
    }

    pub fn cached_tables(&self) -> usize {
        self.tables.len()
    }

    pub fn clear_cache(&mut self) {
        self.listing = None;
        self.tables.clear();
        tracing::debug!("session cache cleared");
    }

    /// Resolver → loader → indicators → charts for one selection.
    ///
    /// Any failure aborts the whole cycle; no partial view is produced.
    pub fn recompute(
        &mut self,
        label: &str,
        strategies: &[StrategyKind],
    ) -> Result<DashboardView, PricedashError> {
        let key = self.resolve_period(label)?;
        let table = self.load_table(&key)?;

        let indicators = Indicators::compute(&table);
        tracing::debug!(
            sma_fast = indicators.sma_fast.defined_count(),
            sma_slow = indicators.sma_slow.defined_count(),
            sma_trend = indicators.sma_trend.defined_count(),
            "defined indicator rows"
        );
        let results = run_strategies(&indicators, strategies);

        let theme = &self.settings.theme;
        let candle_chart = build_candle_chart(
            &format!("Price movement: {label}"),
            &table,
            self.settings.show_overlays.then_some(&indicators),
            self.settings.candle_style,
            theme,
        );
        let pnl_chart = build_pnl_chart("Cumulative PnL", &table, &results, theme);
        let notice = if results.is_empty() {
            Some(NO_STRATEGY_NOTICE.to_string())
        } else {
            None
        };

        tracing::info!(
            period = label,
            rows = table.len(),
            strategies = results.len(),
            cached_tables = self.cached_tables(),
            "dashboard recomputed"
        );

        Ok(DashboardView {
            period: PeriodLabel::new(label),
            key,
            columns: table.columns().to_vec(),
            preview: table.head(self.settings.preview_rows).to_vec(),
            total_rows: table.len(),
            candle_chart,
            pnl_chart,
            strategies: results,
            notice,
            theme: theme.clone(),
        })
    }
}
