//! CLI definition and dispatch.
//!
//! Each invocation is one interaction: the selected period and strategies run
//! through [`Session::recompute`] once and the result goes to a view adapter.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::fs_store_adapter::FsStoreAdapter;
use crate::adapters::html_view_adapter::HtmlViewAdapter;
use crate::adapters::text_view_adapter::{render_periods, render_preview_table, TextViewAdapter};
use crate::domain::catalog::DEFAULT_EXTENSION;
use crate::domain::chart::{CandleStyle, Theme};
use crate::domain::error::PricedashError;
use crate::domain::period::{PeriodCatalog, PeriodEntry, PeriodLabel, DEFAULT_LISTING_PREFIX};
use crate::domain::session::{Session, SessionSettings, DEFAULT_PREVIEW_ROWS};
use crate::domain::strategy::StrategyKind;
use crate::ports::config_port::ConfigPort;
use crate::ports::store_port::StorePort;
use crate::ports::view_port::ViewPort;

pub const DEFAULT_STORE_ROOT: &str = "./data";
pub const CONFIG_ENV: &str = "PRICEDASH_CONFIG";
pub const STORE_ROOT_ENV: &str = "PRICEDASH_STORE_ROOT";

#[derive(Parser, Debug)]
#[command(
    name = "pricedash",
    about = "Browse historical price versions and compare simple strategies"
)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List configured periods and the data file each resolves to
    Periods {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Print the first rows of a period's table
    Preview {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        period: String,
        #[arg(short = 'n', long)]
        rows: Option<usize>,
    },
    /// Build the dashboard for a period and set of strategies
    Dashboard {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        period: String,
        /// Repeatable: "Buy & Hold", "SMA Crossover", "Momentum"
        #[arg(short, long = "strategy")]
        strategies: Vec<String>,
        /// Write an HTML page instead of printing to the terminal
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    let result = match cli.command {
        Command::Periods { config } => run_periods(config.as_ref()),
        Command::Preview {
            config,
            period,
            rows,
        } => run_preview(config.as_ref(), &period, rows),
        Command::Dashboard {
            config,
            period,
            strategies,
            output,
        } => run_dashboard(config.as_ref(), &period, &strategies, output.as_ref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Falls back to `PRICEDASH_CONFIG`, then to an empty config.
pub fn load_config(path: Option<&PathBuf>) -> Result<FileConfigAdapter, PricedashError> {
    let path = path
        .cloned()
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            FileConfigAdapter::from_file(&path)
        }
        None => Ok(FileConfigAdapter::empty()),
    }
}

/// Periods come from `[periods] order` plus one `label = prefix` key per label;
/// without `order` the built-in periods are used.
pub fn build_period_catalog(config: &dyn ConfigPort) -> Result<PeriodCatalog, PricedashError> {
    let order = config.get_list("periods", "order");
    if order.is_empty() {
        return Ok(PeriodCatalog::default());
    }

    let mut entries = Vec::with_capacity(order.len());
    for label in order {
        let prefix = config
            .get_string("periods", &label)
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| PricedashError::ConfigMissing {
                section: "periods".into(),
                key: label.clone(),
            })?;
        entries.push(PeriodEntry {
            label: PeriodLabel::new(label),
            prefix: prefix.trim().to_string(),
        });
    }
    Ok(PeriodCatalog::new(entries))
}

/// Bare hex digits get a leading `#`, since `#` starts an INI comment.
pub fn normalize_color(value: &str) -> String {
    let v = value.trim();
    let is_hex = matches!(v.len(), 3 | 6) && v.chars().all(|c| c.is_ascii_hexdigit());
    if is_hex { format!("#{v}") } else { v.to_string() }
}

fn color(config: &dyn ConfigPort, key: &str, default: &str) -> String {
    config
        .get_string("chart", key)
        .filter(|v| !v.trim().is_empty())
        .map(|v| normalize_color(&v))
        .unwrap_or_else(|| default.to_string())
}

fn positive_int(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: i64,
) -> Result<u32, PricedashError> {
    let value = config.get_int(section, key, default);
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| PricedashError::ConfigInvalid {
            section: section.into(),
            key: key.into(),
            reason: format!("must be a positive integer, got {value}"),
        })
}

pub fn build_theme(config: &dyn ConfigPort) -> Result<Theme, PricedashError> {
    let defaults = Theme::default();
    let line_palette = {
        let configured: Vec<String> = config
            .get_list("chart", "line_palette")
            .iter()
            .map(|c| normalize_color(c))
            .collect();
        if configured.is_empty() {
            defaults.line_palette.clone()
        } else {
            configured
        }
    };

    Ok(Theme {
        up_color: color(config, "up_color", &defaults.up_color),
        down_color: color(config, "down_color", &defaults.down_color),
        background: color(config, "background", &defaults.background),
        foreground: color(config, "foreground", &defaults.foreground),
        grid_color: color(config, "grid_color", &defaults.grid_color),
        sma_fast_color: color(config, "sma_fast_color", &defaults.sma_fast_color),
        sma_slow_color: color(config, "sma_slow_color", &defaults.sma_slow_color),
        line_palette,
        width: positive_int(config, "chart", "width", defaults.width as i64)?,
        height: positive_int(config, "chart", "height", defaults.height as i64)?,
    })
}

pub fn build_session_settings(config: &dyn ConfigPort) -> Result<SessionSettings, PricedashError> {
    let candle_style = match config.get_string("chart", "candle_style") {
        Some(s) => CandleStyle::parse(&s).ok_or_else(|| PricedashError::ConfigInvalid {
            section: "chart".into(),
            key: "candle_style".into(),
            reason: format!("expected ohlc or body, got {s}"),
        })?,
        None => CandleStyle::default(),
    };
    if candle_style == CandleStyle::Body {
        tracing::warn!("candle_style = body is a legacy wick-less rendering; prefer ohlc");
    }

    let preview_rows = config.get_int("dashboard", "preview_rows", DEFAULT_PREVIEW_ROWS as i64);
    let preview_rows = usize::try_from(preview_rows).map_err(|_| PricedashError::ConfigInvalid {
        section: "dashboard".into(),
        key: "preview_rows".into(),
        reason: format!("must not be negative, got {preview_rows}"),
    })?;

    Ok(SessionSettings {
        listing_prefix: config
            .get_string("store", "listing_prefix")
            .unwrap_or_else(|| DEFAULT_LISTING_PREFIX.to_string()),
        extension: config
            .get_string("store", "extension")
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string()),
        preview_rows,
        candle_style,
        show_overlays: config.get_bool("chart", "show_overlays", true),
        theme: build_theme(config)?,
    })
}

pub fn parse_strategies(names: &[String]) -> Result<Vec<StrategyKind>, PricedashError> {
    let mut kinds = Vec::with_capacity(names.len());
    for name in names {
        let kind: StrategyKind = name.parse()?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    Ok(kinds)
}

pub fn open_store(config: &dyn ConfigPort) -> Result<Box<dyn StorePort>, PricedashError> {
    let backend = config
        .get_string("store", "backend")
        .unwrap_or_else(|| "fs".to_string());

    match backend.trim().to_lowercase().as_str() {
        "fs" | "local" => {
            let root = std::env::var(STORE_ROOT_ENV)
                .ok()
                .filter(|v| !v.is_empty())
                .or_else(|| config.get_string("store", "root"))
                .unwrap_or_else(|| DEFAULT_STORE_ROOT.to_string());
            tracing::debug!(root = %root, "using local directory store");
            Ok(Box::new(FsStoreAdapter::new(PathBuf::from(root))))
        }
        other => Err(PricedashError::ConfigInvalid {
            section: "store".into(),
            key: "backend".into(),
            reason: format!("unsupported backend {other}"),
        }),
    }
}

pub fn build_session(
    config: &dyn ConfigPort,
) -> Result<Session<Box<dyn StorePort>>, PricedashError> {
    let periods = build_period_catalog(config)?;
    let settings = build_session_settings(config)?;
    let store = open_store(config)?;
    Ok(Session::new(store, periods, settings))
}

fn run_periods(config_path: Option<&PathBuf>) -> Result<(), PricedashError> {
    let config = load_config(config_path)?;
    let mut session = build_session(&config)?;
    let resolved = session.resolve()?;
    println!("{}", render_periods(&resolved));
    Ok(())
}

fn run_preview(
    config_path: Option<&PathBuf>,
    period: &str,
    rows: Option<usize>,
) -> Result<(), PricedashError> {
    let config = load_config(config_path)?;
    let periods = build_period_catalog(&config)?;
    let mut settings = build_session_settings(&config)?;
    if let Some(rows) = rows {
        settings.preview_rows = rows;
    }
    let mut session = Session::new(open_store(&config)?, periods, settings);

    let view = session.recompute(period, &[])?;
    println!(
        "{} ({} of {} rows from {})",
        view.period,
        view.preview.len(),
        view.total_rows,
        view.key
    );
    println!("{}", render_preview_table(&view));
    Ok(())
}

fn run_dashboard(
    config_path: Option<&PathBuf>,
    period: &str,
    strategy_names: &[String],
    output: Option<&PathBuf>,
) -> Result<(), PricedashError> {
    let strategies = parse_strategies(strategy_names)?;
    let config = load_config(config_path)?;
    let mut session = build_session(&config)?;
    let title = config.get_string("dashboard", "title");

    match output {
        Some(path) => {
            let mut adapter = HtmlViewAdapter::new(path.clone());
            if let Some(title) = title {
                adapter = adapter.with_title(title);
            }
            run_pipeline(&mut session, period, &strategies, &adapter)?;
            eprintln!("Dashboard written to: {}", path.display());
            Ok(())
        }
        None => run_pipeline(&mut session, period, &strategies, &TextViewAdapter::new()),
    }
}

/// One recompute cycle handed to a view. Nothing is shown if any stage fails.
pub fn run_pipeline<S: StorePort>(
    session: &mut Session<S>,
    period: &str,
    strategies: &[StrategyKind],
    view_port: &dyn ViewPort,
) -> Result<(), PricedashError> {
    let view = session.recompute(period, strategies)?;
    view_port.show(&view)
}
