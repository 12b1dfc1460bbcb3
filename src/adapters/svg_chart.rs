//! SVG rendering of chart descriptions.
//!
//! Rows are spaced evenly along the x axis by index, so non-trading days leave
//! no gaps. Lines break wherever a value is undefined.

use crate::domain::chart::{CandleChart, CandleMark, CandleStyle, LineSeries, PnlChart, Theme};

const PADDING_LEFT: f64 = 64.0;
const PADDING_RIGHT: f64 = 16.0;
const PADDING_TOP: f64 = 36.0;
const PADDING_BOTTOM: f64 = 44.0;
const Y_TICKS: usize = 5;

struct Frame {
    width: f64,
    height: f64,
    count: usize,
    lo: f64,
    hi: f64,
}

impl Frame {
    fn new(theme: &Theme, count: usize, lo: f64, hi: f64) -> Self {
        // flat series still get a visible band
        let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) };
        Self {
            width: theme.width.max(200) as f64,
            height: theme.height.max(120) as f64,
            count,
            lo,
            hi,
        }
    }

    fn plot_width(&self) -> f64 {
        self.width - PADDING_LEFT - PADDING_RIGHT
    }

    fn plot_height(&self) -> f64 {
        self.height - PADDING_TOP - PADDING_BOTTOM
    }

    /// Centre of slot `i`.
    fn x(&self, i: usize) -> f64 {
        PADDING_LEFT + (i as f64 + 0.5) * self.slot()
    }

    fn slot(&self) -> f64 {
        self.plot_width() / self.count.max(1) as f64
    }

    fn y(&self, value: f64) -> f64 {
        PADDING_TOP + (self.hi - value) / (self.hi - self.lo) * self.plot_height()
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn open_svg(frame: &Frame, theme: &Theme, title: &str) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}" font-family="sans-serif" font-size="11"><rect width="100%" height="100%" fill="{bg}"/><text x="{x:.1}" y="22" fill="{fg}" font-size="14">{title}</text>"#,
        w = frame.width,
        h = frame.height,
        bg = escape_xml(&theme.background),
        x = PADDING_LEFT,
        fg = escape_xml(&theme.foreground),
        title = escape_xml(title),
    )
}

fn empty_svg(theme: &Theme, title: &str, message: &str) -> String {
    let frame = Frame::new(theme, 0, 0.0, 1.0);
    format!(
        r#"{}<text x="{:.1}" y="{:.1}" fill="{}">{}</text></svg>"#,
        open_svg(&frame, theme, title),
        PADDING_LEFT,
        frame.height / 2.0,
        escape_xml(&theme.foreground),
        escape_xml(message)
    )
}

fn draw_axes(
    frame: &Frame,
    theme: &Theme,
    x_label: &str,
    y_label: &str,
    first_date: &str,
    last_date: &str,
) -> String {
    let fg = escape_xml(&theme.foreground);
    let grid = escape_xml(&theme.grid_color);
    let bottom = PADDING_TOP + frame.plot_height();
    let right = PADDING_LEFT + frame.plot_width();

    let ticks: Vec<String> = (0..=Y_TICKS)
        .map(|t| {
            let value = frame.lo + (frame.hi - frame.lo) * t as f64 / Y_TICKS as f64;
            let y = frame.y(value);
            format!(
                r#"<line x1="{:.1}" y1="{y:.1}" x2="{:.1}" y2="{y:.1}" stroke="{grid}" stroke-width="0.5"/><text x="{:.1}" y="{:.1}" fill="{fg}" text-anchor="end">{}</text>"#,
                PADDING_LEFT,
                right,
                PADDING_LEFT - 6.0,
                y + 4.0,
                format_tick(value),
            )
        })
        .collect();

    let axes = format!(
        r#"<line x1="{l:.1}" y1="{t:.1}" x2="{l:.1}" y2="{b:.1}" stroke="{fg}"/><line x1="{l:.1}" y1="{b:.1}" x2="{r:.1}" y2="{b:.1}" stroke="{fg}"/>"#,
        l = PADDING_LEFT,
        t = PADDING_TOP,
        b = bottom,
        r = right,
    );
    let dates = format!(
        r#"<text x="{:.1}" y="{:.1}" fill="{fg}">{}</text><text x="{:.1}" y="{:.1}" fill="{fg}" text-anchor="end">{}</text>"#,
        PADDING_LEFT,
        bottom + 16.0,
        escape_xml(first_date),
        right,
        bottom + 16.0,
        escape_xml(last_date),
    );
    let labels = format!(
        r#"<text x="{:.1}" y="{:.1}" fill="{fg}" text-anchor="middle">{}</text><text transform="translate(14 {:.1}) rotate(-90)" fill="{fg}" text-anchor="middle">{}</text>"#,
        PADDING_LEFT + frame.plot_width() / 2.0,
        frame.height - 8.0,
        escape_xml(x_label),
        PADDING_TOP + frame.plot_height() / 2.0,
        escape_xml(y_label),
    );

    format!("{}{axes}{dates}{labels}", ticks.join(""))
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 1000.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

/// Polyline segments split at undefined values.
fn line_segments(series: &LineSeries, frame: &Frame) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for (i, point) in series.points.iter().enumerate() {
        if point.value.is_finite() {
            current.push(format!("{:.1},{:.1}", frame.x(i), frame.y(point.value)));
        } else if !current.is_empty() {
            segments.push(current.join(" "));
            current.clear();
        }
    }
    if !current.is_empty() {
        segments.push(current.join(" "));
    }
    segments
}

fn draw_line(series: &LineSeries, frame: &Frame) -> String {
    let color = escape_xml(&series.color);
    line_segments(series, frame)
        .iter()
        .map(|segment| {
            format!(
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{segment}"/>"#
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

fn draw_legend(lines: &[LineSeries], frame: &Frame) -> String {
    let mut x = frame.width - PADDING_RIGHT;
    let mut entries = Vec::with_capacity(lines.len());
    for series in lines.iter().rev() {
        let color = escape_xml(&series.color);
        let text_width = 7.0 * series.name.chars().count() as f64;
        x -= text_width + 22.0;
        entries.push(format!(
            r#"<rect x="{x:.1}" y="14" width="12" height="3" fill="{color}"/><text x="{:.1}" y="20" fill="{color}">{}</text>"#,
            x + 16.0,
            escape_xml(&series.name),
        ));
    }
    entries.join("")
}

fn draw_candle(
    candle: &CandleMark,
    i: usize,
    frame: &Frame,
    style: CandleStyle,
    color: &str,
) -> String {
    let x = frame.x(i);
    let body_width = (frame.slot() * 0.7).max(1.0);

    let wick = if style == CandleStyle::Ohlc && candle.high.is_finite() && candle.low.is_finite() {
        format!(
            r#"<line x1="{x:.1}" y1="{:.1}" x2="{x:.1}" y2="{:.1}" stroke="{color}" stroke-width="1"/>"#,
            frame.y(candle.high),
            frame.y(candle.low),
        )
    } else {
        String::new()
    };

    let body = if candle.open.is_finite() && candle.close.is_finite() {
        let top = frame.y(candle.open.max(candle.close));
        let bottom = frame.y(candle.open.min(candle.close));
        format!(
            r#"<rect x="{:.1}" y="{top:.1}" width="{body_width:.1}" height="{:.1}" fill="{color}"/>"#,
            x - body_width / 2.0,
            (bottom - top).max(1.0),
        )
    } else {
        String::new()
    };

    wick + &body
}

pub fn render_candle_svg(chart: &CandleChart, theme: &Theme) -> String {
    let Some((lo, hi)) = chart.value_range() else {
        return empty_svg(theme, &chart.title, "No price data available.");
    };

    let frame = Frame::new(theme, chart.candles.len(), lo, hi);
    let first = chart.candles.first().map(|c| c.date.to_string()).unwrap_or_default();
    let last = chart.candles.last().map(|c| c.date.to_string()).unwrap_or_default();

    let up = escape_xml(&theme.up_color);
    let down = escape_xml(&theme.down_color);

    let mut parts = vec![
        open_svg(&frame, theme, &chart.title),
        draw_axes(&frame, theme, &chart.x_label, &chart.y_label, &first, &last),
    ];
    parts.extend(chart.candles.iter().enumerate().map(|(i, candle)| {
        let color = if candle.up { &up } else { &down };
        draw_candle(candle, i, &frame, chart.style, color)
    }));
    parts.extend(chart.overlays.iter().map(|series| draw_line(series, &frame)));
    parts.push(draw_legend(&chart.overlays, &frame));
    parts.push("</svg>".to_string());
    parts.join("")
}

pub fn render_pnl_svg(chart: &PnlChart, theme: &Theme) -> String {
    let Some((lo, hi)) = chart.value_range() else {
        return empty_svg(theme, &chart.title, "No PnL data available.");
    };

    let count = chart.lines.iter().map(|l| l.points.len()).max().unwrap_or(0);
    let frame = Frame::new(theme, count, lo, hi);

    let dates = chart.lines.first().map(|l| &l.points);
    let first = dates
        .and_then(|p| p.first())
        .map(|p| p.date.to_string())
        .unwrap_or_default();
    let last = dates
        .and_then(|p| p.last())
        .map(|p| p.date.to_string())
        .unwrap_or_default();

    let mut parts = vec![
        open_svg(&frame, theme, &chart.title),
        draw_axes(&frame, theme, &chart.x_label, &chart.y_label, &first, &last),
    ];
    parts.extend(chart.lines.iter().map(|series| draw_line(series, &frame)));
    parts.push(draw_legend(&chart.lines, &frame));
    parts.push("</svg>".to_string());
    parts.join("")
}
