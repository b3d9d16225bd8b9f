//! Waterfall charts of impact contributions.
//!
//! One chart per impact column: rows sorted by value (largest first), each
//! bar starting where the previous one ended, then a grey total bar.
//! Charts are written as standalone SVG files.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::Result;
use crate::types::{flow::AssessedFlow, method::ImpactCategory};

/// Base colours blended into the bar palette.
pub const BASE_COLORS: [&str; 6] = ["#002147", "#0071A4", "#DA291C", "#F4A900", "#78BE20", "#7C878E"];

/// Number of blended palette steps.
pub const PALETTE_SIZE: usize = 10;

const TOTAL_COLOR: &str = "#808080";

const WIDTH: f64 = 960.0;
const HEIGHT: f64 = 540.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 160.0;

/// Two decimals, switching to scientific notation below 0.01 in magnitude.
pub fn format_numeric(value: f64) -> String {
    if value.abs() < 0.01 {
        format!("{:.2e}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn parse_hex(color: &str) -> (f64, f64, f64) {
    let channel = |i: usize| {
        u8::from_str_radix(color.get(i..i + 2).unwrap_or("00"), 16).unwrap_or(0) as f64
    };
    (channel(1), channel(3), channel(5))
}

/// Evenly spaced blend of `colors` into `n` hex colours.
pub fn blend_palette(colors: &[&str], n: usize) -> Vec<String> {
    match (colors.len(), n) {
        (0, _) | (_, 0) => return Vec::new(),
        (1, _) => return vec![colors[0].to_lowercase(); n],
        _ => {}
    }

    let segments = (colors.len() - 1) as f64;
    (0..n)
        .map(|i| {
            let t = if n == 1 { 0.0 } else { i as f64 / (n - 1) as f64 * segments };
            let idx = (t.floor() as usize).min(colors.len() - 2);
            let frac = t - idx as f64;

            let (r0, g0, b0) = parse_hex(colors[idx]);
            let (r1, g1, b1) = parse_hex(colors[idx + 1]);
            let mix = |a: f64, b: f64| (a + (b - a) * frac).round() as u8;
            format!("#{:02x}{:02x}{:02x}", mix(r0, r1), mix(g0, g1), mix(b0, b1))
        })
        .collect()
}

/// One contribution bar.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterfallBar {
    /// Original activity text of the row.
    pub label: String,
    /// Running total before this bar.
    pub base: f64,
    pub value: f64,
    pub hover: String,
    pub color: String,
}

/// Waterfall for one impact column.
#[derive(Debug, Clone, PartialEq)]
pub struct Waterfall {
    pub category: ImpactCategory,
    pub bars: Vec<WaterfallBar>,
    pub total: f64,
}

/// Build the waterfall of `category`, or `None` when no row has a value.
pub fn build_waterfall(category: ImpactCategory, assessed: &[AssessedFlow]) -> Option<Waterfall> {
    let mut rows: Vec<(&AssessedFlow, f64)> = assessed
        .iter()
        .filter_map(|a| a.impacts.get(category).map(|v| (a, v)))
        .collect();
    if rows.is_empty() {
        return None;
    }
    rows.sort_by(|(_, a), (_, b)| b.total_cmp(a));

    let palette = blend_palette(&BASE_COLORS, PALETTE_SIZE);
    let mut running = 0.0;
    let bars = rows
        .into_iter()
        .enumerate()
        .map(|(i, (row, value))| {
            let bar = WaterfallBar {
                label: row.flow.activity.clone(),
                base: running,
                value,
                hover: format!(
                    "{}, {}: {}",
                    row.process.process_name,
                    row.process.location,
                    format_numeric(value)
                ),
                color: palette[i % palette.len()].clone(),
            };
            running += value;
            bar
        })
        .collect();

    Some(Waterfall {
        category,
        bars,
        total: running,
    })
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl Waterfall {
    /// Render as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let count = self.bars.len() + 1;
        let mut low: f64 = 0.0;
        let mut high: f64 = 0.0;
        for bar in &self.bars {
            low = low.min(bar.base).min(bar.base + bar.value);
            high = high.max(bar.base).max(bar.base + bar.value);
        }
        if high - low <= f64::EPSILON {
            high = low + 1.0;
        }

        let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
        let y = |v: f64| MARGIN_TOP + (high - v) / (high - low) * plot_h;
        let slot = plot_w / count as f64;
        let bar_w = slot * 0.7;
        let title = escape(self.category.axis_title());

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif">"#
        );
        let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="28" text-anchor="middle" font-size="18">{}</text>"#,
            WIDTH / 2.0,
            title
        );
        let _ = writeln!(
            svg,
            r#"<text x="20" y="{0}" text-anchor="middle" font-size="13" transform="rotate(-90 20 {0})">{1}</text>"#,
            MARGIN_TOP + plot_h / 2.0,
            title
        );
        let _ = writeln!(
            svg,
            r##"<line x1="{MARGIN_LEFT}" y1="{0:.2}" x2="{1}" y2="{0:.2}" stroke="#444" stroke-width="1"/>"##,
            y(0.0),
            WIDTH - MARGIN_RIGHT
        );

        let bars = self
            .bars
            .iter()
            .map(|b| (b.label.as_str(), b.base, b.value, b.hover.clone(), b.color.as_str()))
            .chain(std::iter::once((
                "Total",
                0.0,
                self.total,
                format!("Total: {}", format_numeric(self.total)),
                TOTAL_COLOR,
            )));

        for (i, (label, base, value, hover, color)) in bars.enumerate() {
            let x = MARGIN_LEFT + slot * i as f64 + (slot - bar_w) / 2.0;
            let top = y(base.max(base + value));
            let height = (y(base.min(base + value)) - top).max(0.5);
            let center = x + bar_w / 2.0;
            let label_y = MARGIN_TOP + plot_h + 14.0;

            let _ = writeln!(
                svg,
                r#"<rect x="{x:.2}" y="{top:.2}" width="{bar_w:.2}" height="{height:.2}" fill="{color}"><title>{}</title></rect>"#,
                escape(&hover)
            );
            let _ = writeln!(
                svg,
                r#"<text x="{center:.2}" y="{:.2}" text-anchor="middle" font-size="11">{}</text>"#,
                top - 4.0,
                format_numeric(value)
            );
            let _ = writeln!(
                svg,
                r#"<text x="{center:.2}" y="{label_y:.2}" text-anchor="end" font-size="11" transform="rotate(-45 {center:.2} {label_y:.2})">{}</text>"#,
                escape(label)
            );
        }

        svg.push_str("</svg>\n");
        svg
    }
}

/// File name of a category's chart, e.g. `Water_use.svg`.
pub fn chart_file_name(category: ImpactCategory) -> String {
    format!("{}.svg", category.column().replace(' ', "_"))
}

/// Write one SVG per impact column that has data. Returns the written paths.
pub fn write_charts(dir: impl AsRef<Path>, assessed: &[AssessedFlow]) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut written = Vec::new();
    if assessed.is_empty() {
        info!("No assessed rows, no charts written");
        return Ok(written);
    }
    std::fs::create_dir_all(dir)?;

    for category in ImpactCategory::ALL {
        let Some(waterfall) = build_waterfall(category, assessed) else {
            info!(column = %category, "No data for impact column, skipping chart");
            continue;
        };
        let path = dir.join(chart_file_name(category));
        std::fs::write(&path, waterfall.to_svg())?;
        info!(column = %category, path = %path.display(), bars = waterfall.bars.len(), "Wrote chart");
        written.push(path);
    }

    Ok(written)
}
