//! SVG bar chart of F1 per db_id.

use crate::error::Result;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

const MARGIN_LEFT: f64 = 70.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_TOP: f64 = 50.0;
const MARGIN_BOTTOM: f64 = 170.0;
const PLOT_HEIGHT: f64 = 400.0;
const SLOT_WIDTH: f64 = 32.0;
const MIN_PLOT_WIDTH: f64 = 600.0;
const BAR_COLOR: &str = "skyblue";

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the chart as a standalone SVG document.
///
/// Bars follow the map's key order; x labels are rotated 90 degrees so long
/// db_ids stay readable. Scores are clamped to [0, 1].
pub fn render_f1_chart(db_metrics: &BTreeMap<String, f64>) -> String {
    let plot_width = (db_metrics.len() as f64 * SLOT_WIDTH).max(MIN_PLOT_WIDTH);
    let slot = if db_metrics.is_empty() {
        SLOT_WIDTH
    } else {
        plot_width / db_metrics.len() as f64
    };
    let width = MARGIN_LEFT + plot_width + MARGIN_RIGHT;
    let height = MARGIN_TOP + PLOT_HEIGHT + MARGIN_BOTTOM;
    let baseline = MARGIN_TOP + PLOT_HEIGHT;

    let mut svg = String::new();
    // writing into a String cannot fail
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = width,
        h = height
    );
    let _ = writeln!(svg, r#"<rect width="100%" height="100%" fill="white"/>"#);
    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle" font-size="16">F1 Score per db_id</text>"#,
        MARGIN_LEFT + plot_width / 2.0,
        MARGIN_TOP / 2.0
    );

    // y axis with ticks every 0.2
    for step in 0..=5 {
        let value = step as f64 * 0.2;
        let y = baseline - value * PLOT_HEIGHT;
        let _ = writeln!(
            svg,
            r##"<line x1="{x0}" y1="{y}" x2="{x1}" y2="{y}" stroke="#dddddd"/><text x="{tx}" y="{ty}" text-anchor="end">{value:.1}</text>"##,
            x0 = MARGIN_LEFT,
            x1 = MARGIN_LEFT + plot_width,
            y = y,
            tx = MARGIN_LEFT - 6.0,
            ty = y + 4.0,
            value = value
        );
    }
    let _ = writeln!(
        svg,
        r#"<line x1="{x}" y1="{top}" x2="{x}" y2="{bottom}" stroke="black"/><line x1="{x}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="black"/>"#,
        x = MARGIN_LEFT,
        top = MARGIN_TOP,
        bottom = baseline,
        right = MARGIN_LEFT + plot_width
    );

    for (i, (db_id, f1)) in db_metrics.iter().enumerate() {
        let score = if f1.is_finite() { f1.clamp(0.0, 1.0) } else { 0.0 };
        let bar_height = score * PLOT_HEIGHT;
        let x = MARGIN_LEFT + i as f64 * slot + slot * 0.1;
        let center = MARGIN_LEFT + i as f64 * slot + slot / 2.0;
        let label = escape(db_id);
        let _ = writeln!(
            svg,
            r#"<rect class="bar" x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{color}"><title>{label}: {score:.4}</title></rect>"#,
            x = x,
            y = baseline - bar_height,
            w = slot * 0.8,
            h = bar_height,
            color = BAR_COLOR,
            label = label,
            score = score
        );
        let _ = writeln!(
            svg,
            r#"<text x="{cx:.2}" y="{ly:.2}" text-anchor="end" transform="rotate(-90 {cx:.2} {ly:.2})">{label}</text>"#,
            cx = center,
            ly = baseline + 8.0,
            label = label
        );
    }

    if db_metrics.is_empty() {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" text-anchor="middle">no data</text>"#,
            MARGIN_LEFT + plot_width / 2.0,
            MARGIN_TOP + PLOT_HEIGHT / 2.0
        );
    }

    let _ = writeln!(
        svg,
        r#"<text x="{}" y="{}" text-anchor="middle">db_id</text>"#,
        MARGIN_LEFT + plot_width / 2.0,
        height - 10.0
    );
    let _ = writeln!(
        svg,
        r#"<text x="18" y="{y}" text-anchor="middle" transform="rotate(-90 18 {y})">F1 Score</text>"#,
        y = MARGIN_TOP + PLOT_HEIGHT / 2.0
    );
    svg.push_str("</svg>\n");
    svg
}

/// Render and write the chart, creating parent directories as needed.
pub fn write_f1_chart(db_metrics: &BTreeMap<String, f64>, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, render_f1_chart(db_metrics))?;
    log::info!("Plot saved as image in: {}", path.display());
    Ok(())
}
