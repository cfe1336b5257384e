//! Generate an HTML/SVG view of the key matrix: every cell with its logical
//! index, legend and role.

use inkboard_core::keymap::{key_at, PANIC_GESTURE};
use inkboard_core::{Role, COLS, ROWS};

use crate::legend::legend;

/// Key unit size in SVG pixels.
const U: f64 = 54.0;
/// Gap between keys.
const GAP: f64 = 4.0;
/// Step: key + gap.
const S: f64 = U + GAP;
/// Key corner radius.
const R: f64 = 4.0;
/// Margin around the SVG content.
const MARGIN: f64 = 20.0;

fn cell_class(row: usize, col: usize) -> &'static str {
    match key_at(row, col) {
        None => "key gap",
        Some(_) if PANIC_GESTURE.contains(&(row, col)) => "key panic",
        Some(key) => match key.role {
            Role::Ordinary => "key",
            Role::Modifier(_) => "key modifier",
            Role::CapsLock => "key caps",
        },
    }
}

fn render_cell(row: usize, col: usize) -> String {
    let x = MARGIN + col as f64 * S;
    let y = MARGIN + row as f64 * S;
    let class = cell_class(row, col);

    let mut svg = format!(
        r#"<rect x="{x}" y="{y}" width="{U}" height="{U}" rx="{R}" class="{class}"/>"#
    );

    if let Some(key) = key_at(row, col) {
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" class="index">{}</text>"#,
            x + 5.0,
            y + 12.0,
            key.index
        ));
        let label = legend(key.index);
        let font_class = if label.chars().count() > 3 { " small" } else { "" };
        svg.push_str(&format!(
            r#"<text x="{}" y="{}" class="label{font_class}">{}</text>"#,
            x + U / 2.0,
            y + U / 2.0 + 4.0,
            html_escape(label),
        ));
    }
    svg
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Generate the complete HTML document with inline SVG.
pub fn generate_html() -> String {
    let width = COLS as f64 * S + 2.0 * MARGIN;
    let height = ROWS as f64 * S + 2.0 * MARGIN;

    let mut html = format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Inkboard Matrix</title>
<style>
  body {{
    background: #1a1a2e;
    color: #eee;
    font-family: system-ui, -apple-system, sans-serif;
    display: flex;
    justify-content: center;
    padding: 2em;
  }}
  .key {{
    fill: #16213e;
    stroke: #0f3460;
    stroke-width: 1.5;
  }}
  .key.gap {{
    fill: #0d1117;
    stroke: #21262d;
    stroke-dasharray: 3 3;
  }}
  .key.modifier {{
    fill: #1b2e4e;
    stroke: #53a8b6;
  }}
  .key.caps {{
    fill: #2e2a1b;
    stroke: #b6a153;
  }}
  .key.panic {{
    fill: #2d1b4e;
    stroke: #e94560;
    stroke-width: 2;
  }}
  .label {{
    fill: #eee;
    font-family: "JetBrains Mono", "Fira Code", monospace;
    font-size: 13px;
    text-anchor: middle;
  }}
  .label.small {{
    font-size: 10px;
  }}
  .index {{
    fill: #778;
    font-size: 9px;
  }}
</style>
</head>
<body>
<svg width="{width}" height="{height}" xmlns="http://www.w3.org/2000/svg">
"#
    );

    for row in 0..ROWS {
        for col in 0..COLS {
            html.push_str(&render_cell(row, col));
            html.push('\n');
        }
    }

    html.push_str("</svg>\n</body>\n</html>\n");
    html
}
