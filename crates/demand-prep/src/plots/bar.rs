//! Bar chart of the most frequent values of one column.

use super::canvas::{Canvas, Rect, STEEL_BLUE, Scale};
use crate::error::Result;
use crate::utils::value_counts_ordered;
use std::path::Path;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 500;
const MARGIN: i64 = 40;

/// The `n` most frequent non-null values with their counts.
///
/// Ordered by count descending; ties keep first-appearance order.
pub(crate) fn top_values(values: &[Option<String>], n: usize) -> Vec<(String, usize)> {
    let mut ranked = value_counts_ordered(values.iter().flatten().map(|s| s.as_str()));
    ranked.truncate(n);
    ranked
}

/// Draw one vertical bar per ranked value, left to right.
pub(crate) fn render_bars(ranked: &[(String, usize)], path: &Path) -> Result<()> {
    let mut canvas = Canvas::new(WIDTH, HEIGHT);
    let area = canvas.bounds().inset(MARGIN);
    canvas.axes(area, 4);

    let peak = ranked.iter().map(|(_, c)| *c).max().unwrap_or(0);
    if peak > 0 {
        let y = Scale::new(0.0, peak as f64, area.bottom(), area.y + 1);
        let slot = area.width as f64 / ranked.len() as f64;
        let gap = (slot * 0.1).round() as i64;

        for (i, (_, count)) in ranked.iter().enumerate() {
            let x0 = area.x + (i as f64 * slot).round() as i64;
            let x1 = area.x + ((i + 1) as f64 * slot).round() as i64;
            let top = y.map(*count as f64);
            let bar = Rect::new(
                x0 + gap,
                top,
                (x1 - x0 - 2 * gap).max(1),
                area.bottom() - top,
            );
            canvas.fill_rect(bar, STEEL_BLUE);
        }
    }

    canvas.save(path)
}
