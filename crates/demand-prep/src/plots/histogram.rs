//! Histogram grid: one panel per numeric column.

use super::canvas::{Canvas, Rect, Scale};
use super::color::generate_palette;
use crate::error::Result;
use std::path::Path;

const PANEL_WIDTH: u32 = 360;
const PANEL_HEIGHT: u32 = 260;
const PANEL_MARGIN: i64 = 18;

/// Bin counts over `[min, max]` split into `bins` equal-width bins.
///
/// The last bin is closed on both ends so the maximum is counted. A
/// constant column is binned over `[v - 0.5, v + 0.5]`.
pub(crate) fn histogram_counts(values: &[f64], bins: usize) -> Vec<usize> {
    let bins = bins.max(1);
    let mut counts = vec![0usize; bins];
    if values.is_empty() {
        return counts;
    }

    let (mut min, mut max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if max <= min {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;

    for value in values {
        let index = (((value - min) / width).floor() as usize).min(bins - 1);
        counts[index] += 1;
    }
    counts
}

/// Near-square grid shape `(rows, cols)` for `n` panels.
pub(crate) fn grid_shape(n: usize) -> (usize, usize) {
    if n == 0 {
        return (0, 0);
    }
    let cols = (n as f64).sqrt().ceil() as usize;
    let rows = n.div_ceil(cols);
    (rows, cols)
}

/// Draw the histogram of every `(column, values)` pair into one image.
pub(crate) fn render_histograms(
    columns: &[(String, Vec<f64>)],
    bins: usize,
    path: &Path,
) -> Result<()> {
    let (rows, cols) = grid_shape(columns.len());
    let mut canvas = Canvas::new(
        PANEL_WIDTH * cols.max(1) as u32,
        PANEL_HEIGHT * rows.max(1) as u32,
    );
    let cells = canvas.bounds().grid(rows, cols);
    let colors = generate_palette(columns.len());

    for (((_, values), cell), color) in columns.iter().zip(cells).zip(colors) {
        let area = cell.inset(PANEL_MARGIN);
        let counts = histogram_counts(values, bins);
        let peak = counts.iter().copied().max().unwrap_or(0);

        canvas.axes(area, 3);
        if peak == 0 {
            continue;
        }

        let y = Scale::new(0.0, peak as f64, area.bottom(), area.y + 1);
        let bar_width = area.width as f64 / counts.len() as f64;
        for (i, count) in counts.iter().enumerate() {
            if *count == 0 {
                continue;
            }
            let x0 = area.x + (i as f64 * bar_width).round() as i64;
            let x1 = area.x + ((i + 1) as f64 * bar_width).round() as i64;
            let top = y.map(*count as f64);
            let bar = Rect::new(x0 + 1, top, (x1 - x0 - 1).max(1), area.bottom() - top);
            canvas.fill_rect(bar, color);
        }
    }

    canvas.save(path)
}
