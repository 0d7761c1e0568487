//! Scatter plot of two numeric series.

use super::canvas::{Canvas, STEEL_BLUE, Scale};
use crate::error::Result;
use std::path::Path;

const WIDTH: u32 = 1000;
const HEIGHT: u32 = 600;
const MARGIN: i64 = 40;

/// Rows where both coordinates are present.
pub(crate) fn paired_points(xs: &[Option<f64>], ys: &[Option<f64>]) -> Vec<(f64, f64)> {
    xs.iter()
        .zip(ys)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect()
}

pub(crate) fn render_points(points: &[(f64, f64)], path: &Path) -> Result<()> {
    let mut canvas = Canvas::new(WIDTH, HEIGHT);
    let area = canvas.bounds().inset(MARGIN);
    canvas.axes(area, 4);

    if let Some(&(x0, y0)) = points.first() {
        let (mut x_min, mut x_max, mut y_min, mut y_max) = (x0, x0, y0, y0);
        for &(x, y) in points {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }

        let x_scale = Scale::padded(x_min, x_max, area.x, area.right());
        let y_scale = Scale::padded(y_min, y_max, area.bottom(), area.y);
        for &(x, y) in points {
            canvas.dot(x_scale.map(x), y_scale.map(y), 3, STEEL_BLUE, 0.5);
        }
    }

    canvas.save(path)
}
