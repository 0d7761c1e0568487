//! Per-column distribution plots.
//!
//! A column with at most two distinct values collapses a box plot into a
//! line, so such columns are drawn as a jittered strip plot instead.

use super::canvas::{BLACK, Canvas, DARK_GRAY, Rect, STEEL_BLUE, Scale};
use crate::error::Result;
use crate::profiler::statistics::{quantile_sorted, sorted, tukey_fences};
use image::Rgb;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::debug;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 300;
const MARGIN: i64 = 30;
const BOX_HALF_HEIGHT: i64 = 50;
const JITTER_SEED: u64 = 42;
const BOX_FILL: Rgb<u8> = Rgb([176, 206, 230]);

/// Columns with this many distinct values or fewer get a strip plot.
pub(crate) const STRIP_PLOT_MAX_DISTINCT: usize = 2;

/// Five-number summary with Tukey whiskers.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value inside the lower fence.
    pub whisker_low: f64,
    /// Largest value inside the upper fence.
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let sorted = sorted(values);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;
        let (lower, upper) = tukey_fences(q1, q3);

        let mut inside = sorted.iter().copied().filter(|v| *v >= lower && *v <= upper);
        let whisker_low = inside.next().unwrap_or(q1);
        let whisker_high = inside.last().unwrap_or(whisker_low);
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < lower || *v > upper)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            fliers,
        })
    }
}

/// Number of distinct values.
pub(crate) fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = sorted(values);
    sorted.dedup_by(|a, b| a == b);
    sorted.len()
}

/// Draw one column's distribution and write it to `path`.
pub(crate) fn render_distribution(column: &str, values: &[f64], path: &Path) -> Result<()> {
    let mut canvas = Canvas::new(WIDTH, HEIGHT);
    let area = canvas.bounds().inset(MARGIN);

    if !values.is_empty() {
        let (min, max) = values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        let x = Scale::padded(min, max, area.x, area.right());

        if distinct_count(values) <= STRIP_PLOT_MAX_DISTINCT {
            debug!("Strip plot for '{}'", column);
            draw_strip(&mut canvas, area, &x, values);
        } else if let Some(stats) = BoxStats::from_values(values) {
            debug!("Box plot for '{}'", column);
            draw_box(&mut canvas, area, &x, &stats);
        }
    }

    canvas.axes(area, 0);
    canvas.save(path)
}

fn draw_box(canvas: &mut Canvas, area: Rect, x: &Scale, stats: &BoxStats) {
    let cy = area.center_y();
    let top = cy - BOX_HALF_HEIGHT;
    let bottom = cy + BOX_HALF_HEIGHT;
    let cap = BOX_HALF_HEIGHT / 2;

    let (x_q1, x_q3) = (x.map(stats.q1), x.map(stats.q3));
    let body = Rect::new(x_q1, top, (x_q3 - x_q1).max(1), bottom - top);
    canvas.fill_rect(body, BOX_FILL);
    canvas.stroke_rect(body, BLACK);

    let x_med = x.map(stats.median);
    canvas.vline(x_med, top, bottom, BLACK);
    canvas.vline(x_med + 1, top, bottom, BLACK);

    let (x_lo, x_hi) = (x.map(stats.whisker_low), x.map(stats.whisker_high));
    canvas.hline(x_lo, x_q1, cy, BLACK);
    canvas.hline(x_q3, x_hi, cy, BLACK);
    canvas.vline(x_lo, cy - cap, cy + cap, BLACK);
    canvas.vline(x_hi, cy - cap, cy + cap, BLACK);

    for flier in &stats.fliers {
        canvas.dot(x.map(*flier), cy, 3, DARK_GRAY, 0.8);
    }
}

fn draw_strip(canvas: &mut Canvas, area: Rect, x: &Scale, values: &[f64]) {
    let mut rng = StdRng::seed_from_u64(JITTER_SEED);
    let cy = area.center_y();
    let spread = (area.height as f64 * 0.25) as i64;

    for value in values {
        let jitter: f64 = rng.gen_range(-1.0..=1.0);
        let y = cy + (jitter * spread as f64).round() as i64;
        canvas.dot(x.map(*value), y, 4, STEEL_BLUE, 0.5);
    }
}
