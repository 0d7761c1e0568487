//! Raster canvas the plots are drawn on.
//!
//! Coordinates are signed so shapes may extend past the image edge; every
//! write is clipped to the buffer.

use crate::error::{PrepError, Result};
use image::{Rgb, RgbImage};
use std::path::Path;

pub(crate) const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub(crate) const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub(crate) const GRID: Rgb<u8> = Rgb([228, 228, 228]);
pub(crate) const STEEL_BLUE: Rgb<u8> = Rgb([70, 130, 180]);
pub(crate) const DARK_GRAY: Rgb<u8> = Rgb([80, 80, 80]);

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rect {
    pub x: i64,
    pub y: i64,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub fn new(x: i64, y: i64, width: i64, height: i64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x + self.width - 1
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height - 1
    }

    pub fn center_y(&self) -> i64 {
        self.y + self.height / 2
    }

    /// Shrink by `margin` pixels on every side. Never collapses below 1px.
    pub fn inset(&self, margin: i64) -> Rect {
        Rect {
            x: self.x + margin,
            y: self.y + margin,
            width: (self.width - 2 * margin).max(1),
            height: (self.height - 2 * margin).max(1),
        }
    }

    /// Split into `rows` x `cols` equal cells, row-major.
    pub fn grid(&self, rows: usize, cols: usize) -> Vec<Rect> {
        let rows = rows.max(1) as i64;
        let cols = cols.max(1) as i64;
        let cell_w = self.width / cols;
        let cell_h = self.height / rows;

        (0..rows)
            .flat_map(|r| {
                (0..cols).map(move |c| {
                    Rect::new(self.x + c * cell_w, self.y + r * cell_h, cell_w, cell_h)
                })
            })
            .collect()
    }
}

/// Linear map from a data interval onto a pixel interval.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Scale {
    min: f64,
    max: f64,
    start: f64,
    end: f64,
}

impl Scale {
    /// A zero-width domain is widened by 0.5 on each side so a constant
    /// column still lands in the middle of the range.
    pub fn new(min: f64, max: f64, start: i64, end: i64) -> Self {
        let (min, max) = if (max - min).abs() < f64::EPSILON {
            (min - 0.5, max + 0.5)
        } else {
            (min, max)
        };
        Self {
            min,
            max,
            start: start as f64,
            end: end as f64,
        }
    }

    /// Like [`Scale::new`] with 5% of the data span added on both ends.
    pub fn padded(min: f64, max: f64, start: i64, end: i64) -> Self {
        let pad = (max - min).abs() * 0.05;
        Self::new(min - pad, max + pad, start, end)
    }

    pub fn map(&self, value: f64) -> i64 {
        let t = (value - self.min) / (self.max - self.min);
        (self.start + t * (self.end - self.start)).round() as i64
    }
}

/// An RGB image plus primitive drawing operations.
pub(crate) struct Canvas {
    image: RgbImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, WHITE),
        }
    }

    pub fn bounds(&self) -> Rect {
        let (w, h) = self.image.dimensions();
        Rect::new(0, 0, w as i64, h as i64)
    }

    fn in_bounds(&self, x: i64, y: i64) -> bool {
        let (w, h) = self.image.dimensions();
        x >= 0 && y >= 0 && x < w as i64 && y < h as i64
    }

    pub fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        if self.in_bounds(x, y) {
            self.image.put_pixel(x as u32, y as u32, color);
        }
    }

    /// Alpha-blend `color` over the current pixel.
    pub fn blend(&mut self, x: i64, y: i64, color: Rgb<u8>, alpha: f32) {
        if !self.in_bounds(x, y) {
            return;
        }
        let alpha = alpha.clamp(0.0, 1.0);
        let pixel = self.image.get_pixel_mut(x as u32, y as u32);
        for (dst, src) in pixel.0.iter_mut().zip(color.0) {
            *dst = (src as f32 * alpha + *dst as f32 * (1.0 - alpha)).round() as u8;
        }
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Rgb<u8>) {
        for y in rect.y..=rect.bottom() {
            for x in rect.x..=rect.right() {
                self.put(x, y, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, rect: Rect, color: Rgb<u8>) {
        self.hline(rect.x, rect.right(), rect.y, color);
        self.hline(rect.x, rect.right(), rect.bottom(), color);
        self.vline(rect.x, rect.y, rect.bottom(), color);
        self.vline(rect.right(), rect.y, rect.bottom(), color);
    }

    pub fn hline(&mut self, x0: i64, x1: i64, y: i64, color: Rgb<u8>) {
        for x in x0.min(x1)..=x0.max(x1) {
            self.put(x, y, color);
        }
    }

    pub fn vline(&mut self, x: i64, y0: i64, y1: i64, color: Rgb<u8>) {
        for y in y0.min(y1)..=y0.max(y1) {
            self.put(x, y, color);
        }
    }

    /// Filled disc, alpha-blended.
    pub fn dot(&mut self, cx: i64, cy: i64, radius: i64, color: Rgb<u8>, alpha: f32) {
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.blend(cx + dx, cy + dy, color, alpha);
                }
            }
        }
    }

    /// Plot-area frame with light horizontal gridlines.
    pub fn axes(&mut self, area: Rect, gridlines: usize) {
        if gridlines > 0 {
            let step = area.height as f64 / (gridlines + 1) as f64;
            for i in 1..=gridlines {
                let y = area.y + (step * i as f64).round() as i64;
                self.hline(area.x + 1, area.right() - 1, y, GRID);
            }
        }
        self.stroke_rect(area, BLACK);
    }

    /// Encode as PNG at `path`. The buffer is released afterwards.
    pub fn save(self, path: &Path) -> Result<()> {
        self.image.save(path).map_err(|e| PrepError::PlotFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb<u8> {
        *self.image.get_pixel(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_maps_endpoints() {
        let scale = Scale::new(0.0, 10.0, 100, 200);
        assert_eq!(scale.map(0.0), 100);
        assert_eq!(scale.map(10.0), 200);
        assert_eq!(scale.map(5.0), 150);
    }

    #[test]
    fn test_scale_inverted_range() {
        // y axes grow downwards in pixel space
        let scale = Scale::new(0.0, 1.0, 90, 10);
        assert_eq!(scale.map(0.0), 90);
        assert_eq!(scale.map(1.0), 10);
    }

    #[test]
    fn test_scale_constant_domain() {
        let scale = Scale::new(3.0, 3.0, 0, 100);
        assert_eq!(scale.map(3.0), 50);
    }

    #[test]
    fn test_rect_grid_cells() {
        let cells = Rect::new(0, 0, 300, 200).grid(2, 3);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells[0], Rect::new(0, 0, 100, 100));
        assert_eq!(cells[4], Rect::new(100, 100, 100, 100));
    }

    #[test]
    fn test_drawing_is_clipped() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_rect(Rect::new(-5, -5, 8, 8), BLACK);
        canvas.dot(20, 20, 3, BLACK, 1.0);
        assert_eq!(canvas.pixel(0, 0), BLACK);
        assert_eq!(canvas.pixel(9, 9), WHITE);
    }

    #[test]
    fn test_blend_half_alpha() {
        let mut canvas = Canvas::new(1, 1);
        canvas.blend(0, 0, BLACK, 0.5);
        assert_eq!(canvas.pixel(0, 0), Rgb([128, 128, 128]));
    }
}
