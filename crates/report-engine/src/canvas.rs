//! Drawing primitives shared by every chart: plot areas, data-to-pixel
//! mapping, grid lines, markers, and PNG output.

use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::{
    draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut,
};
use imageproc::rect::Rect;

use lookdown_common::error::{LookdownError, LookdownResult};

use crate::font::ChartFont;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const GRID: Rgb<u8> = Rgb([210, 210, 210]);

/// Pixel rectangle the data is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotArea {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl PlotArea {
    /// Inset a `width` x `height` image by the given margins.
    pub fn inset(width: u32, height: u32, left: u32, top: u32, right: u32, bottom: u32) -> Self {
        let w = width as f32;
        let h = height as f32;
        let left = (left as f32).min(w - 1.0);
        let top = (top as f32).min(h - 1.0);
        Self {
            left,
            top,
            right: (w - right as f32).max(left + 1.0),
            bottom: (h - bottom as f32).max(top + 1.0),
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}

/// Maps data coordinates into a [`PlotArea`]. Data `y` grows upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axes {
    pub area: PlotArea,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
}

impl Axes {
    /// Degenerate ranges (a single value) are widened by one unit each side.
    pub fn new(area: PlotArea, x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        Self {
            area,
            x_range: widen(x_range),
            y_range: widen(y_range),
        }
    }

    pub fn px(&self, x: f64) -> f32 {
        let (lo, hi) = self.x_range;
        self.area.left + ((x - lo) / (hi - lo)) as f32 * self.area.width()
    }

    pub fn py(&self, y: f64) -> f32 {
        let (lo, hi) = self.y_range;
        self.area.bottom - ((y - lo) / (hi - lo)) as f32 * self.area.height()
    }

    pub fn point(&self, x: f64, y: f64) -> (f32, f32) {
        (self.px(x), self.py(y))
    }
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    if hi - lo > f64::EPSILON {
        (lo, hi)
    } else {
        (lo - 1.0, hi + 1.0)
    }
}

/// Min and max of `values`, padded by `pad` of the span on each side.
pub fn padded_range(values: impl IntoIterator<Item = f64>, pad: f64) -> (f64, f64) {
    let (lo, hi) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    let margin = (hi - lo) * pad;
    (lo - margin, hi + margin)
}

/// Roughly `count` evenly spaced round tick values inside `range`.
pub fn nice_ticks(range: (f64, f64), count: usize) -> Vec<f64> {
    let (lo, hi) = range;
    if count == 0 || hi <= lo || !lo.is_finite() || !hi.is_finite() {
        return Vec::new();
    }
    let raw = (hi - lo) / count as f64;
    let magnitude = 10f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 2.5, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|s| *s >= raw)
        .unwrap_or(10.0 * magnitude);

    let mut ticks = Vec::new();
    let mut value = (lo / step).ceil() * step;
    while value <= hi + step * 1e-9 {
        ticks.push(value);
        value += step;
    }
    ticks
}

/// Text formatting for tick values: integers without a fraction.
pub fn format_tick(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.1}")
    }
}

pub fn blank(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width.max(1), height.max(1), WHITE)
}

/// Black box around the plot area.
pub fn draw_frame(img: &mut RgbImage, area: &PlotArea) {
    let rect = Rect::at(area.left as i32, area.top as i32)
        .of_size(area.width().max(1.0) as u32, area.height().max(1.0) as u32);
    draw_hollow_rect_mut(img, rect, BLACK);
}

/// Dashed horizontal line across the plot area at pixel row `y`.
pub fn draw_dashed_hline(img: &mut RgbImage, area: &PlotArea, y: f32, color: Rgb<u8>) {
    const DASH: f32 = 6.0;
    const GAP: f32 = 4.0;
    let mut x = area.left;
    while x < area.right {
        let end = (x + DASH).min(area.right);
        draw_line_segment_mut(img, (x, y), (end, y), color);
        x = end + GAP;
    }
}

/// Solid vertical line across the plot area at pixel column `x`.
pub fn draw_vline(img: &mut RgbImage, area: &PlotArea, x: f32, color: Rgb<u8>) {
    draw_line_segment_mut(img, (x, area.top), (x, area.bottom), color);
}

/// Connect consecutive points with straight segments.
pub fn draw_polyline(img: &mut RgbImage, points: &[(f32, f32)], color: Rgb<u8>) {
    for pair in points.windows(2) {
        draw_line_segment_mut(img, pair[0], pair[1], color);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Circle,
    Square,
}

pub fn draw_marker(img: &mut RgbImage, (x, y): (f32, f32), marker: Marker, size: u32, color: Rgb<u8>) {
    let radius = size as i32;
    let (cx, cy) = (x.round() as i32, y.round() as i32);
    match marker {
        Marker::Circle => draw_filled_circle_mut(img, (cx, cy), radius, color),
        Marker::Square => {
            let side = (2 * size).max(1);
            draw_filled_rect_mut(
                img,
                Rect::at(cx - radius, cy - radius).of_size(side, side),
                color,
            );
        }
    }
}

/// Filled rectangle between two pixel corners, with an optional outline.
pub fn draw_box(
    img: &mut RgbImage,
    (x0, y0): (f32, f32),
    (x1, y1): (f32, f32),
    fill: Rgb<u8>,
    outline: Option<(Rgb<u8>, u32)>,
) {
    let left = x0.min(x1).round() as i32;
    let top = y0.min(y1).round() as i32;
    let width = ((x1 - x0).abs().round() as u32).max(1);
    let height = ((y1 - y0).abs().round() as u32).max(1);
    draw_filled_rect_mut(img, Rect::at(left, top).of_size(width, height), fill);

    if let Some((color, thickness)) = outline {
        for i in 0..thickness as i32 {
            let w = width as i32 - 2 * i;
            let h = height as i32 - 2 * i;
            if w <= 0 || h <= 0 {
                break;
            }
            draw_hollow_rect_mut(
                img,
                Rect::at(left + i, top + i).of_size(w as u32, h as u32),
                color,
            );
        }
    }
}

/// One legend row: a colour swatch, then the label when a font is loaded.
pub fn draw_legend(
    img: &mut RgbImage,
    font: Option<&ChartFont>,
    (x, y): (i32, i32),
    entries: &[(Rgb<u8>, &str)],
) {
    const ROW: i32 = 18;
    const SWATCH: u32 = 12;
    for (i, (color, label)) in entries.iter().enumerate() {
        let top = y + i as i32 * ROW;
        draw_filled_rect_mut(img, Rect::at(x, top).of_size(SWATCH, SWATCH), *color);
        if let Some(font) = font {
            font.draw(img, label, x + SWATCH as i32 + 6, top - 1, 13.0, BLACK);
        }
    }
}

/// Write `img` as PNG, creating parent directories.
pub fn save_png(img: &RgbImage, path: &Path) -> LookdownResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    img.save_with_format(path, ImageFormat::Png).map_err(|e| {
        LookdownError::report(format!("Failed to write {}: {e}", path.display()))
    })?;
    tracing::info!(path = %path.display(), "Wrote chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axes_map_corners() {
        let area = PlotArea {
            left: 10.0,
            top: 20.0,
            right: 110.0,
            bottom: 220.0,
        };
        let axes = Axes::new(area, (0.0, 10.0), (0.0, 100.0));
        assert_eq!(axes.point(0.0, 0.0), (10.0, 220.0));
        assert_eq!(axes.point(10.0, 100.0), (110.0, 20.0));
        assert_eq!(axes.px(5.0), 60.0);
    }

    #[test]
    fn single_value_range_is_widened() {
        let area = PlotArea::inset(100, 100, 0, 0, 0, 0);
        let axes = Axes::new(area, (3.0, 3.0), (0.0, 1.0));
        assert_eq!(axes.x_range, (2.0, 4.0));
        assert_eq!(axes.px(3.0), 50.0);
    }

    #[test]
    fn padded_range_ignores_non_finite() {
        assert_eq!(padded_range([1.0, f64::NAN, 3.0], 0.5), (0.0, 4.0));
        assert_eq!(padded_range(Vec::new(), 0.1), (0.0, 1.0));
    }

    #[test]
    fn ticks_are_round_numbers() {
        assert_eq!(
            nice_ticks((0.0, 105.0), 5),
            vec![0.0, 25.0, 50.0, 75.0, 100.0]
        );
        assert_eq!(nice_ticks((0.0, 10.0), 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert!(nice_ticks((1.0, 1.0), 5).is_empty());
    }

    #[test]
    fn tick_labels_drop_integer_fractions() {
        assert_eq!(format_tick(20.0), "20");
        assert_eq!(format_tick(2.5), "2.5");
    }

    #[test]
    fn outlined_box_has_black_edge_and_coloured_fill() {
        let mut img = blank(50, 50);
        let fill = Rgb([10, 200, 10]);
        draw_box(&mut img, (10.0, 10.0), (40.0, 40.0), fill, Some((BLACK, 2)));
        assert_eq!(*img.get_pixel(10, 25), BLACK);
        assert_eq!(*img.get_pixel(11, 25), BLACK);
        assert_eq!(*img.get_pixel(25, 25), fill);
        assert_eq!(*img.get_pixel(5, 5), WHITE);
    }

    #[test]
    fn save_png_creates_directories() {
        let dir = std::env::temp_dir().join("lookdown_test_save_png");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("nested").join("chart.png");

        save_png(&blank(4, 3), &path).unwrap();
        let loaded = image::open(&path).unwrap();
        assert_eq!((loaded.width(), loaded.height()), (4, 3));

        std::fs::remove_dir_all(&dir).ok();
    }
}
