//! Per-identity look-down timeline.
//!
//! One row per identity, compacted to positions `0..n` and labelled with the
//! real identity. Every retained frame gets a vertical tick: red while the
//! person looks down, green otherwise.

use image::RgbImage;
use imageproc::drawing::draw_line_segment_mut;

use lookdown_analysis_core::IdentityTimeline;

use crate::canvas::{self, Axes, PlotArea};
use crate::colormap::{CONCENTRATED, LOOKING_DOWN};
use crate::font::{label, Anchor, ChartFont};

const TITLE: &str = "Concentration Timeline: Looking Down (Red) vs. Concentrated (Green)";
const MAX_TICK_HALF_HEIGHT: f32 = 8.0;

fn timeline_axes(timelines: &[IdentityTimeline], width: u32, height: u32) -> Axes {
    let area = PlotArea::inset(width, height, 80, 50, 30, 60);
    let frames = timelines
        .iter()
        .flat_map(|t| t.samples.iter().map(|(frame, _)| *frame as f64));
    let x_range = canvas::padded_range(frames, 0.02);
    let rows = timelines.len().max(1) as f64;
    Axes::new(area, x_range, (-0.5, rows - 0.5))
}

pub fn render_timeline(
    timelines: &[IdentityTimeline],
    width: u32,
    height: u32,
    font: Option<&ChartFont>,
) -> RgbImage {
    let mut img = canvas::blank(width, height);
    let axes = timeline_axes(timelines, width, height);
    let area = axes.area;

    let row_pitch = area.height() / timelines.len().max(1) as f32;
    let half = (row_pitch * 0.3).clamp(1.0, MAX_TICK_HALF_HEIGHT);

    for (row, timeline) in timelines.iter().enumerate() {
        let y = axes.py(row as f64);
        canvas::draw_dashed_hline(&mut img, &area, y, canvas::GRID);
        label(
            &mut img,
            font,
            &timeline.tracking_id.to_string(),
            (area.left - 6.0, y),
            Anchor::MiddleRight,
            13.0,
        );

        for &(frame, look_down) in &timeline.samples {
            let x = axes.px(frame as f64);
            let color = if look_down { LOOKING_DOWN } else { CONCENTRATED };
            draw_line_segment_mut(&mut img, (x, y - half), (x, y + half), color);
        }
    }

    canvas::draw_frame(&mut img, &area);
    for tick in canvas::nice_ticks(axes.x_range, 8) {
        label(
            &mut img,
            font,
            &canvas::format_tick(tick),
            (axes.px(tick), area.bottom + 6.0),
            Anchor::TopCenter,
            12.0,
        );
    }

    canvas::draw_legend(
        &mut img,
        font,
        (area.right as i32 - 210, area.top as i32 + 8),
        &[
            (CONCENTRATED, "Concentrated"),
            (LOOKING_DOWN, "Looking Down (Distracted)"),
        ],
    );
    label(
        &mut img,
        font,
        TITLE,
        (width as f32 / 2.0, 12.0),
        Anchor::TopCenter,
        18.0,
    );
    label(
        &mut img,
        font,
        "Frame Number",
        (area.left + area.width() / 2.0, height as f32 - 8.0),
        Anchor::BottomCenter,
        14.0,
    );
    label(
        &mut img,
        font,
        "Student ID",
        (8.0, area.top - 14.0),
        Anchor::MiddleLeft,
        14.0,
    );

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn near(img: &RgbImage, (x, y): (f32, f32), color: Rgb<u8>) -> bool {
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        (cx - 1..=cx + 1).any(|px| {
            (cy - 1..=cy + 1).any(|py| {
                px >= 0
                    && py >= 0
                    && (px as u32) < img.width()
                    && (py as u32) < img.height()
                    && *img.get_pixel(px as u32, py as u32) == color
            })
        })
    }

    fn sample_timelines() -> Vec<IdentityTimeline> {
        vec![
            IdentityTimeline {
                tracking_id: 4,
                samples: (0..=10).map(|f| (f, f < 5)).collect(),
            },
            IdentityTimeline {
                tracking_id: 9,
                samples: vec![(3, false), (7, true)],
            },
        ]
    }

    #[test]
    fn ticks_are_coloured_by_flag() {
        let timelines = sample_timelines();
        let img = render_timeline(&timelines, 800, 400, None);
        let axes = timeline_axes(&timelines, 800, 400);

        assert!(near(&img, axes.point(2.0, 0.0), LOOKING_DOWN));
        assert!(near(&img, axes.point(8.0, 0.0), CONCENTRATED));
    }

    #[test]
    fn identities_are_compacted_to_rows() {
        let timelines = sample_timelines();
        let img = render_timeline(&timelines, 800, 400, None);
        let axes = timeline_axes(&timelines, 800, 400);

        // Identity 9 sits on row 1, not row 9.
        assert_eq!(axes.y_range, (-0.5, 1.5));
        assert!(near(&img, axes.point(7.0, 1.0), LOOKING_DOWN));
        assert!(near(&img, axes.point(3.0, 1.0), CONCENTRATED));
    }

    #[test]
    fn empty_input_still_renders() {
        let img = render_timeline(&[], 300, 200, None);
        assert_eq!(img.dimensions(), (300, 200));
    }
}
