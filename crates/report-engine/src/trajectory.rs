//! Keypoint coordinate plots.

use image::RgbImage;

use lookdown_analysis_core::KeypointTrajectory;

use crate::canvas::{self, Axes, Marker, PlotArea};
use crate::colormap::series;
use crate::font::{label, Anchor, ChartFont};

const MARKER_PX: u32 = 3;
const LEGEND_WIDTH: u32 = 150;

fn frame_range(trajectories: &[&KeypointTrajectory]) -> (f64, f64) {
    canvas::padded_range(
        trajectories
            .iter()
            .flat_map(|t| t.samples.iter().map(|(frame, _, _)| *frame as f64)),
        0.02,
    )
}

fn panel_grid(img: &mut RgbImage, axes: &Axes, font: Option<&ChartFont>) {
    let area = axes.area;
    for tick in canvas::nice_ticks(axes.y_range, 6) {
        let y = axes.py(tick);
        canvas::draw_dashed_hline(img, &area, y, canvas::GRID);
        label(
            img,
            font,
            &canvas::format_tick(tick),
            (area.left - 6.0, y),
            Anchor::MiddleRight,
            12.0,
        );
    }
    for tick in canvas::nice_ticks(axes.x_range, 8) {
        let x = axes.px(tick);
        canvas::draw_vline(img, &area, x, canvas::GRID);
        label(
            img,
            font,
            &canvas::format_tick(tick),
            (x, area.bottom + 6.0),
            Anchor::TopCenter,
            12.0,
        );
    }
}

fn single_axes(trajectory: &KeypointTrajectory, width: u32, height: u32) -> Axes {
    let area = PlotArea::inset(width, height, 70, 50, LEGEND_WIDTH, 60);
    let values = trajectory
        .samples
        .iter()
        .flat_map(|(_, x, y)| [*x, *y]);
    Axes::new(
        area,
        frame_range(&[trajectory]),
        canvas::padded_range(values, 0.05),
    )
}

/// x and y coordinates of one keypoint against frame index, with point
/// markers (circles for x, squares for y).
pub fn render_trajectory(
    trajectory: &KeypointTrajectory,
    width: u32,
    height: u32,
    font: Option<&ChartFont>,
) -> RgbImage {
    let mut img = canvas::blank(width, height);
    let axes = single_axes(trajectory, width, height);
    let area = axes.area;
    panel_grid(&mut img, &axes, font);

    let name = trajectory.keypoint.as_str();
    let xs: Vec<(f32, f32)> = trajectory
        .samples
        .iter()
        .map(|(frame, x, _)| axes.point(*frame as f64, *x))
        .collect();
    let ys: Vec<(f32, f32)> = trajectory
        .samples
        .iter()
        .map(|(frame, _, y)| axes.point(*frame as f64, *y))
        .collect();

    canvas::draw_polyline(&mut img, &xs, series(0));
    canvas::draw_polyline(&mut img, &ys, series(1));
    for p in &xs {
        canvas::draw_marker(&mut img, *p, Marker::Circle, MARKER_PX, series(0));
    }
    for p in &ys {
        canvas::draw_marker(&mut img, *p, Marker::Square, MARKER_PX, series(1));
    }

    canvas::draw_frame(&mut img, &area);
    let x_label = format!("{name}_x");
    let y_label = format!("{name}_y");
    canvas::draw_legend(
        &mut img,
        font,
        (area.right as i32 + 12, area.top as i32),
        &[(series(0), x_label.as_str()), (series(1), y_label.as_str())],
    );
    label(
        &mut img,
        font,
        &format!(
            "Keypoint Trajectory: {name} (tracking_id={})",
            trajectory.tracking_id
        ),
        (width as f32 / 2.0, 12.0),
        Anchor::TopCenter,
        18.0,
    );
    label(
        &mut img,
        font,
        "Frame",
        (area.left + area.width() / 2.0, height as f32 - 8.0),
        Anchor::BottomCenter,
        14.0,
    );
    label(
        &mut img,
        font,
        "Coordinate (pixels)",
        (8.0, area.top - 14.0),
        Anchor::MiddleLeft,
        14.0,
    );

    img
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coordinate {
    X,
    Y,
}

fn panel_axes(
    trajectories: &[&KeypointTrajectory],
    coordinate: Coordinate,
    width: u32,
    top: u32,
    panel_height: u32,
) -> Axes {
    let full = PlotArea::inset(width, panel_height, 70, 50, LEGEND_WIDTH, 50);
    let area = PlotArea {
        top: full.top + top as f32,
        bottom: full.bottom + top as f32,
        ..full
    };
    let values = trajectories.iter().flat_map(|t| {
        t.samples.iter().map(move |(_, x, y)| match coordinate {
            Coordinate::X => *x,
            Coordinate::Y => *y,
        })
    });
    Axes::new(
        area,
        frame_range(trajectories),
        canvas::padded_range(values, 0.05),
    )
}

fn draw_panel(
    img: &mut RgbImage,
    trajectories: &[&KeypointTrajectory],
    axes: &Axes,
    coordinate: Coordinate,
    title: &str,
    font: Option<&ChartFont>,
) {
    panel_grid(img, axes, font);
    for (i, trajectory) in trajectories.iter().enumerate() {
        let points: Vec<(f32, f32)> = trajectory
            .samples
            .iter()
            .map(|(frame, x, y)| {
                let value = match coordinate {
                    Coordinate::X => *x,
                    Coordinate::Y => *y,
                };
                axes.point(*frame as f64, value)
            })
            .collect();
        canvas::draw_polyline(img, &points, series(i));
    }
    canvas::draw_frame(img, &axes.area);

    let entries: Vec<(image::Rgb<u8>, &str)> = trajectories
        .iter()
        .enumerate()
        .map(|(i, t)| (series(i), t.keypoint.as_str()))
        .collect();
    canvas::draw_legend(
        img,
        font,
        (axes.area.right as i32 + 12, axes.area.top as i32),
        &entries,
    );
    label(
        img,
        font,
        title,
        (axes.area.left + axes.area.width() / 2.0, axes.area.top - 30.0),
        Anchor::TopCenter,
        16.0,
    );
}

/// Two stacked panels (x coordinates on top, y coordinates below), one
/// line per keypoint.
pub fn render_all_trajectories(
    trajectories: &[KeypointTrajectory],
    width: u32,
    height: u32,
    font: Option<&ChartFont>,
) -> RgbImage {
    let mut img = canvas::blank(width, height);
    let refs: Vec<&KeypointTrajectory> = trajectories.iter().collect();
    let panel_height = (height / 2).max(1);
    let tracking_id = trajectories.first().map(|t| t.tracking_id).unwrap_or_default();

    let top = panel_axes(&refs, Coordinate::X, width, 0, panel_height);
    draw_panel(
        &mut img,
        &refs,
        &top,
        Coordinate::X,
        &format!("All Keypoints X Coordinates (tracking_id={tracking_id})"),
        font,
    );

    let bottom = panel_axes(&refs, Coordinate::Y, width, panel_height, panel_height);
    draw_panel(
        &mut img,
        &refs,
        &bottom,
        Coordinate::Y,
        &format!("All Keypoints Y Coordinates (tracking_id={tracking_id})"),
        font,
    );

    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookdown_pose_model::keypoint::KeypointName;

    fn nose() -> KeypointTrajectory {
        KeypointTrajectory {
            tracking_id: 1,
            keypoint: KeypointName::Nose,
            samples: vec![(0, 10.0, 100.0), (10, 20.0, 200.0)],
        }
    }

    fn pixel_at(img: &RgbImage, (x, y): (f32, f32)) -> image::Rgb<u8> {
        *img.get_pixel(x.round() as u32, y.round() as u32)
    }

    fn near(img: &RgbImage, (x, y): (f32, f32), color: image::Rgb<u8>) -> bool {
        let (cx, cy) = (x.round() as i64, y.round() as i64);
        (cx - 1..=cx + 1)
            .any(|px| (cy - 1..=cy + 1).any(|py| *img.get_pixel(px as u32, py as u32) == color))
    }

    #[test]
    fn markers_distinguish_x_and_y() {
        let trajectory = nose();
        let img = render_trajectory(&trajectory, 600, 400, None);
        let axes = single_axes(&trajectory, 600, 400);

        assert_eq!(pixel_at(&img, axes.point(0.0, 10.0)), series(0));
        assert_eq!(pixel_at(&img, axes.point(10.0, 200.0)), series(1));
    }

    #[test]
    fn value_range_spans_both_coordinates() {
        let axes = single_axes(&nose(), 600, 400);
        assert!(axes.y_range.0 < 10.0);
        assert!(axes.y_range.1 > 200.0);
    }

    #[test]
    fn all_keypoints_draws_two_panels() {
        let mut ear = nose();
        ear.keypoint = KeypointName::LeftEar;
        ear.samples = vec![(0, 300.0, 50.0), (10, 310.0, 60.0)];
        let data = vec![nose(), ear];
        let refs: Vec<&KeypointTrajectory> = data.iter().collect();

        let img = render_all_trajectories(&data, 600, 800, None);
        assert_eq!(img.dimensions(), (600, 800));

        let top = panel_axes(&refs, Coordinate::X, 600, 0, 400);
        let bottom = panel_axes(&refs, Coordinate::Y, 600, 400, 400);
        assert!(top.area.bottom <= bottom.area.top);

        // Midpoint of the left-ear line in each panel.
        assert!(near(&img, top.point(5.0, 305.0), series(1)));
        assert!(near(&img, bottom.point(5.0, 55.0), series(1)));
    }
}
