//! Concentration rate bar chart.

use image::RgbImage;

use lookdown_analysis_core::IdentityStats;

use crate::canvas::{self, Axes, PlotArea, BLACK};
use crate::colormap::red_yellow_green;
use crate::font::{label, Anchor, ChartFont};

const Y_MAX: f64 = 105.0;
const BAR_HALF_WIDTH: f64 = 0.4;
const OUTLINE_PX: u32 = 2;

fn bar_axes(count: usize, width: u32, height: u32) -> Axes {
    let area = PlotArea::inset(width, height, 80, 50, 30, 60);
    let n = count.max(1) as f64;
    Axes::new(area, (-0.6, n - 0.4), (0.0, Y_MAX))
}

/// One bar per identity at compacted x positions, height = rate, colour
/// from the red-yellow-green ramp of `rate / 100`.
pub fn render_bar_chart(
    stats: &[IdentityStats],
    width: u32,
    height: u32,
    font: Option<&ChartFont>,
) -> RgbImage {
    let mut img = canvas::blank(width, height);
    let axes = bar_axes(stats.len(), width, height);
    let area = axes.area;

    for tick in canvas::nice_ticks((0.0, 100.0), 5) {
        let y = axes.py(tick);
        canvas::draw_dashed_hline(&mut img, &area, y, canvas::GRID);
        label(
            &mut img,
            font,
            &canvas::format_tick(tick),
            (area.left - 6.0, y),
            Anchor::MiddleRight,
            12.0,
        );
    }

    for (i, s) in stats.iter().enumerate() {
        let x = i as f64;
        let rate = s.concentration_rate.clamp(0.0, 100.0);
        canvas::draw_box(
            &mut img,
            axes.point(x - BAR_HALF_WIDTH, 0.0),
            axes.point(x + BAR_HALF_WIDTH, rate),
            red_yellow_green(rate / 100.0),
            Some((BLACK, OUTLINE_PX)),
        );

        let (top_x, top_y) = axes.point(x, rate);
        label(
            &mut img,
            font,
            &format!("{rate:.1}%"),
            (top_x, top_y - 2.0),
            Anchor::BottomCenter,
            13.0,
        );
        label(
            &mut img,
            font,
            &s.tracking_id.to_string(),
            (top_x, area.bottom + 6.0),
            Anchor::TopCenter,
            12.0,
        );
    }

    canvas::draw_frame(&mut img, &area);
    label(
        &mut img,
        font,
        "Student Concentration Rates",
        (width as f32 / 2.0, 12.0),
        Anchor::TopCenter,
        18.0,
    );
    label(
        &mut img,
        font,
        "Student ID",
        (area.left + area.width() / 2.0, height as f32 - 8.0),
        Anchor::BottomCenter,
        14.0,
    );
    label(
        &mut img,
        font,
        "Concentration Rate (%)",
        (8.0, area.top - 14.0),
        Anchor::MiddleLeft,
        14.0,
    );

    img
}
