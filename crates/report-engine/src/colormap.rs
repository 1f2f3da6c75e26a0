//! Colours.

use image::Rgb;

/// Red-yellow-green diverging ramp, low values red.
const RD_YL_GN: [[u8; 3]; 11] = [
    [165, 0, 38],
    [215, 48, 39],
    [244, 109, 67],
    [253, 174, 97],
    [254, 224, 139],
    [255, 255, 191],
    [217, 239, 139],
    [166, 217, 106],
    [102, 189, 99],
    [26, 152, 80],
    [0, 104, 55],
];

/// Colour for `t` in `[0, 1]` on the red-yellow-green ramp. Out-of-range
/// and NaN inputs are clamped.
pub fn red_yellow_green(t: f64) -> Rgb<u8> {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (RD_YL_GN.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(RD_YL_GN.len() - 2);
    let frac = scaled - i as f64;

    let lo = RD_YL_GN[i];
    let hi = RD_YL_GN[i + 1];
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    Rgb([mix(lo[0], hi[0]), mix(lo[1], hi[1]), mix(lo[2], hi[2])])
}

pub const LOOKING_DOWN: Rgb<u8> = Rgb([255, 0, 0]);
pub const CONCENTRATED: Rgb<u8> = Rgb([0, 128, 0]);

/// Line colours, cycled.
pub const SERIES: [Rgb<u8>; 10] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
    Rgb([140, 86, 75]),
    Rgb([227, 119, 194]),
    Rgb([127, 127, 127]),
    Rgb([188, 189, 34]),
    Rgb([23, 190, 207]),
];

pub fn series(index: usize) -> Rgb<u8> {
    SERIES[index % SERIES.len()]
}
