//! Chart font.
//!
//! DejaVu Sans is compiled in so titles, tick labels, and value labels are
//! always drawn. A configured TTF/OTF file replaces it.

use std::path::Path;

use ab_glyph::{FontArc, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};

use lookdown_common::error::{LookdownError, LookdownResult};

/// Where a label sits relative to its anchor point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    TopLeft,
    TopCenter,
    BottomCenter,
    MiddleLeft,
    MiddleRight,
}

const BUNDLED: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");

pub struct ChartFont {
    font: FontArc,
    source: String,
}

impl ChartFont {
    pub fn bundled() -> LookdownResult<Self> {
        let font = FontArc::try_from_slice(BUNDLED)
            .map_err(|e| LookdownError::report(format!("Invalid bundled font: {e}")))?;
        Ok(Self {
            font,
            source: "bundled DejaVu Sans".to_string(),
        })
    }

    pub fn load(path: &Path) -> LookdownResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LookdownError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => LookdownError::Io(e),
        })?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            LookdownError::report(format!("Invalid font {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Loaded chart font");
        Ok(Self {
            font,
            source: path.display().to_string(),
        })
    }

    /// Pixel width and height of `text` at `size`.
    pub fn measure(&self, text: &str, size: f32) -> (u32, u32) {
        text_size(PxScale::from(size), &self.font, text)
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, img: &mut RgbImage, text: &str, x: i32, y: i32, size: f32, color: Rgb<u8>) {
        draw_text_mut(img, color, x, y, PxScale::from(size), &self.font, text);
    }

    pub fn draw_anchored(
        &self,
        img: &mut RgbImage,
        text: &str,
        (x, y): (f32, f32),
        anchor: Anchor,
        size: f32,
        color: Rgb<u8>,
    ) {
        let (w, h) = self.measure(text, size);
        let (w, h) = (w as f32, h as f32);
        let (left, top) = match anchor {
            Anchor::TopLeft => (x, y),
            Anchor::TopCenter => (x - w / 2.0, y),
            Anchor::BottomCenter => (x - w / 2.0, y - h),
            Anchor::MiddleLeft => (x, y - h / 2.0),
            Anchor::MiddleRight => (x - w, y - h / 2.0),
        };
        self.draw(img, text, left.round() as i32, top.round() as i32, size, color);
    }
}

impl std::fmt::Debug for ChartFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartFont").field("source", &self.source).finish()
    }
}

/// Draw an anchored label if a font is available.
pub fn label(
    img: &mut RgbImage,
    font: Option<&ChartFont>,
    text: &str,
    at: (f32, f32),
    anchor: Anchor,
    size: f32,
) {
    if let Some(font) = font {
        font.draw_anchored(img, text, at, anchor, size, crate::canvas::BLACK);
    }
}
