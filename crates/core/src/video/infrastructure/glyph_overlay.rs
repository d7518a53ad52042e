use ab_glyph::{FontArc, PxScale};
use image::Rgb;
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::video::domain::overlay::{Color, Overlay};

/// Overlay renderer drawing with `imageproc` and an `ab_glyph` font.
pub struct GlyphOverlay {
    font: FontArc,
}

impl GlyphOverlay {
    /// Build from the raw bytes of a TTF/OTF font file.
    pub fn from_font_bytes(
        bytes: Vec<u8>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let font = FontArc::try_from_vec(bytes)?;
        Ok(Self { font })
    }
}

impl Overlay for GlyphOverlay {
    fn draw_rect(&self, frame: &mut Frame, region: &Region, color: Color, thickness: u32) {
        outline_rect(frame, region, color, thickness);
    }

    fn fill_rect(
        &self,
        frame: &mut Frame,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Color,
        alpha: f32,
    ) {
        blend_rect(frame, x, y, width, height, color, alpha);
    }

    fn draw_text(&self, frame: &mut Frame, text: &str, x: i32, y: i32, size: f32, color: Color) {
        let mut image = frame.as_image_mut();
        draw_text_mut(
            &mut image,
            Rgb(color),
            x,
            y,
            PxScale::from(size),
            &self.font,
            text,
        );
    }
}

/// Outline a region by drawing `thickness` concentric one-pixel rectangles.
pub fn outline_rect(frame: &mut Frame, region: &Region, color: Color, thickness: u32) {
    let mut image = frame.as_image_mut();
    for i in 0..thickness {
        let width = region.width.saturating_sub(2 * i);
        let height = region.height.saturating_sub(2 * i);
        if width == 0 || height == 0 {
            break;
        }
        let rect =
            Rect::at(region.x as i32 + i as i32, region.y as i32 + i as i32).of_size(width, height);
        draw_hollow_rect_mut(&mut image, rect, Rgb(color));
    }
}

/// Alpha-blend a filled rectangle over the frame, clipping at the borders.
pub fn blend_rect(
    frame: &mut Frame,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    color: Color,
    alpha: f32,
) {
    let clipped = match Region::clamped(
        x,
        y,
        width as i32,
        height as i32,
        frame.width(),
        frame.height(),
    ) {
        Some(region) => region,
        None => return,
    };

    let alpha = alpha.clamp(0.0, 1.0);
    let mut pixels = frame.as_ndarray_mut();
    for row in clipped.y..clipped.y + clipped.height {
        for col in clipped.x..clipped.x + clipped.width {
            for c in 0..3 {
                let old = pixels[[row as usize, col as usize, c]] as f32;
                let blended = old * (1.0 - alpha) + color[c] as f32 * alpha;
                pixels[[row as usize, col as usize, c]] = blended.round() as u8;
            }
        }
    }
}
