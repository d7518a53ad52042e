use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// RGB color triple used by overlay drawing.
pub type Color = [u8; 3];

/// Box color for detected face candidates.
pub const LIME: Color = [0, 255, 0];

pub const WHITE: Color = [255, 255, 255];

pub const BLACK: Color = [0, 0, 0];

/// Draws annotation primitives onto a frame's presentation surface.
///
/// All operations clip at the frame borders instead of failing, so a face
/// box hanging off the edge still renders its visible part.
pub trait Overlay: Send {
    /// Outline a region with a border of the given thickness.
    fn draw_rect(&self, frame: &mut Frame, region: &Region, color: Color, thickness: u32);

    /// Fill an axis-aligned rectangle, blending with `alpha` in `[0, 1]`
    /// over the existing pixels.
    fn fill_rect(
        &self,
        frame: &mut Frame,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: Color,
        alpha: f32,
    );

    /// Render text with its top-left corner at `(x, y)`.
    fn draw_text(&self, frame: &mut Frame, text: &str, x: i32, y: i32, size: f32, color: Color);
}
