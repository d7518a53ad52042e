/// Axis-aligned face rectangle in frame coordinates.
///
/// Invariants: the rectangle lies fully inside the frame it was detected in
/// and has strictly positive width and height. Raw detector output may
/// violate both; [`Region::clamped`] is the constructor that enforces them,
/// discarding rectangles that do not survive clamping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        debug_assert!(width > 0 && height > 0, "Region must have positive size");
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersects a raw rectangle with the frame bounds.
    ///
    /// Returns `None` when nothing remains, e.g. the detection lies fully
    /// outside the frame or had non-positive size to begin with.
    pub fn clamped(
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        frame_width: u32,
        frame_height: u32,
    ) -> Option<Self> {
        let x0 = (x as i64).max(0);
        let y0 = (y as i64).max(0);
        let x1 = (x as i64 + width as i64).min(frame_width as i64);
        let y1 = (y as i64 + height as i64).min(frame_height as i64);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Self {
            x: x0 as u32,
            y: y0 as u32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}
