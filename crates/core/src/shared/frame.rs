use image::{ImageBuffer, Rgb};
use ndarray::{ArrayView3, ArrayViewMut3};

/// Number of channels in every [`Frame`]: interleaved RGB.
pub const CHANNELS: usize = 3;

/// A single video frame: contiguous RGB bytes in row-major order, plus the
/// monotonically increasing index stamped by its source.
///
/// Frames are owned by the cycle that acquired them and dropped before the
/// next cycle begins.
#[derive(Clone, Debug)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    index: u64,
}

/// Single-channel luma companion of [`Frame`], the representation the face
/// detector consumes.
#[derive(Clone, Debug)]
pub struct GrayFrame {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, index: u64) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * CHANNELS,
            "data length must equal width * height * 3"
        );
        Self {
            data,
            width,
            height,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn index(&self) -> u64 {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Borrows the frame as an [`image`] buffer for encoding and resampling.
    pub fn as_image(&self) -> ImageBuffer<Rgb<u8>, &[u8]> {
        ImageBuffer::from_raw(self.width, self.height, self.data.as_slice())
            .expect("Frame data length must match dimensions")
    }

    /// Mutable [`image`] buffer view for overlay drawing.
    pub fn as_image_mut(&mut self) -> ImageBuffer<Rgb<u8>, &mut [u8]> {
        ImageBuffer::from_raw(self.width, self.height, self.data.as_mut_slice())
            .expect("Frame data length must match dimensions")
    }

    /// Converts to single-channel luma with BT.601 weights, the same
    /// weighting OpenCV applies for RGB-to-gray conversion.
    pub fn to_luma(&self) -> GrayFrame {
        let mut data = Vec::with_capacity((self.width as usize) * (self.height as usize));
        for px in self.data.chunks_exact(CHANNELS) {
            let luma = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
            data.push(luma.round().min(255.0) as u8);
        }
        GrayFrame {
            data,
            width: self.width,
            height: self.height,
        }
    }

    fn shape(&self) -> (usize, usize, usize) {
        (self.height as usize, self.width as usize, CHANNELS)
    }
}

impl GrayFrame {
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
