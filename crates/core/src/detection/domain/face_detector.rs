use crate::shared::constants;
use crate::shared::frame::GrayFrame;
use crate::shared::region::Region;

/// Tuning knobs for multi-scale face search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorSettings {
    /// Step between successive search scales (> 1.0).
    pub scale_factor: f32,
    /// Evidence required to keep a detection.
    pub min_neighbors: u32,
    /// Smallest face searched for, in pixels.
    pub min_face_size: u32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            scale_factor: constants::DEFAULT_SCALE_FACTOR,
            min_neighbors: constants::DEFAULT_MIN_NEIGHBORS,
            min_face_size: constants::DEFAULT_MIN_FACE_SIZE,
        }
    }
}

/// Domain interface for face detection on a grayscale frame.
///
/// Implementations return one candidate region per detected face. Every
/// returned region satisfies the [`Region`] invariants for the given frame;
/// detections that cannot be clamped into the frame are dropped.
pub trait FaceDetector: Send {
    fn detect(&mut self, frame: &GrayFrame) -> Result<Vec<Region>, Box<dyn std::error::Error>>;
}
