use std::io::Cursor;

use crate::detection::domain::face_detector::{DetectorSettings, FaceDetector};
use crate::shared::frame::GrayFrame;
use crate::shared::region::Region;

/// Horizontal/vertical stride of the sliding detection window.
const SLIDE_WINDOW_STEP: u32 = 4;

/// Smallest face size the engine accepts.
const ENGINE_MIN_FACE_SIZE: u32 = 20;

/// Face detector backed by the `rustface` crate (SeetaFace frontal cascade).
///
/// Binds from the raw bytes of a serialized cascade asset. The engine does
/// not expose the classic scale-factor/min-neighbors pair directly, so the
/// settings map to its nearest knobs: the pyramid step is the reciprocal of
/// the scale factor, and the neighbor count becomes the cascade score
/// threshold.
pub struct SeetaFaceDetector {
    model: rustface::Model,
    settings: DetectorSettings,
}

impl SeetaFaceDetector {
    pub fn from_bytes(
        asset: &[u8],
        settings: DetectorSettings,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let model = rustface::read_model(Cursor::new(asset))
            .map_err(|e| format!("unreadable detector asset: {e}"))?;
        Ok(Self { model, settings })
    }
}

impl FaceDetector for SeetaFaceDetector {
    fn detect(&mut self, frame: &GrayFrame) -> Result<Vec<Region>, Box<dyn std::error::Error>> {
        // The engine detector is cheap relative to a detection pass and not
        // shareable across calls, so one is built per frame from the model.
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(self.settings.min_face_size.max(ENGINE_MIN_FACE_SIZE));
        detector.set_score_thresh(self.settings.min_neighbors as f64);
        detector.set_pyramid_scale_factor(pyramid_scale(self.settings.scale_factor));
        detector.set_slide_window_step(SLIDE_WINDOW_STEP, SLIDE_WINDOW_STEP);

        let image = rustface::ImageData::new(frame.data(), frame.width(), frame.height());
        let faces = detector.detect(&image);

        Ok(faces
            .iter()
            .filter_map(|face| {
                let bbox = face.bbox();
                Region::clamped(
                    bbox.x(),
                    bbox.y(),
                    bbox.width() as i32,
                    bbox.height() as i32,
                    frame.width(),
                    frame.height(),
                )
            })
            .collect())
    }
}

/// Maps a multi-scale search step (e.g. 1.1) to the engine's pyramid
/// downscale ratio, keeping it inside the engine's accepted range.
fn pyramid_scale(scale_factor: f32) -> f32 {
    if scale_factor <= 1.0 {
        return 0.99;
    }
    (1.0 / scale_factor).clamp(0.1, 0.99)
}
