use std::fs;
use std::path::PathBuf;

use crate::classification::domain::inference_engine::InferenceEngine;
use crate::classification::domain::labels::LabelList;
use crate::classification::infrastructure::onnx_inference_engine::OnnxInferenceEngine;
use crate::detection::domain::face_detector::{DetectorSettings, FaceDetector};
use crate::detection::infrastructure::seeta_face_detector::SeetaFaceDetector;
use crate::pipeline::init_sequencer::ContextBuilder;
use crate::shared::asset_resolver::{self, AssetResolveError, ProgressFn};
use crate::shared::constants::{
    DETECTOR_ASSET_NAME, DETECTOR_ASSET_URL, EMOTION_MODEL_NAME, EMOTION_MODEL_URL, LABELS_NAME,
    LABELS_URL,
};

/// Production [`ContextBuilder`]: every asset goes through the shared cache
/// (downloading on first run), the detector binds to the SeetaFace cascade
/// and the classifier to the ONNX model.
pub struct AssetContextBuilder {
    settings: DetectorSettings,
    bundled_dir: Option<PathBuf>,
    cache_dir: Option<PathBuf>,
    progress: Option<ProgressFn>,
}

impl AssetContextBuilder {
    pub fn new(
        settings: DetectorSettings,
        bundled_dir: Option<PathBuf>,
        progress: Option<ProgressFn>,
    ) -> Self {
        Self {
            settings,
            bundled_dir,
            cache_dir: None,
            progress,
        }
    }

    /// Resolve assets against this directory instead of the platform cache.
    pub fn with_cache_dir(mut self, cache_dir: PathBuf) -> Self {
        self.cache_dir = Some(cache_dir);
        self
    }

    fn resolve(&self, name: &str, url: &str) -> Result<PathBuf, AssetResolveError> {
        match &self.cache_dir {
            Some(dir) => asset_resolver::resolve_in(
                dir,
                name,
                url,
                self.bundled_dir.as_deref(),
                self.progress.as_ref(),
            ),
            None => asset_resolver::resolve(
                name,
                url,
                self.bundled_dir.as_deref(),
                self.progress.as_ref(),
            ),
        }
    }
}

impl ContextBuilder for AssetContextBuilder {
    fn fetch_detector_asset(
        &mut self,
    ) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        let path = self.resolve(DETECTOR_ASSET_NAME, DETECTOR_ASSET_URL)?;
        Ok(fs::read(path)?)
    }

    fn bind_detector(
        &mut self,
        asset: &[u8],
    ) -> Result<Box<dyn FaceDetector>, Box<dyn std::error::Error + Send + Sync>> {
        let detector = SeetaFaceDetector::from_bytes(asset, self.settings)?;
        Ok(Box::new(detector))
    }

    fn load_engine(
        &mut self,
    ) -> Result<(Box<dyn InferenceEngine>, u32), Box<dyn std::error::Error + Send + Sync>> {
        let path = self.resolve(EMOTION_MODEL_NAME, EMOTION_MODEL_URL)?;
        let engine = OnnxInferenceEngine::from_file(&path)?;
        let tensor_size = engine.tensor_size();
        Ok((Box::new(engine), tensor_size))
    }

    fn load_labels(&mut self) -> Result<LabelList, Box<dyn std::error::Error + Send + Sync>> {
        let path = self.resolve(LABELS_NAME, LABELS_URL)?;
        let bytes = fs::read(&path)?;
        Ok(LabelList::from_json(&bytes)?)
    }
}
