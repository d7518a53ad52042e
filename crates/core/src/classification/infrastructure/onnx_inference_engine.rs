use std::path::Path;

use ndarray::Array4;

use crate::classification::domain::inference_engine::InferenceEngine;
use crate::shared::constants::DEFAULT_TENSOR_SIZE;

/// Emotion classifier backed by an ONNX Runtime session.
pub struct OnnxInferenceEngine {
    session: ort::session::Session,
    tensor_size: u32,
}

impl OnnxInferenceEngine {
    /// Load a classification ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting
    /// NCHW). Falls back to 64 if the shape is dynamic or unreadable.
    pub fn from_file(model_path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let intra_threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let session = ort::session::Session::builder()?
            .with_optimization_level(ort::session::builder::GraphOptimizationLevel::Level3)
            .map_err(ort::Error::<()>::from)?
            .with_inter_threads(1)
            .map_err(ort::Error::<()>::from)?
            .with_intra_threads(intra_threads)
            .map_err(ort::Error::<()>::from)?
            .with_execution_providers(preferred_execution_providers())
            .map_err(ort::Error::<()>::from)?
            .commit_from_file(model_path)?;

        let tensor_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    // shape is [N, C, H, W] — use H for a fixed square input
                    if shape.len() == 4 && shape[2] > 0 && shape[2] == shape[3] {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_TENSOR_SIZE);
        log::debug!("classifier expects {tensor_size}x{tensor_size} input");

        Ok(Self {
            session,
            tensor_size,
        })
    }

    /// Spatial input resolution the loaded model expects.
    pub fn tensor_size(&self) -> u32 {
        self.tensor_size
    }
}

impl InferenceEngine for OnnxInferenceEngine {
    fn infer(&mut self, input: Array4<f32>) -> Result<Vec<f32>, Box<dyn std::error::Error>> {
        let input_value = ort::value::Tensor::from_array(input)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Classifier produced no outputs".into());
        }
        let scores = outputs[0].try_extract_array::<f32>()?;
        // Output is [1, num_classes] (or already flat); flatten either way.
        Ok(scores.iter().copied().collect())
    }
}

/// Preferred ONNX execution providers for the current platform.
///
/// CPU is the implicit fallback when none registers.
fn preferred_execution_providers() -> Vec<ort::execution_providers::ExecutionProviderDispatch> {
    #[cfg(target_os = "macos")]
    {
        vec![ort::execution_providers::CoreMLExecutionProvider::default().build()]
    }
    #[cfg(target_os = "windows")]
    {
        vec![ort::execution_providers::DirectMLExecutionProvider::default().build()]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        vec![]
    }
}
