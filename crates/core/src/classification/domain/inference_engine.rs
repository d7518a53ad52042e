use ndarray::Array4;

/// Produces one raw score per emotion class from a preprocessed face tensor.
///
/// Implementations are assumed single-call-at-a-time; the pipeline never
/// issues overlapping calls against one instance.
pub trait InferenceEngine: Send {
    /// Run a single forward pass over a `[1, 3, S, S]` float tensor and
    /// return the flattened score vector, one entry per class.
    fn infer(&mut self, input: Array4<f32>) -> Result<Vec<f32>, Box<dyn std::error::Error>>;
}
