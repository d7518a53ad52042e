use crate::shared::frame::Frame;

/// Receives every frame after annotation, whether or not a face was found.
pub trait FrameSink: Send {
    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>>;
}
