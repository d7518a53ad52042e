use std::path::PathBuf;

use crate::shared::frame::Frame;
use crate::video::domain::frame_sink::FrameSink;

/// Writes every presented frame as a numbered PNG into one directory.
pub struct ImageDirSink {
    dir: PathBuf,
    written: u64,
}

impl ImageDirSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir, written: 0 }
    }

    /// Number of frames written so far.
    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for ImageDirSink {
    fn present(&mut self, frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("frame_{:06}.png", frame.index()));
        frame.as_image().save(&path)?;
        self.written += 1;
        Ok(())
    }
}

/// Sink that discards frames, for runs where only the classification stream
/// matters.
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &Frame) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}
