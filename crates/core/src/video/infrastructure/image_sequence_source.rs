use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::frame_source::FrameSource;

/// Adapts a directory of still images (or an explicit file list) to the
/// [`FrameSource`] interface.
///
/// Files are served in lexicographic order. With `repeat` the sequence wraps
/// around indefinitely, which stands in for a live feed.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    position: usize,
    next_index: u64,
    repeat: bool,
    dimensions: Option<(u32, u32)>,
}

impl ImageSequenceSource {
    /// Scans a directory for image files, sorted by name.
    pub fn from_dir(dir: &Path, repeat: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && has_image_extension(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        if paths.is_empty() {
            return Err(format!("No image files in {}", dir.display()).into());
        }
        Ok(Self::from_paths(paths, repeat))
    }

    pub fn from_paths(paths: Vec<PathBuf>, repeat: bool) -> Self {
        Self {
            paths,
            position: 0,
            next_index: 0,
            repeat,
            dimensions: None,
        }
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn load_frame(path: &Path, index: u64) -> Result<Frame, Box<dyn std::error::Error>> {
    let img = image::open(path)?.into_rgb8();
    let (width, height) = img.dimensions();
    Ok(Frame::new(img.into_raw(), width, height, index))
}

impl FrameSource for ImageSequenceSource {
    /// A file that fails to decode costs one `Err` and is then skipped; the
    /// position has already advanced past it.
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if self.position >= self.paths.len() {
            if !self.repeat {
                return Ok(None);
            }
            self.position = 0;
        }
        let path = &self.paths[self.position];
        self.position += 1;

        let frame = load_frame(path, self.next_index)?;
        self.next_index += 1;
        self.dimensions = Some((frame.width(), frame.height()));
        Ok(Some(frame))
    }

    fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }
}
