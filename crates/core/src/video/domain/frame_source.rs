use crate::shared::frame::Frame;

/// Supplies frames to the pipeline, one per cycle.
///
/// Implementations handle I/O details (directory scanning, decoding, device
/// access) while the pipeline works with the abstract `Frame` type.
pub trait FrameSource: Send {
    /// Pulls the next frame.
    ///
    /// `Ok(None)` means the source has ended. An `Err` is a transient
    /// acquisition failure; the caller may try again next cycle.
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Native pixel dimensions, if the source knows them up front.
    fn dimensions(&self) -> Option<(u32, u32)>;
}
