//! Real-time face emotion classification.
//!
//! The [`pipeline`] module ties the pieces together: frames come in through
//! a [`video::domain::frame_source::FrameSource`], faces are found and
//! classified, annotations are drawn, and every frame leaves through a
//! [`video::domain::frame_sink::FrameSink`]. Binaries supply the concrete
//! source, sink, and scheduling policy.

pub mod classification;
pub mod detection;
pub mod pipeline;
pub mod shared;
pub mod video;
