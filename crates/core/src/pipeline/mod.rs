pub mod frame_pipeline;
pub mod infrastructure;
pub mod init_sequencer;
pub mod pipeline_logger;
pub mod reading;
pub mod scheduler;
