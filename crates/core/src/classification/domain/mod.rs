pub mod inference_engine;
pub mod interpreter;
pub mod labels;
pub mod preprocessor;
