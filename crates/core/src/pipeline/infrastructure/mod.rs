pub mod asset_context_builder;
pub mod refresh_scheduler;
