pub mod api;
pub mod blob_factory;
pub mod config;
pub mod error;
pub mod repo_factory;
pub mod telemetry;
