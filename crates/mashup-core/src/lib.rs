//! mashup-core: Pipeline for building singer mashups from YouTube search results

pub mod config;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod merger;
pub mod pipeline;
pub mod probe;
pub mod report;
pub mod trimmer;
pub mod workspace;

pub use config::Config;
pub use error::{MashupError, Result};
pub use pipeline::{Pipeline, PipelineConfig, PipelineStage};
pub use report::RunReport;
