//! Filesystem and download helpers shared by the pipeline.

pub mod fs;
pub mod http;
