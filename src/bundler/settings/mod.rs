//! Configuration structures for an installer run.
//!
//! This module provides the artifact descriptors, the tool settings of the
//! build stages, and the [`BuildContext`] that carries them through the
//! pipeline.

mod artifact;
mod builder;
mod context;
mod tools;

pub use artifact::{Artifact, ArtifactSource, BuildDirective};
pub use builder::BuildContextBuilder;
pub use context::BuildContext;
pub use tools::{
    CommandSpec, CompilerSettings, FileCopy, LayoutSettings, PackagerSettings, ServiceSettings,
    ToolSettings,
};
