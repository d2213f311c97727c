//! Implementations of the build-wide stages.

mod compile;
mod copy;
mod package;
mod prepare;
mod service;
mod shrink;

pub use compile::compile_installer;
pub use copy::copy_auxiliary_artifacts;
pub use package::{install_dependencies, package_executable, packager_arguments};
pub use prepare::prepare_build_folder;
pub use service::build_service;
pub use shrink::shrink_package;
