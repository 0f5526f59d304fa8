//! Application services.
//!
//! Services wrap the container engine and orchestrate the build and
//! code-export pipelines on top of it.

pub mod build;
pub mod docker;
pub mod export;

pub use build::BuildService;
pub use docker::DockerCli;
pub use export::CodeExportService;
