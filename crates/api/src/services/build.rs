//! Function build pipeline.
//!
//! Takes an uploaded source archive through extraction, runtime detection,
//! scaffold injection and an image build/tag/push, all inside a scratch
//! directory that is dropped when the build finishes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use axum::body::Bytes;
use domain::models::{FunctionImage, ImageRef, Runtime};
use domain::services::inject_scaffold;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::middleware::metrics::{record_build, record_build_duration};
use crate::services::docker::{DockerCli, DockerError};
use shared::archive::{self, ArchiveError};

/// Errors from the build pipeline.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("container engine error: {0}")]
    Docker(#[from] DockerError),

    #[error("no Dockerfile for runtime '{0}' under the scaffold root")]
    MissingDockerfile(Runtime),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Orchestrates source-archive-to-pushed-image builds.
pub struct BuildService {
    docker: DockerCli,
    registry_url: String,
    push_endpoint: String,
    scaffold_root: PathBuf,
    default_runtime: Runtime,
}

impl BuildService {
    pub fn new(docker: DockerCli, config: &Config) -> Self {
        Self {
            docker,
            registry_url: config.registry.url.clone(),
            push_endpoint: config.registry.push_endpoint().to_string(),
            scaffold_root: config.runtimes.scaffold_root.clone(),
            default_runtime: config.runtimes.default_runtime,
        }
    }

    /// Builds and pushes an image for `function_name` from a zipped source
    /// tree, returning the advertised image reference.
    pub async fn build(
        &self,
        function_name: &str,
        archive_bytes: Bytes,
    ) -> Result<FunctionImage, BuildError> {
        let started = Instant::now();
        let scratch = tempfile::tempdir()?;
        let context = scratch.path().join("src");

        // Extraction and scaffold copying are blocking filesystem work.
        let runtime = {
            let context = context.clone();
            let scaffold_root = self.scaffold_root.clone();
            let default_runtime = self.default_runtime;
            tokio::task::spawn_blocking(move || {
                archive::extract_zip(&archive_bytes, &context)?;

                let runtime = detect_runtime(&context, default_runtime)?;
                inject_scaffold(&scaffold_root, runtime, &context)?;
                stage_dockerfile(&scaffold_root, runtime, &context)?;

                Ok::<Runtime, BuildError>(runtime)
            })
            .await??
        };

        let image = ImageRef::latest(&self.registry_url, function_name);
        let result = self.build_tag_push(&context, &image).await;

        let runtime_label = runtime.id();
        let outcome = if result.is_ok() { "success" } else { "failure" };
        record_build(runtime_label, outcome);
        record_build_duration(runtime_label, started.elapsed().as_secs_f64());
        result?;

        info!(
            function = function_name,
            image = %image,
            runtime = %runtime,
            elapsed_secs = started.elapsed().as_secs(),
            "Function image built and pushed"
        );

        Ok(FunctionImage {
            name: function_name.to_string(),
            image: image.reference(),
            runtime,
        })
    }

    async fn build_tag_push(&self, context: &Path, image: &ImageRef) -> Result<(), BuildError> {
        info!(image = %image, "Building image");
        self.docker.build(context, &image.reference()).await?;

        // When the push endpoint differs from the advertised registry,
        // the image carries a second reference for the internal network.
        let push_image = image.with_registry(&self.push_endpoint);
        if push_image != *image {
            info!(image = %push_image, "Tagging image for push endpoint");
            self.docker
                .tag(&image.reference(), &push_image.reference())
                .await?;
        }

        info!(image = %push_image, "Pushing image");
        self.docker.push(&push_image.reference()).await?;
        Ok(())
    }
}

/// Detects the runtime from the extracted top level, falling back to the
/// configured default when no marker file matches.
fn detect_runtime(context: &Path, default_runtime: Runtime) -> Result<Runtime, BuildError> {
    let files: Vec<String> = fs::read_dir(context)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();

    match Runtime::detect(&files) {
        Some(runtime) => {
            info!(runtime = %runtime, "Detected runtime");
            Ok(runtime)
        }
        None => {
            warn!(fallback = %default_runtime, "No runtime detected, using default");
            Ok(default_runtime)
        }
    }
}

/// Copies the runtime's Dockerfile into the build context, replacing any
/// Dockerfile the upload or the scaffold provided.
fn stage_dockerfile(
    scaffold_root: &Path,
    runtime: Runtime,
    context: &Path,
) -> Result<(), BuildError> {
    let dockerfile = scaffold_root.join(runtime.id()).join("Dockerfile");
    if !dockerfile.is_file() {
        return Err(BuildError::MissingDockerfile(runtime));
    }
    fs::copy(&dockerfile, context.join("Dockerfile"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scaffold_with_dockerfile(runtime: Runtime) -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(runtime.id());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("Dockerfile"), "FROM scratch\n").unwrap();
        root
    }

    #[test]
    fn test_detect_runtime_from_markers() {
        let context = tempfile::tempdir().unwrap();
        fs::write(context.path().join("go.mod"), "module fn").unwrap();

        let runtime = detect_runtime(context.path(), Runtime::PythonFlask).unwrap();
        assert_eq!(runtime, Runtime::Go);
    }

    #[test]
    fn test_detect_runtime_falls_back_to_default() {
        let context = tempfile::tempdir().unwrap();
        fs::write(context.path().join("README.md"), "docs only").unwrap();

        let runtime = detect_runtime(context.path(), Runtime::Nodejs).unwrap();
        assert_eq!(runtime, Runtime::Nodejs);
    }

    #[test]
    fn test_stage_dockerfile_overwrites_uploaded_one() {
        let scaffold = scaffold_with_dockerfile(Runtime::Go);
        let context = tempfile::tempdir().unwrap();
        fs::write(context.path().join("Dockerfile"), "FROM evil\n").unwrap();

        stage_dockerfile(scaffold.path(), Runtime::Go, context.path()).unwrap();

        let contents = fs::read_to_string(context.path().join("Dockerfile")).unwrap();
        assert_eq!(contents, "FROM scratch\n");
    }

    #[test]
    fn test_stage_dockerfile_missing_is_error() {
        let scaffold = tempfile::tempdir().unwrap();
        let context = tempfile::tempdir().unwrap();

        let err = stage_dockerfile(scaffold.path(), Runtime::Nodejs, context.path()).unwrap_err();
        assert!(matches!(err, BuildError::MissingDockerfile(Runtime::Nodejs)));
    }
}
