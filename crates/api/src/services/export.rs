//! Source code recovery from built function images.
//!
//! Function images keep their source under `/app`. Export creates a
//! stopped container from the image, copies that tree out, zips it and
//! removes the container again whether or not the copy succeeded.

use domain::models::ImageRef;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::Config;
use crate::services::docker::{DockerCli, DockerError};
use shared::archive::{self, ArchiveError};

/// Path inside function images where the source tree lives. Fixed by the
/// runtime Dockerfiles.
const IMAGE_SOURCE_PATH: &str = "/app/.";

/// Errors from the code export pipeline.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no image for function '{0}'")]
    ImageNotFound(String),

    #[error("container engine error: {0}")]
    Docker(DockerError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Recovers the source of previously built functions.
pub struct CodeExportService {
    docker: DockerCli,
    registry_url: String,
}

impl CodeExportService {
    pub fn new(docker: DockerCli, config: &Config) -> Self {
        Self {
            docker,
            registry_url: config.registry.url.clone(),
        }
    }

    /// Returns the function's source tree as zip archive bytes.
    pub async fn export(&self, function_name: &str) -> Result<Vec<u8>, ExportError> {
        let image = ImageRef::latest(&self.registry_url, function_name);

        let container_id = self.docker.create(&image.reference()).await.map_err(|e| {
            if e.is_image_not_found() {
                ExportError::ImageNotFound(function_name.to_string())
            } else {
                ExportError::Docker(e)
            }
        })?;
        info!(
            function = function_name,
            container = %container_id,
            "Created temporary container for code export"
        );

        let result = self.copy_and_pack(&container_id).await;

        // The container is scratch space; always clean it up.
        if let Err(e) = self.docker.rm(&container_id).await {
            warn!(container = %container_id, error = %e, "Failed to remove export container");
        }

        let bytes = result?;
        info!(
            function = function_name,
            bytes = bytes.len(),
            "Exported function source"
        );
        Ok(bytes)
    }

    async fn copy_and_pack(&self, container_id: &str) -> Result<Vec<u8>, ExportError> {
        let scratch = tempfile::tempdir()?;

        self.docker
            .cp_from(container_id, IMAGE_SOURCE_PATH, scratch.path())
            .await
            .map_err(ExportError::Docker)?;

        let bytes = tokio::task::spawn_blocking(move || {
            let bytes = archive::pack_dir(scratch.path())?;
            Ok::<Vec<u8>, ExportError>(bytes)
        })
        .await??;

        Ok(bytes)
    }
}
