//! Async wrapper around the `docker` command-line client.
//!
//! The builder talks to the container engine through the CLI rather than
//! the engine API; the daemon it reaches is whatever `DOCKER_HOST` (or the
//! mounted socket) points at. Every method shells out, captures output and
//! turns a non-zero exit status into a typed error carrying stderr.

use std::ffi::{OsStr, OsString};
use std::path::Path;
use std::process::Output;

use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

/// Errors from invoking the container engine client.
#[derive(Debug, Error)]
pub enum DockerError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("`{command}` produced non-UTF-8 output")]
    InvalidOutput { command: String },
}

impl DockerError {
    /// Whether the failure indicates a missing image rather than an
    /// engine problem.
    pub fn is_image_not_found(&self) -> bool {
        match self {
            DockerError::CommandFailed { stderr, .. } => {
                let stderr = stderr.to_ascii_lowercase();
                stderr.contains("no such image")
                    || stderr.contains("not found")
                    || stderr.contains("manifest unknown")
            }
            _ => false,
        }
    }
}

/// Handle to the `docker` binary.
#[derive(Debug, Clone)]
pub struct DockerCli {
    binary: OsString,
}

impl Default for DockerCli {
    fn default() -> Self {
        Self {
            binary: OsString::from("docker"),
        }
    }
}

impl DockerCli {
    /// Uses a specific client binary instead of `docker` from `PATH`.
    #[cfg(test)]
    pub fn with_binary(binary: impl Into<OsString>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Builds an image from a context directory: `docker build -t <image> <dir>`.
    pub async fn build(&self, context_dir: &Path, image: &str) -> Result<(), DockerError> {
        self.run([
            OsStr::new("build"),
            OsStr::new("-t"),
            OsStr::new(image),
            context_dir.as_os_str(),
        ])
        .await?;
        Ok(())
    }

    /// Applies an additional reference to an image: `docker tag <src> <dst>`.
    pub async fn tag(&self, source: &str, target: &str) -> Result<(), DockerError> {
        self.run(["tag", source, target]).await?;
        Ok(())
    }

    /// Pushes an image to its registry: `docker push <image>`.
    pub async fn push(&self, image: &str) -> Result<(), DockerError> {
        self.run(["push", image]).await?;
        Ok(())
    }

    /// Creates a stopped container from an image and returns its id.
    pub async fn create(&self, image: &str) -> Result<String, DockerError> {
        let output = self.run(["create", image]).await?;
        String::from_utf8(output.stdout)
            .map(|id| id.trim().to_string())
            .map_err(|_| DockerError::InvalidOutput {
                command: format!("docker create {image}"),
            })
    }

    /// Copies a path out of a container: `docker cp <id>:<path> <dest>`.
    pub async fn cp_from(
        &self,
        container_id: &str,
        container_path: &str,
        dest: &Path,
    ) -> Result<(), DockerError> {
        let source = format!("{container_id}:{container_path}");
        self.run([OsStr::new("cp"), OsStr::new(&source), dest.as_os_str()])
            .await?;
        Ok(())
    }

    /// Removes a container: `docker rm <id>`.
    pub async fn rm(&self, container_id: &str) -> Result<(), DockerError> {
        self.run(["rm", container_id]).await?;
        Ok(())
    }

    /// Reports the client version; doubles as the engine health probe.
    pub async fn version(&self) -> Result<String, DockerError> {
        let output = self
            .run(["version", "--format", "{{.Client.Version}}"])
            .await?;
        String::from_utf8(output.stdout)
            .map(|v| v.trim().to_string())
            .map_err(|_| DockerError::InvalidOutput {
                command: "docker version".to_string(),
            })
    }

    async fn run<I, S>(&self, args: I) -> Result<Output, DockerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_owned()).collect();
        let rendered = display_command(&self.binary, &args);
        debug!(command = %rendered, "Running container engine command");

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .await
            .map_err(|source| DockerError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(DockerError::CommandFailed {
                command: rendered,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(output)
    }
}

fn display_command(binary: &OsStr, args: &[OsString]) -> String {
    let mut parts = vec![binary.to_string_lossy().into_owned()];
    parts.extend(args.iter().map(|a| a.to_string_lossy().into_owned()));
    parts.join(" ")
}
