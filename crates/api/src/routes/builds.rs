//! Function build API routes.

use axum::{
    body::Bytes,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::BuildService;

/// Validated build request assembled from the multipart form.
#[derive(Debug, Validate)]
pub struct BuildRequest {
    #[validate(custom(function = "shared::validation::validate_function_name"))]
    pub name: String,
}

/// POST /build
///
/// Accepts a multipart form with a `file` part (zip archive of the
/// function source) and a `name` part. Builds and pushes the function
/// image and returns its details with 201.
pub async fn build_function(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut archive: Option<Bytes> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => archive = Some(field.bytes().await?),
            Some("name") => name = Some(field.text().await?),
            _ => {}
        }
    }

    let archive = archive.ok_or_else(|| ApiError::Validation("No file part".to_string()))?;
    let name = name
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("Function name is required".to_string()))?;

    let request = BuildRequest { name };
    request.validate()?;

    info!(
        function = %request.name,
        archive_bytes = archive.len(),
        "Build requested"
    );

    let service = BuildService::new(state.docker.clone(), &state.config);
    let built = service.build(&request.name, archive).await?;

    Ok((StatusCode::CREATED, Json(built)))
}
