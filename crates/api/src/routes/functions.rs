//! Function source code recovery routes.

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_code_export;
use crate::services::CodeExportService;

/// GET /functions/:function_name/code
///
/// Recovers the source tree of a previously built function from its image
/// and returns it as a zip attachment.
pub async fn download_function_code(
    State(state): State<AppState>,
    Path(function_name): Path<String>,
) -> Result<Response, ApiError> {
    shared::validation::validate_function_name(&function_name).map_err(|e| {
        ApiError::Validation(
            e.message
                .map(|m| m.to_string())
                .unwrap_or_else(|| "Invalid function name".to_string()),
        )
    })?;

    info!(function = %function_name, "Source code export requested");

    let service = CodeExportService::new(state.docker.clone(), &state.config);
    let archive = service.export(&function_name).await?;
    record_code_export();

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{function_name}.zip\""),
        ),
    ];

    Ok((headers, archive).into_response())
}
