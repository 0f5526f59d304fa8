//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub engine: EngineHealth,
    pub registry: RegistryHealth,
}

/// Container engine health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct EngineHealth {
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
}

/// Image registry health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct RegistryHealth {
    pub url: String,
    pub reachable: bool,
}

/// Simple status response for liveness/readiness probes.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Full health check endpoint.
///
/// Returns detailed health information including container engine
/// availability and registry reachability. Unhealthy (no engine) is 503:
/// a builder that cannot build should not receive traffic.
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let engine = match state.docker.version().await {
        Ok(version) => EngineHealth {
            available: true,
            client_version: Some(version),
        },
        Err(_) => EngineHealth {
            available: false,
            client_version: None,
        },
    };

    let registry_url = state.config.registry.url.clone();
    let reachable = registry_reachable(&state.http, &registry_url).await;

    let healthy = engine.available;
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        engine,
        registry: RegistryHealth {
            url: registry_url,
            reachable,
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Liveness probe endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness probe endpoint.
///
/// Returns 200 OK if the service can accept builds (engine answers).
pub async fn ready(State(state): State<AppState>) -> Result<Json<StatusResponse>, StatusCode> {
    if state.docker.version().await.is_ok() {
        Ok(Json(StatusResponse {
            status: "ready".to_string(),
        }))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Probes the registry's version root (`/v2/`). Any HTTP answer counts as
/// reachable; registries commonly reply 200 or 401 there.
async fn registry_reachable(client: &reqwest::Client, registry_url: &str) -> bool {
    client
        .get(format!("http://{registry_url}/v2/"))
        .send()
        .await
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_healthy() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.3.0".to_string(),
            engine: EngineHealth {
                available: true,
                client_version: Some("27.0.3".to_string()),
            },
            registry: RegistryHealth {
                url: "localhost:5001".to_string(),
                reachable: true,
            },
        };
        assert_eq!(response.status, "healthy");
        assert!(response.engine.available);
        assert_eq!(response.engine.client_version.as_deref(), Some("27.0.3"));
        assert!(response.registry.reachable);
    }

    #[test]
    fn test_health_response_unhealthy() {
        let response = HealthResponse {
            status: "unhealthy".to_string(),
            version: "0.3.0".to_string(),
            engine: EngineHealth {
                available: false,
                client_version: None,
            },
            registry: RegistryHealth {
                url: "localhost:5001".to_string(),
                reachable: false,
            },
        };
        assert_eq!(response.status, "unhealthy");
        assert!(!response.engine.available);
        assert!(response.engine.client_version.is_none());
    }

    #[test]
    fn test_engine_health_omits_missing_version() {
        let health = EngineHealth {
            available: false,
            client_version: None,
        };
        let json = serde_json::to_string(&health).unwrap();
        assert!(!json.contains("client_version"));
    }

    #[test]
    fn test_status_response() {
        let response = StatusResponse {
            status: "alive".to_string(),
        };
        assert_eq!(response.status, "alive");
    }
}
