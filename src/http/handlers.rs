use super::state::AppState;
use crate::vehicle::{ClimateRequestOptions, Vehicle, VehicleError, VehicleManager};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "hyundai-bluelink";
const UNAVAILABLE_DETAIL: &str = "Failed to connect to vehicle service";
const NOT_FOUND_DETAIL: &str = "Vehicle not found";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub status: &'static str,
    pub action: &'static str,

    /// Which command carried out a stop
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<&'static str>,
}

impl ActionResponse {
    fn success(action: &'static str) -> Self {
        Self {
            status: "success",
            action,
            method: None,
        }
    }

    fn success_with_method(action: &'static str, method: &'static str) -> Self {
        Self {
            method: Some(method),
            ..Self::success(action)
        }
    }
}

/// Projection of [`Vehicle`] returned by GET /status
#[derive(Debug, Serialize)]
pub struct VehicleStatusResponse {
    pub name: String,
    pub model: String,
    pub odometer: Option<f64>,
    pub is_locked: bool,
    pub is_engine_running: bool,
    pub air_temperature: Option<f64>,

    /// RFC 3339, or "unknown" when the cloud has no timestamp
    pub last_updated_at: String,
}

impl From<Vehicle> for VehicleStatusResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            name: vehicle.name,
            model: vehicle.model,
            odometer: vehicle.odometer,
            is_locked: vehicle.is_locked,
            is_engine_running: vehicle.engine_is_running,
            air_temperature: vehicle.air_temperature,
            last_updated_at: vehicle
                .last_updated_at
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

fn error_response(status: StatusCode, detail: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
        .into_response()
}

/// Fetch the shared manager, or the 500 response to return when it is unavailable
async fn connect(state: &AppState) -> Result<Arc<dyn VehicleManager>, Response> {
    state.provider.get().await.map_err(|_| {
        error_response(StatusCode::INTERNAL_SERVER_ERROR, UNAVAILABLE_DETAIL)
    })
}

fn action_result(action: &'static str, result: Result<(), VehicleError>) -> Response {
    match result {
        Ok(()) => {
            info!("Vehicle {} completed successfully", action);
            (StatusCode::OK, Json(ActionResponse::success(action))).into_response()
        }
        Err(e) => {
            error!("Error during vehicle {}: {}", action, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Climate preset used by POST /start
fn remote_start_options() -> ClimateRequestOptions {
    ClimateRequestOptions {
        set_temp: Some(30.0),
        duration: Some(10),
        defrost: Some(true),
        climate: Some(true),
        heating: Some(1),
        front_left_seat: Some(8),
        front_right_seat: Some(8),
        steering_wheel: Some(1),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy",
            service: SERVICE_NAME,
        }),
    )
}

/// GET /status
/// Refresh cached state and report the configured vehicle
pub async fn get_status(State(state): State<AppState>) -> Response {
    let manager = match connect(&state).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };

    if let Err(e) = manager.update_all_vehicles_with_cached_state().await {
        error!("Error getting status: {}", e);
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
    }

    match manager.vehicle(&state.vehicle_id).await {
        Some(vehicle) => {
            (StatusCode::OK, Json(VehicleStatusResponse::from(vehicle))).into_response()
        }
        None => {
            warn!("Vehicle {} not found", state.vehicle_id);
            error_response(StatusCode::NOT_FOUND, NOT_FOUND_DETAIL)
        }
    }
}

/// POST /start
/// Remote start with climate control
pub async fn start_vehicle(State(state): State<AppState>) -> Response {
    let manager = match connect(&state).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };

    info!("Starting vehicle...");
    let result = manager
        .start_climate(&state.vehicle_id, &remote_start_options())
        .await;

    action_result("start", result)
}

/// POST /stop
/// Stop remote climate; falls back to a climate-off request when the manager
/// has no stop command
pub async fn stop_vehicle(State(state): State<AppState>) -> Response {
    let manager = match connect(&state).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };

    info!("Stopping vehicle...");
    let result = match manager.stop_climate(&state.vehicle_id).await {
        Ok(()) => Ok("stop_climate"),
        Err(VehicleError::Unsupported(_)) => {
            warn!("stop_climate not available, sending climate off instead");
            let options = ClimateRequestOptions {
                climate: Some(false),
                ..Default::default()
            };
            manager
                .start_climate(&state.vehicle_id, &options)
                .await
                .map(|()| "climate_false")
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(method) => {
            info!("Vehicle stopped successfully with {}", method);
            (
                StatusCode::OK,
                Json(ActionResponse::success_with_method("stop", method)),
            )
                .into_response()
        }
        Err(e) => {
            error!("Error stopping vehicle: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// POST /lock
pub async fn lock_vehicle(State(state): State<AppState>) -> Response {
    let manager = match connect(&state).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };

    info!("Locking vehicle...");
    let result = manager.lock(&state.vehicle_id).await;

    action_result("lock", result)
}

/// POST /unlock
pub async fn unlock_vehicle(State(state): State<AppState>) -> Response {
    let manager = match connect(&state).await {
        Ok(manager) => manager,
        Err(response) => return response,
    };

    info!("Unlocking vehicle...");
    let result = manager.unlock(&state.vehicle_id).await;

    action_result("unlock", result)
}
