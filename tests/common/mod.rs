// Test doubles for the vehicle manager
//
// FakeFactory counts how many managers it builds; each FakeManager records
// the calls it receives so tests can assert on exactly what was submitted.
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use bluelink_control::{
    create_router, AppState, Brand, ClimateRequestOptions, Credentials, ManagerFactory,
    ManagerProvider, Region, Vehicle, VehicleError, VehicleManager,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

pub const VEHICLE_ID: &str = "veh-1";

/// How a fake manager behaves
#[derive(Debug, Clone)]
pub struct Behavior {
    pub fail_auth: bool,
    pub fail_commands: bool,
    pub supports_stop: bool,
    pub auth_delay: Duration,
    pub vehicles: Vec<Vehicle>,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            fail_auth: false,
            fail_commands: false,
            supports_stop: true,
            auth_delay: Duration::ZERO,
            vehicles: vec![sample_vehicle(VEHICLE_ID)],
        }
    }
}

pub fn sample_vehicle(id: &str) -> Vehicle {
    Vehicle {
        id: id.to_string(),
        name: "Daily".to_string(),
        model: "KONA".to_string(),
        odometer: Some(12345.5),
        is_locked: true,
        engine_is_running: false,
        air_temperature: Some(21.0),
        last_updated_at: Some(Utc.with_ymd_and_hms(2024, 1, 15, 8, 30, 0).unwrap()),
    }
}

pub struct FakeManager {
    behavior: Behavior,
    pub token_checks: AtomicUsize,
    pub syncs: AtomicUsize,
    pub climate_requests: Mutex<Vec<(String, ClimateRequestOptions)>>,
    pub commands: Mutex<Vec<(String, String)>>,
}

impl FakeManager {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            token_checks: AtomicUsize::new(0),
            syncs: AtomicUsize::new(0),
            climate_requests: Mutex::new(Vec::new()),
            commands: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, command: &str, vehicle_id: &str) -> Result<(), VehicleError> {
        self.commands
            .lock()
            .unwrap()
            .push((command.to_string(), vehicle_id.to_string()));

        if self.behavior.fail_commands {
            return Err(VehicleError::Api {
                code: "9999".to_string(),
                message: "Vehicle is unreachable".to_string(),
            });
        }
        Ok(())
    }

    pub fn recorded_commands(&self) -> Vec<String> {
        self.commands
            .lock()
            .unwrap()
            .iter()
            .map(|(command, _)| command.clone())
            .collect()
    }
}

#[async_trait]
impl VehicleManager for FakeManager {
    async fn check_and_refresh_token(&self) -> Result<(), VehicleError> {
        self.token_checks.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.behavior.auth_delay).await;

        if self.behavior.fail_auth {
            return Err(VehicleError::Auth("Invalid credentials".to_string()));
        }
        Ok(())
    }

    async fn update_all_vehicles_with_cached_state(&self) -> Result<(), VehicleError> {
        self.syncs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn vehicle(&self, vehicle_id: &str) -> Option<Vehicle> {
        self.behavior
            .vehicles
            .iter()
            .find(|v| v.id == vehicle_id)
            .cloned()
    }

    async fn start_climate(
        &self,
        vehicle_id: &str,
        options: &ClimateRequestOptions,
    ) -> Result<(), VehicleError> {
        self.climate_requests
            .lock()
            .unwrap()
            .push((vehicle_id.to_string(), options.clone()));
        self.record("start_climate", vehicle_id)
    }

    async fn stop_climate(&self, vehicle_id: &str) -> Result<(), VehicleError> {
        if !self.behavior.supports_stop {
            return Err(VehicleError::Unsupported("stop_climate"));
        }
        self.record("stop_climate", vehicle_id)
    }

    async fn lock(&self, vehicle_id: &str) -> Result<(), VehicleError> {
        self.record("lock", vehicle_id)
    }

    async fn unlock(&self, vehicle_id: &str) -> Result<(), VehicleError> {
        self.record("unlock", vehicle_id)
    }
}

pub struct FakeFactory {
    behavior: Behavior,
    pub created: AtomicUsize,
    pub managers: Mutex<Vec<Arc<FakeManager>>>,
}

impl FakeFactory {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            created: AtomicUsize::new(0),
            managers: Mutex::new(Vec::new()),
        })
    }

    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// The most recently built manager
    pub fn manager(&self) -> Arc<FakeManager> {
        Arc::clone(
            self.managers
                .lock()
                .unwrap()
                .last()
                .expect("no manager created"),
        )
    }
}

impl ManagerFactory for FakeFactory {
    fn create(
        &self,
        _region: Region,
        _brand: Brand,
        _credentials: Credentials,
    ) -> Result<Arc<dyn VehicleManager>, VehicleError> {
        self.created.fetch_add(1, Ordering::SeqCst);
        let manager = Arc::new(FakeManager::new(self.behavior.clone()));
        self.managers.lock().unwrap().push(Arc::clone(&manager));
        Ok(manager)
    }
}

pub fn credentials() -> Credentials {
    Credentials {
        username: "driver@example.com".to_string(),
        password: "secret".to_string(),
        pin: Some("1234".to_string()),
    }
}

pub fn provider(factory: Arc<FakeFactory>) -> Arc<ManagerProvider> {
    Arc::new(ManagerProvider::new(factory, "Canada", "Hyundai", credentials()))
}

pub fn router(provider: Arc<ManagerProvider>) -> Router {
    create_router(AppState::new(provider, VEHICLE_ID))
}

/// Send a request through the router and decode the JSON body
pub async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, body)
}
