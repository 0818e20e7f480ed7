use super::error::VehicleError;
use super::manager::VehicleManager;
use super::transport::Transport;
use super::types::{Brand, ClimateRequestOptions, Credentials, Vehicle};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

// Temperatures are sent as an index into a 0.5 degree table starting at
// 16C, hex-encoded with an `H` suffix ("1CH" = 30C).
const MIN_TEMP: f64 = 16.0;
const MAX_TEMP: f64 = 31.5;
const TEMP_STEP: f64 = 0.5;

const DEFAULT_SET_TEMP: f64 = 21.0;
const DEFAULT_DURATION_MINUTES: u32 = 5;

const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 60;

/// API host for a brand on the Canadian cloud
pub fn api_host(brand: Brand) -> &'static str {
    match brand {
        Brand::Hyundai => "mybluelink.ca",
        Brand::Kia => "kiaconnect.ca",
    }
}

struct Token {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    fn is_valid(&self) -> bool {
        Utc::now() + chrono::Duration::seconds(TOKEN_EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Client for the Canadian Bluelink (Hyundai) / UVO (Kia) cloud
pub struct CanadaClient {
    transport: Transport,
    base_url: String,
    credentials: Credentials,
    token: RwLock<Option<Token>>,
    vehicles: RwLock<HashMap<String, Vehicle>>,
}

impl CanadaClient {
    pub fn new(brand: Brand, credentials: Credentials, transport: Transport) -> Self {
        Self::with_base_url(
            format!("https://{}/tods/api/", api_host(brand)),
            credentials,
            transport,
        )
    }

    /// Point the client at a different API root (e.g. a local mock)
    pub fn with_base_url(
        base_url: impl Into<String>,
        credentials: Credentials,
        transport: Transport,
    ) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Self {
            transport,
            base_url,
            credentials,
            token: RwLock::new(None),
            vehicles: RwLock::new(HashMap::new()),
        }
    }

    async fn login(&self) -> Result<Token, VehicleError> {
        info!("Logging in to {} as {}", self.base_url, self.credentials.username);

        let body = json!({
            "loginId": self.credentials.username,
            "password": self.credentials.password,
        });

        let result: LoginResult = self
            .post("v2/login", &[], body)
            .await
            .map_err(|e| match e {
                VehicleError::Api { message, .. } => VehicleError::Auth(message),
                other => other,
            })?
            .ok_or_else(|| missing_result("v2/login"))?;

        let lifetime = result.token.expire_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);

        Ok(Token {
            access_token: result.token.access_token,
            expires_at: Utc::now() + chrono::Duration::seconds(lifetime),
        })
    }

    /// Current access token, logging in again when it is missing or expired
    async fn access_token(&self) -> Result<String, VehicleError> {
        {
            let token = self.token.read().await;
            if let Some(token) = token.as_ref().filter(|t| t.is_valid()) {
                return Ok(token.access_token.clone());
            }
        }

        let mut slot = self.token.write().await;
        // Another request may have logged in while we waited for the lock
        if let Some(token) = slot.as_ref().filter(|t| t.is_valid()) {
            return Ok(token.access_token.clone());
        }

        let token = self.login().await?;
        let access_token = token.access_token.clone();
        *slot = Some(token);

        Ok(access_token)
    }

    fn pin(&self) -> Result<&str, VehicleError> {
        self.credentials
            .pin
            .as_deref()
            .ok_or(VehicleError::PinRequired)
    }

    async fn fetch_odometer(
        &self,
        token: &str,
        vehicle_id: &str,
    ) -> Result<Option<f64>, VehicleError> {
        let result: Option<NextService> = self
            .post(
                "nxtsvc",
                &[("accessToken", token), ("vehicleId", vehicle_id)],
                json!({}),
            )
            .await?;

        Ok(result
            .and_then(|r| r.maintenance_info)
            .and_then(|m| m.current_odometer))
    }

    /// Run a PIN-authorized remote command
    async fn command(
        &self,
        endpoint: &str,
        vehicle_id: &str,
        mut body: Value,
    ) -> Result<(), VehicleError> {
        let pin = self.pin()?;
        let token = self.access_token().await?;

        let auth: PinAuth = self
            .post(
                "vrfypin",
                &[("accessToken", token.as_str()), ("vehicleId", vehicle_id)],
                json!({ "pin": pin }),
            )
            .await?
            .ok_or_else(|| missing_result("vrfypin"))?;

        body["pin"] = json!(pin);

        self.post::<Value>(
            endpoint,
            &[
                ("accessToken", token.as_str()),
                ("vehicleId", vehicle_id),
                ("pAuth", auth.p_auth.as_str()),
            ],
            body,
        )
        .await?;

        debug!("Command {} accepted for vehicle {}", endpoint, vehicle_id);
        Ok(())
    }

    async fn post<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        headers: &[(&'static str, &str)],
        body: Value,
    ) -> Result<Option<T>, VehicleError> {
        let url = format!("{}{}", self.base_url, endpoint);

        let mut request = self
            .transport
            .request(Method::POST, &url)
            .header("from", "SPA")
            .header("language", "0")
            .header("offset", "-5");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = self.transport.send(request.json(&body)).await?;
        let status = response.status();
        let text = response.text().await?;

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                VehicleError::Parse(format!("{}: {}", endpoint, e))
            } else {
                VehicleError::Api {
                    code: status.as_u16().to_string(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string(),
                }
            }
        })?;

        if envelope.response_header.response_code != 0 {
            let error = envelope.error.unwrap_or_default();
            return Err(VehicleError::Api {
                code: error
                    .error_code
                    .unwrap_or_else(|| envelope.response_header.response_code.to_string()),
                message: error
                    .error_desc
                    .unwrap_or_else(|| "request failed".to_string()),
            });
        }

        Ok(envelope.result)
    }
}

#[async_trait::async_trait]
impl VehicleManager for CanadaClient {
    async fn check_and_refresh_token(&self) -> Result<(), VehicleError> {
        self.access_token().await.map(|_| ())
    }

    async fn update_all_vehicles_with_cached_state(&self) -> Result<(), VehicleError> {
        let token = self.access_token().await?;

        let list: VehicleList = self
            .post("vhcllst", &[("accessToken", token.as_str())], json!({}))
            .await?
            .ok_or_else(|| missing_result("vhcllst"))?;

        let mut synced = HashMap::with_capacity(list.vehicles.len());
        for entry in list.vehicles {
            let state: StatusResult = self
                .post(
                    "lstvhclsts",
                    &[
                        ("accessToken", token.as_str()),
                        ("vehicleId", entry.vehicle_id.as_str()),
                    ],
                    json!({}),
                )
                .await?
                .ok_or_else(|| missing_result("lstvhclsts"))?;

            let odometer = match self.fetch_odometer(&token, &entry.vehicle_id).await {
                Ok(odometer) => odometer,
                Err(e) => {
                    warn!("Odometer unavailable for {}: {}", entry.vehicle_id, e);
                    None
                }
            };

            let vehicle = entry.into_vehicle(state.status, odometer);
            synced.insert(vehicle.id.clone(), vehicle);
        }

        info!("Synced cached state for {} vehicle(s)", synced.len());
        *self.vehicles.write().await = synced;

        Ok(())
    }

    async fn vehicle(&self, vehicle_id: &str) -> Option<Vehicle> {
        self.vehicles.read().await.get(vehicle_id).cloned()
    }

    async fn start_climate(
        &self,
        vehicle_id: &str,
        options: &ClimateRequestOptions,
    ) -> Result<(), VehicleError> {
        self.command("rmtstrt", vehicle_id, climate_payload(options))
            .await
    }

    async fn stop_climate(&self, vehicle_id: &str) -> Result<(), VehicleError> {
        self.command("rmtstp", vehicle_id, json!({})).await
    }

    async fn lock(&self, vehicle_id: &str) -> Result<(), VehicleError> {
        self.command("drlck", vehicle_id, json!({})).await
    }

    async fn unlock(&self, vehicle_id: &str) -> Result<(), VehicleError> {
        self.command("drulck", vehicle_id, json!({})).await
    }
}

fn missing_result(endpoint: &str) -> VehicleError {
    VehicleError::Parse(format!("{}: response has no result", endpoint))
}

/// Remote start body (the PIN is added by [`CanadaClient::command`])
fn climate_payload(options: &ClimateRequestOptions) -> Value {
    let set_temp = options.set_temp.unwrap_or(DEFAULT_SET_TEMP);

    // No separate steering-wheel field here: heating1 drives all heated
    // accessories, steering wheel included.
    json!({
        "setting": {
            "airCtrl": u8::from(options.climate.unwrap_or(true)),
            "defrost": options.defrost.unwrap_or(false),
            "heating1": options.heating.unwrap_or(0),
            "igniOnDuration": options.duration.unwrap_or(DEFAULT_DURATION_MINUTES),
            "ims": 0,
            "airTemp": {
                "value": temperature_code(set_temp),
                "unit": 0,
                "hvacTempType": 1,
            },
            "seatHeaterVentCMD": {
                "drvSeatOptCmd": options.front_left_seat.unwrap_or(0),
                "astSeatOptCmd": options.front_right_seat.unwrap_or(0),
            },
        }
    })
}

fn temperature_code(celsius: f64) -> String {
    let clamped = celsius.clamp(MIN_TEMP, MAX_TEMP);
    let index = ((clamped - MIN_TEMP) / TEMP_STEP).round() as u8;
    format!("{:02X}H", index)
}

fn temperature_from_code(code: &str) -> Option<f64> {
    let index = u8::from_str_radix(code.strip_suffix('H')?, 16).ok()?;
    let celsius = MIN_TEMP + f64::from(index) * TEMP_STEP;
    (celsius <= MAX_TEMP).then_some(celsius)
}

/// `lastStatusDate` is `YYYYMMDDhhmmss` in UTC
fn parse_status_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S")
        .ok()
        .map(|naive| naive.and_utc())
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Envelope<T> {
    response_header: ResponseHeader,
    result: Option<T>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseHeader {
    response_code: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: Option<String>,
    error_desc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginResult {
    token: LoginToken,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginToken {
    access_token: String,
    expire_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PinAuth {
    p_auth: String,
}

#[derive(Debug, Deserialize)]
struct VehicleList {
    #[serde(default)]
    vehicles: Vec<VehicleEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VehicleEntry {
    vehicle_id: String,
    nick_name: Option<String>,
    model_name: Option<String>,
}

impl VehicleEntry {
    fn into_vehicle(self, status: CachedStatus, odometer: Option<f64>) -> Vehicle {
        let model = self.model_name.unwrap_or_default();
        Vehicle {
            name: self.nick_name.unwrap_or_else(|| model.clone()),
            model,
            id: self.vehicle_id,
            odometer,
            is_locked: status.door_lock.unwrap_or(false),
            engine_is_running: status.engine.unwrap_or(false),
            air_temperature: status
                .air_temp
                .and_then(|t| t.value)
                .as_deref()
                .and_then(temperature_from_code),
            last_updated_at: status.last_status_date.as_deref().and_then(parse_status_date),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    status: CachedStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedStatus {
    last_status_date: Option<String>,
    door_lock: Option<bool>,
    engine: Option<bool>,
    air_temp: Option<AirTemp>,
}

#[derive(Debug, Deserialize)]
struct AirTemp {
    value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NextService {
    maintenance_info: Option<MaintenanceInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaintenanceInfo {
    current_odometer: Option<f64>,
}
