use super::canada::CanadaClient;
use super::error::VehicleError;
use super::transport::Transport;
use super::types::{Brand, ClimateRequestOptions, Credentials, Region, Vehicle};
use std::sync::Arc;

/// Authenticated session with the vehicle cloud
///
/// Implementations own their token lifecycle; callers never re-authenticate
/// explicitly after the initial `check_and_refresh_token`.
#[async_trait::async_trait]
pub trait VehicleManager: Send + Sync {
    /// Log in, or renew the session if the current token has expired
    async fn check_and_refresh_token(&self) -> Result<(), VehicleError>;

    /// Refresh every vehicle from the cloud's cached state (no wake-up)
    async fn update_all_vehicles_with_cached_state(&self) -> Result<(), VehicleError>;

    /// Look up a vehicle from the last sync
    async fn vehicle(&self, vehicle_id: &str) -> Option<Vehicle>;

    async fn start_climate(
        &self,
        vehicle_id: &str,
        options: &ClimateRequestOptions,
    ) -> Result<(), VehicleError>;

    /// Stop remote climate. Managers without a dedicated stop command keep
    /// this default and report it as unsupported.
    async fn stop_climate(&self, _vehicle_id: &str) -> Result<(), VehicleError> {
        Err(VehicleError::Unsupported("stop_climate"))
    }

    async fn lock(&self, vehicle_id: &str) -> Result<(), VehicleError>;

    async fn unlock(&self, vehicle_id: &str) -> Result<(), VehicleError>;
}

/// Builds vehicle managers for a region/brand pair
pub trait ManagerFactory: Send + Sync {
    fn create(
        &self,
        region: Region,
        brand: Brand,
        credentials: Credentials,
    ) -> Result<Arc<dyn VehicleManager>, VehicleError>;
}

/// Factory for the Bluelink/UVO cloud
///
/// Only the Canadian endpoints are implemented; other regions fail with
/// [`VehicleError::UnsupportedRegion`].
#[derive(Debug, Clone)]
pub struct BluelinkFactory {
    transport: Transport,
}

impl BluelinkFactory {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }
}

impl ManagerFactory for BluelinkFactory {
    fn create(
        &self,
        region: Region,
        brand: Brand,
        credentials: Credentials,
    ) -> Result<Arc<dyn VehicleManager>, VehicleError> {
        match region {
            Region::Canada => Ok(Arc::new(CanadaClient::new(
                brand,
                credentials,
                self.transport.clone(),
            ))),
            other => Err(VehicleError::UnsupportedRegion(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            username: "driver@example.com".to_string(),
            password: "secret".to_string(),
            pin: None,
        }
    }

    #[test]
    fn test_factory_builds_canadian_client() {
        let factory = BluelinkFactory::new(Transport::new().unwrap());
        assert!(factory
            .create(Region::Canada, Brand::Hyundai, credentials())
            .is_ok());
    }

    #[test]
    fn test_factory_rejects_unimplemented_regions() {
        let factory = BluelinkFactory::new(Transport::new().unwrap());

        for region in [Region::Usa, Region::Europe] {
            match factory.create(region, Brand::Kia, credentials()) {
                Err(VehicleError::UnsupportedRegion(r)) => assert_eq!(r, region),
                Err(e) => panic!("unexpected error: {}", e),
                Ok(_) => panic!("{} should not be supported", region),
            }
        }
    }
}
