//! Process-wide vehicle manager handle
//!
//! The handle is created lazily (or eagerly at startup), authenticated once and
//! then shared by every request. Creation runs behind a single-initialization
//! cell: concurrent first callers wait for the same attempt instead of logging
//! in twice. A failed attempt leaves the cell empty so the next call retries.

use crate::config::Config;
use crate::vehicle::{Brand, Credentials, ManagerFactory, Region, VehicleError, VehicleManager};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{error, info};

pub struct ManagerProvider {
    factory: Arc<dyn ManagerFactory>,
    region: String,
    brand: String,
    credentials: Credentials,
    handle: OnceCell<Arc<dyn VehicleManager>>,
}

impl ManagerProvider {
    pub fn new(
        factory: Arc<dyn ManagerFactory>,
        region: impl Into<String>,
        brand: impl Into<String>,
        credentials: Credentials,
    ) -> Self {
        Self {
            factory,
            region: region.into(),
            brand: brand.into(),
            credentials,
            handle: OnceCell::new(),
        }
    }

    pub fn from_config(config: &Config, factory: Arc<dyn ManagerFactory>) -> Self {
        Self::new(
            factory,
            config.region.clone(),
            config.brand.clone(),
            Credentials {
                username: config.username.clone(),
                password: config.password.clone(),
                pin: config.pin.clone(),
            },
        )
    }

    /// Return the cached handle, creating and authenticating it first if needed
    pub async fn get(&self) -> Result<Arc<dyn VehicleManager>, VehicleError> {
        self.handle
            .get_or_try_init(|| async {
                self.initialize().await.map_err(|e| {
                    error!("Failed to initialize vehicle manager: {}", e);
                    e
                })
            })
            .await
            .map(Arc::clone)
    }

    pub fn is_initialized(&self) -> bool {
        self.handle.initialized()
    }

    async fn initialize(&self) -> Result<Arc<dyn VehicleManager>, VehicleError> {
        let region = Region::from_name(&self.region)
            .ok_or_else(|| VehicleError::UnknownRegion(self.region.clone()))?;
        let brand = Brand::from_name(&self.brand)
            .ok_or_else(|| VehicleError::UnknownBrand(self.brand.clone()))?;

        info!(
            "Connecting vehicle manager (region={} [{}], brand={} [{}])",
            region,
            region.id(),
            brand,
            brand.id()
        );

        let manager = self.factory.create(region, brand, self.credentials.clone())?;
        manager.check_and_refresh_token().await?;
        manager.update_all_vehicles_with_cached_state().await?;

        info!("Vehicle manager initialized successfully");
        Ok(manager)
    }
}
