pub mod config;
pub mod http;
pub mod logging;
pub mod manager;
pub mod vehicle;

pub use config::{Config, ConfigError};
pub use http::{create_router, AppState};
pub use manager::ManagerProvider;
pub use vehicle::{
    BluelinkFactory, Brand, CanadaClient, ClimateRequestOptions, Credentials, ManagerFactory,
    Region, Transport, Vehicle, VehicleError, VehicleManager,
};
