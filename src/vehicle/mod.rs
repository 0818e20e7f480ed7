//! Vehicle telematics client
//!
//! Handlers only see the [`VehicleManager`] trait. The concrete client talks
//! to the Canadian Bluelink/UVO cloud through a [`Transport`] that flags
//! bot-protection blocks.

pub mod canada;
pub mod error;
pub mod manager;
pub mod transport;
pub mod types;

pub use canada::CanadaClient;
pub use error::VehicleError;
pub use manager::{BluelinkFactory, ManagerFactory, VehicleManager};
pub use transport::Transport;
pub use types::{Brand, ClimateRequestOptions, Credentials, Region, Vehicle};
