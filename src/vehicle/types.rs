use chrono::{DateTime, Utc};
use std::fmt;

/// Regional service endpoint the manager talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    Europe,
    Canada,
    Usa,
}

// Accepted configuration names. Lookup is exact-match.
const REGIONS: &[(&str, Region)] = &[
    ("US", Region::Usa),
    ("Canada", Region::Canada),
    ("Europe", Region::Europe),
];

impl Region {
    pub fn from_name(name: &str) -> Option<Self> {
        REGIONS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, region)| *region)
    }

    /// Numeric region identifier used by the Bluelink/UVO cloud
    pub fn id(self) -> u8 {
        match self {
            Region::Europe => 1,
            Region::Canada => 2,
            Region::Usa => 3,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Region::Europe => "Europe",
            Region::Canada => "Canada",
            Region::Usa => "USA",
        };
        f.write_str(name)
    }
}

/// Vehicle manufacturer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Brand {
    Kia,
    Hyundai,
}

const BRANDS: &[(&str, Brand)] = &[("Hyundai", Brand::Hyundai), ("Kia", Brand::Kia)];

impl Brand {
    pub fn from_name(name: &str) -> Option<Self> {
        BRANDS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, brand)| *brand)
    }

    pub fn id(self) -> u8 {
        match self {
            Brand::Kia => 1,
            Brand::Hyundai => 2,
        }
    }
}

impl fmt::Display for Brand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Brand::Kia => "Kia",
            Brand::Hyundai => "Hyundai",
        };
        f.write_str(name)
    }
}

/// Account credentials handed to the vehicle manager
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Required by the cloud for remote commands, not for reading state
    pub pin: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Last known state of a vehicle as synced from the cloud cache
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: String,
    pub name: String,
    pub model: String,
    /// Kilometres
    pub odometer: Option<f64>,
    pub is_locked: bool,
    pub engine_is_running: bool,
    /// Degrees Celsius
    pub air_temperature: Option<f64>,
    pub last_updated_at: Option<DateTime<Utc>>,
}

/// Remote climate request. Unset fields fall back to the client's defaults,
/// so `ClimateRequestOptions { climate: Some(false), ..Default::default() }`
/// is a plain "climate off" request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClimateRequestOptions {
    /// Target cabin temperature in degrees Celsius
    pub set_temp: Option<f64>,
    /// Engine-on duration in minutes
    pub duration: Option<u32>,
    pub defrost: Option<bool>,
    pub climate: Option<bool>,
    /// Heating accessory level (rear window / mirrors / steering wheel)
    pub heating: Option<u8>,
    /// Seat command level, 0 off through 8 high heat
    pub front_left_seat: Option<u8>,
    pub front_right_seat: Option<u8>,
    pub steering_wheel: Option<u8>,
}
