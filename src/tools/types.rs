//! Result payloads returned by the lookup and planning tools.

use serde::{Deserialize, Serialize};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HomePosition {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

/// Default home point, cruise altitude (m) and speed (m/s) assumed for a
/// mission when the user gives no explicit values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineState {
    pub home: HomePosition,
    pub cruise_alt: f64,
    pub speed: f64,
}

impl Default for BaselineState {
    fn default() -> Self {
        Self {
            home: HomePosition {
                lat: 48.8566,
                lon: 2.3522,
                alt: 0.0,
            },
            cruise_alt: 50.0,
            speed: 5.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
}

/// Ring of waypoints around a recon target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconPlan {
    pub waypoints: Vec<Waypoint>,
}

/// A closed polygon the drone must stay out of.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoFlyZone {
    pub name: String,
    pub polygon: Vec<Coordinates>,
}
