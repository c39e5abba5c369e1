//! Drone command endpoint: wire types, capability trait and HTTP client.

pub mod client;
pub mod command;

pub use client::HttpDroneClient;
pub use command::{DroneCommand, DroneEndpoint, FlightAction};
