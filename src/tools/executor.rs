//! Executes one validated tool call.
//!
//! Lookups and planning are answered locally; flight primitives are forwarded
//! to the drone endpoint. Every failure comes back as an [`AppError`] so the
//! orchestrator can fold it into a `{error}` result for the LLM.

use crate::drone::{DroneCommand, DroneEndpoint, FlightAction};
use crate::error::{AppError, Result};
use crate::tools::args::{ReconArgs, ToolInvocation};
use crate::tools::sites::SiteDirectory;
use crate::tools::types::{BaselineState, NoFlyZone, ReconPlan, Waypoint};
use serde::Serialize;
use serde_json::{json, Value};
use std::f64::consts::PI;
use std::sync::Arc;

/// Meters per degree of latitude in the flat-earth approximation.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Number of waypoints on a recon ring.
const RECON_WAYPOINTS: usize = 3;

pub struct ToolExecutor {
    sites: Arc<dyn SiteDirectory>,
    drone: Arc<dyn DroneEndpoint>,
}

impl ToolExecutor {
    pub fn new(sites: Arc<dyn SiteDirectory>, drone: Arc<dyn DroneEndpoint>) -> Self {
        Self { sites, drone }
    }

    /// Validate `arguments` for tool `name` and run it.
    pub async fn execute(&self, name: &str, arguments: &Value) -> Result<Value> {
        let invocation = ToolInvocation::parse(name, arguments)?;
        tracing::debug!(tool = %invocation.name(), "Running tool");
        self.run(invocation).await
    }

    pub async fn run(&self, invocation: ToolInvocation) -> Result<Value> {
        match invocation {
            ToolInvocation::SiteCoordinates(args) => {
                let coords = self.sites.resolve(&args.site_name).ok_or_else(|| {
                    AppError::DataUnavailableError(format!(
                        "Site \"{}\" not found in the site database",
                        args.site_name
                    ))
                })?;
                to_json(&coords)
            }
            ToolInvocation::BaselineState => to_json(&BaselineState::default()),
            ToolInvocation::NoFlyZones => to_json(&no_fly_zones()),
            ToolInvocation::ReconMission(args) => to_json(&plan_recon_waypoints(&args)),
            ToolInvocation::TakeOff(args) => self.forward(FlightAction::Takeoff, &args).await,
            ToolInvocation::GoTo(args) => self.forward(FlightAction::Goto, &args).await,
            ToolInvocation::Circle(args) => self.forward(FlightAction::Circle, &args).await,
            ToolInvocation::Capture(args) => self.forward(FlightAction::Capture, &args).await,
            ToolInvocation::ReturnToHome => self.forward(FlightAction::Rth, &json!({})).await,
            ToolInvocation::Land => self.forward(FlightAction::Land, &json!({})).await,
            ToolInvocation::Status => self.forward(FlightAction::Status, &json!({})).await,
        }
    }

    async fn forward<P: Serialize>(&self, action: FlightAction, params: &P) -> Result<Value> {
        let command = DroneCommand::new(action, to_json(params)?);
        self.drone.execute(&command).await
    }
}

/// No-fly zones known to the planner.
///
/// Stub: no zone source is wired in yet, so the list is always empty and
/// places no constraint on the compiled plan.
pub fn no_fly_zones() -> Vec<NoFlyZone> {
    Vec::new()
}

/// Three waypoints evenly spaced (0°, 120°, 240°) on a circle of `radius_m`
/// around the target, each at `alt_m`.
///
/// Uses a flat-earth meters-to-degrees conversion: fine at mid-latitudes,
/// wrong near the poles and across the antimeridian.
pub fn plan_recon_waypoints(args: &ReconArgs) -> ReconPlan {
    let radius_deg = args.radius_m / METERS_PER_DEGREE;
    let lat_scale = (args.lat * PI / 180.0).cos();

    let waypoints = (0..RECON_WAYPOINTS)
        .map(|i| {
            let angle = i as f64 * 2.0 * PI / RECON_WAYPOINTS as f64;
            Waypoint {
                lat: args.lat + radius_deg * angle.cos(),
                lon: args.lon + radius_deg * angle.sin() / lat_scale,
                alt: args.alt_m,
            }
        })
        .collect();

    ReconPlan { waypoints }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| AppError::ValidationError(format!("Failed to encode tool payload: {}", e)))
}
