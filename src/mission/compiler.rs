//! Flight-plan compiler.
//!
//! Turns the tool calls of one chat turn into the ordered command list the
//! drone executes: `takeoff`, then `goto` / `circle` / `capture` per resolved
//! site in lookup order, then `rth` and `land`. Compilation is pure; the same
//! records always give the same plan, ids included.

use crate::drone::{DroneCommand, FlightAction};
use crate::mission::record::ToolCallRecord;
use crate::tools::args::{ReconArgs, SiteLookupArgs};
use crate::tools::executor::METERS_PER_DEGREE;
use crate::tools::types::{Coordinates, ReconPlan};
use crate::tools::ToolName;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const DEFAULT_CRUISE_ALT_M: f64 = 50.0;
const DEFAULT_SPEED_MPS: f64 = 5.0;
const DEFAULT_ORBIT_RADIUS_M: f64 = 200.0;

/// Max lat/lon difference (degrees) for a recon plan to belong to a site.
pub const PLAN_MATCH_TOLERANCE_DEG: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    #[default]
    Pending,
    Executing,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightCommand {
    pub id: String,
    pub action: FlightAction,
    #[serde(default = "empty_object")]
    pub parameters: Value,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: CommandStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl FlightCommand {
    fn new(seq: usize, action: FlightAction, parameters: Value, description: String) -> Self {
        Self {
            id: format!("cmd_{}", seq),
            action,
            parameters,
            description,
            status: CommandStatus::Pending,
            result: None,
        }
    }

    /// The drone endpoint requires an object; `null` parameters go out as `{}`.
    pub fn to_drone_command(&self) -> DroneCommand {
        let parameters = match &self.parameters {
            Value::Null => empty_object(),
            other => other.clone(),
        };
        DroneCommand::with_id(self.id.clone(), self.action, parameters)
    }
}

fn empty_object() -> Value {
    json!({})
}

/// Baseline fields the compiler reads; anything missing falls back to defaults.
#[derive(Debug, Default, Deserialize)]
struct BaselineFields {
    #[serde(default)]
    cruise_alt: Option<f64>,
    #[serde(default)]
    speed: Option<f64>,
}

struct ResolvedSite {
    name: String,
    coords: Coordinates,
}

struct PlannedRecon {
    args: ReconArgs,
    plan: Option<ReconPlan>,
}

impl PlannedRecon {
    fn targets(&self, coords: Coordinates) -> bool {
        (self.args.lat - coords.lat).abs() < PLAN_MATCH_TOLERANCE_DEG
            && (self.args.lon - coords.lon).abs() < PLAN_MATCH_TOLERANCE_DEG
    }

    /// Distance from the target to the first waypoint, else the declared radius.
    fn orbit_radius(&self, target: Coordinates) -> f64 {
        match self.plan.as_ref().and_then(|p| p.waypoints.first()) {
            Some(wp) => {
                let d_lat = (wp.lat - target.lat) * METERS_PER_DEGREE;
                let d_lon =
                    (wp.lon - target.lon) * METERS_PER_DEGREE * target.lat.to_radians().cos();
                (d_lat * d_lat + d_lon * d_lon).sqrt().round()
            }
            None => self.args.radius_m,
        }
    }
}

/// Compile the flight plan for one turn's tool calls.
///
/// Returns an empty plan unless at least one coordinate lookup and the
/// baseline-state lookup succeeded.
pub fn compile_flight_plan(records: &[ToolCallRecord]) -> Vec<FlightCommand> {
    let sites: Vec<ResolvedSite> = records
        .iter()
        .filter(|r| r.succeeded_as(ToolName::SiteCoordinates))
        .enumerate()
        .filter_map(|(i, r)| {
            let coords: Coordinates = r.payload()?;
            let name = r
                .arguments_as::<SiteLookupArgs>()
                .map(|a| a.site_name.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| format!("Site {}", i + 1));
            Some(ResolvedSite { name, coords })
        })
        .collect();

    let Some(baseline) = records
        .iter()
        .find(|r| r.succeeded_as(ToolName::BaselineState))
        .map(|r| r.payload::<BaselineFields>().unwrap_or_default())
    else {
        return Vec::new();
    };

    if sites.is_empty() {
        return Vec::new();
    }

    let recon: Vec<PlannedRecon> = records
        .iter()
        .filter(|r| r.succeeded_as(ToolName::ReconMission))
        .filter_map(|r| {
            Some(PlannedRecon {
                args: r.arguments_as()?,
                plan: r.payload(),
            })
        })
        .collect();

    let cruise_alt = baseline.cruise_alt.unwrap_or(DEFAULT_CRUISE_ALT_M);
    let speed = baseline.speed.unwrap_or(DEFAULT_SPEED_MPS);

    let mut commands = Vec::with_capacity(sites.len() * 3 + 3);
    let mut seq = 0;
    let mut push = |action: FlightAction, parameters: Value, description: String| {
        seq += 1;
        commands.push(FlightCommand::new(seq, action, parameters, description));
    };

    push(
        FlightAction::Takeoff,
        json!({ "alt_m": cruise_alt }),
        format!("Take off to {}m altitude", cruise_alt),
    );

    for site in &sites {
        let Coordinates { lat, lon } = site.coords;

        push(
            FlightAction::Goto,
            json!({ "lat": lat, "lon": lon, "alt_m": cruise_alt, "speed_mps": speed }),
            format!(
                "Fly to {} ({:.4}, {:.4}) at {}m",
                site.name, lat, lon, cruise_alt
            ),
        );

        let radius = recon
            .iter()
            .find(|p| p.targets(site.coords))
            .map(|p| p.orbit_radius(site.coords))
            .unwrap_or(DEFAULT_ORBIT_RADIUS_M);

        push(
            FlightAction::Circle,
            json!({
                "target_lat": lat,
                "target_lon": lon,
                "alt_m": cruise_alt,
                "radius_m": radius,
                "laps": 1,
            }),
            format!("Orbit {} (radius: {}m)", site.name, radius),
        );

        push(
            FlightAction::Capture,
            json!({ "type": "photo" }),
            format!("Capture a photo of {}", site.name),
        );
    }

    push(FlightAction::Rth, json!({}), "Return to home".to_string());
    push(FlightAction::Land, json!({}), "Land".to_string());

    tracing::debug!(
        sites = sites.len(),
        recon_plans = recon.len(),
        commands = commands.len(),
        "Flight plan compiled"
    );

    commands
}
