//! The fixed set of tools offered to the LLM.
//!
//! Each tool is declared once with a parameter table; the JSON schema sent to
//! the model is generated from that table, and the matching argument record in
//! [`crate::tools::args`] is what the executor validates against. Keep the two
//! in sync when adding a parameter.

use serde::Serialize;
use serde_json::{json, Map, Value};

/// Wire names of every tool the executor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    SiteCoordinates,
    BaselineState,
    NoFlyZones,
    ReconMission,
    TakeOff,
    GoTo,
    Circle,
    Capture,
    ReturnToHome,
    Land,
    Status,
}

impl ToolName {
    pub const ALL: [ToolName; 11] = [
        ToolName::SiteCoordinates,
        ToolName::BaselineState,
        ToolName::NoFlyZones,
        ToolName::ReconMission,
        ToolName::TakeOff,
        ToolName::GoTo,
        ToolName::Circle,
        ToolName::Capture,
        ToolName::ReturnToHome,
        ToolName::Land,
        ToolName::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::SiteCoordinates => "get_site_coordinates",
            ToolName::BaselineState => "get_baseline_state",
            ToolName::NoFlyZones => "get_no_fly_zones",
            ToolName::ReconMission => "plan_recon_mission",
            ToolName::TakeOff => "take_off",
            ToolName::GoTo => "go_to",
            ToolName::Circle => "circle",
            ToolName::Capture => "capture",
            ToolName::ReturnToHome => "return_to_home",
            ToolName::Land => "land",
            ToolName::Status => "get_status",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.as_str() == name)
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Number,
    String,
    Enum(&'static [&'static str]),
}

#[derive(Debug, Clone, Copy)]
pub struct Parameter {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
}

const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Parameter {
    Parameter {
        name,
        kind,
        required: true,
        description,
    }
}

const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Parameter {
    Parameter {
        name,
        kind,
        required: false,
        description,
    }
}

pub const ORIENTATION_MODES: &[&str] = &["NONE", "TO_TARGET", "HEADING_START", "HEADING_DURING"];
pub const CIRCLE_DIRECTIONS: &[&str] = &["CW", "CCW", "default"];
pub const CAPTURE_KINDS: &[&str] = &["photo", "video"];

#[derive(Debug, Clone, Copy)]
pub struct ToolDefinition {
    pub name: ToolName,
    pub description: &'static str,
    pub parameters: &'static [Parameter],
}

impl ToolDefinition {
    /// JSON schema object for the tool's arguments.
    ///
    /// `required` is omitted entirely for parameterless tools; some providers
    /// reject an empty array.
    pub fn parameter_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for param in self.parameters {
            let mut prop = match param.kind {
                ParamKind::Number => json!({ "type": "number" }),
                ParamKind::String => json!({ "type": "string" }),
                ParamKind::Enum(values) => json!({ "type": "string", "enum": values }),
            };
            prop["description"] = Value::String(param.description.to_string());
            properties.insert(param.name.to_string(), prop);

            if param.required {
                required.push(Value::String(param.name.to_string()));
            }
        }

        let mut schema = json!({
            "type": "object",
            "properties": properties,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }

    /// OpenAI-style `{"type": "function", "function": {...}}` declaration.
    pub fn to_llm_tool(&self) -> Value {
        json!({
            "type": "function",
            "function": {
                "name": self.name.as_str(),
                "description": self.description,
                "parameters": self.parameter_schema(),
            }
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ToolSummary {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// Immutable tool registry built once at startup.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    definitions: Vec<ToolDefinition>,
    llm_tools: Vec<Value>,
}

impl ToolCatalog {
    pub fn new(definitions: Vec<ToolDefinition>) -> Self {
        let llm_tools = definitions.iter().map(ToolDefinition::to_llm_tool).collect();
        Self {
            definitions,
            llm_tools,
        }
    }

    /// The drone-mission tool set.
    pub fn standard() -> Self {
        Self::new(STANDARD_TOOLS.to_vec())
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn get(&self, name: ToolName) -> Option<&ToolDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    /// Declarations in the shape the chat-completions API expects.
    pub fn llm_tools(&self) -> &[Value] {
        &self.llm_tools
    }

    pub fn summaries(&self) -> Vec<ToolSummary> {
        self.definitions
            .iter()
            .map(|d| ToolSummary {
                name: d.name.as_str(),
                description: d.description,
                parameters: d.parameter_schema(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

const STANDARD_TOOLS: [ToolDefinition; 11] = [
    ToolDefinition {
        name: ToolName::SiteCoordinates,
        description: "Resolve the name of a site or power plant to GPS coordinates (latitude, longitude).",
        parameters: &[required(
            "site_name",
            ParamKind::String,
            "Name of the site or plant to locate",
        )],
    },
    ToolDefinition {
        name: ToolName::BaselineState,
        description: "Get the drone's default parameters: home position, cruise altitude and speed.",
        parameters: &[],
    },
    ToolDefinition {
        name: ToolName::NoFlyZones,
        description: "List the no-fly zones (polygons) the flight must avoid.",
        parameters: &[],
    },
    ToolDefinition {
        name: ToolName::ReconMission,
        description: "Plan a reconnaissance mission: waypoints on a ring around a target. Call it for every site once its coordinates and the baseline state are known. Use a 200 m radius unless told otherwise.",
        parameters: &[
            required("lat", ParamKind::Number, "Target latitude"),
            required("lon", ParamKind::Number, "Target longitude"),
            required("radius_m", ParamKind::Number, "Survey radius in meters"),
            required("alt_m", ParamKind::Number, "Survey altitude in meters"),
        ],
    },
    ToolDefinition {
        name: ToolName::TakeOff,
        description: "Take off to the given altitude, or the default altitude when omitted.",
        parameters: &[optional(
            "alt_m",
            ParamKind::Number,
            "Takeoff altitude in meters (optional)",
        )],
    },
    ToolDefinition {
        name: ToolName::GoTo,
        description: "Fly the drone to a GPS point (latitude, longitude, altitude).",
        parameters: &[
            required("lat", ParamKind::Number, "Destination latitude"),
            required("lon", ParamKind::Number, "Destination longitude"),
            required("alt_m", ParamKind::Number, "Altitude in meters"),
            optional("speed_mps", ParamKind::Number, "Speed in meters per second (optional)"),
            optional(
                "orientation_mode",
                ParamKind::Enum(ORIENTATION_MODES),
                "NONE (keep heading), TO_TARGET (face the target), HEADING_START (turn before leaving), HEADING_DURING (turn while flying)",
            ),
            optional(
                "heading",
                ParamKind::Number,
                "Heading in degrees (0-359, 0=North, 90=East), used with HEADING_START or HEADING_DURING",
            ),
        ],
    },
    ToolDefinition {
        name: ToolName::Circle,
        description: "Orbit around a target. Direction: CW (clockwise), CCW (counter-clockwise) or default (drone default).",
        parameters: &[
            required("target_lat", ParamKind::Number, "Target latitude"),
            required("target_lon", ParamKind::Number, "Target longitude"),
            required("alt_m", ParamKind::Number, "Altitude in meters"),
            required("radius_m", ParamKind::Number, "Orbit radius in meters"),
            optional("laps", ParamKind::Number, "Number of laps (optional)"),
            optional(
                "direction",
                ParamKind::Enum(CIRCLE_DIRECTIONS),
                "Orbit direction: CW, CCW or default",
            ),
        ],
    },
    ToolDefinition {
        name: ToolName::Capture,
        description: "Take a photo or start recording a video.",
        parameters: &[
            required("type", ParamKind::Enum(CAPTURE_KINDS), "Capture type: photo or video"),
            optional("duration_s", ParamKind::Number, "Video duration in seconds (optional)"),
        ],
    },
    ToolDefinition {
        name: ToolName::ReturnToHome,
        description: "Return the drone to its home position.",
        parameters: &[],
    },
    ToolDefinition {
        name: ToolName::Land,
        description: "Land the drone.",
        parameters: &[],
    },
    ToolDefinition {
        name: ToolName::Status,
        description: "Get the drone's current state (flight state, battery, GPS position, message).",
        parameters: &[],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_covers_every_tool_once() {
        let catalog = ToolCatalog::standard();
        assert_eq!(catalog.len(), ToolName::ALL.len());
        for name in ToolName::ALL {
            assert!(catalog.get(name).is_some(), "missing {}", name);
        }
    }

    #[test]
    fn test_wire_names_round_trip() {
        for name in ToolName::ALL {
            assert_eq!(ToolName::from_wire(name.as_str()), Some(name));
        }
        assert_eq!(ToolName::from_wire("getCoordonnees"), None);
    }

    #[test]
    fn test_schema_marks_required_params() {
        let catalog = ToolCatalog::standard();
        let schema = catalog.get(ToolName::GoTo).unwrap().parameter_schema();

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["lat", "lon", "alt_m"]));
        assert_eq!(schema["properties"]["speed_mps"]["type"], "number");
        assert_eq!(
            schema["properties"]["orientation_mode"]["enum"],
            json!(["NONE", "TO_TARGET", "HEADING_START", "HEADING_DURING"])
        );
    }

    #[test]
    fn test_parameterless_tool_omits_required() {
        let catalog = ToolCatalog::standard();
        let schema = catalog.get(ToolName::Land).unwrap().parameter_schema();

        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn test_llm_tool_shape() {
        let catalog = ToolCatalog::standard();
        let tool = &catalog.llm_tools()[0];

        assert_eq!(tool["type"], "function");
        assert_eq!(tool["function"]["name"], "get_site_coordinates");
        assert_eq!(tool["function"]["parameters"]["required"], json!(["site_name"]));
    }
}
