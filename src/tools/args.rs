//! Validated argument records, one per tool.
//!
//! The LLM hands back a tool name and a loosely-typed JSON bag; [`ToolInvocation::parse`]
//! turns that pair into a closed set of variants so the executor never has to
//! inspect JSON at runtime. Serializing an argument record yields the
//! normalized parameter object forwarded to the drone (absent options omitted).

use crate::error::{AppError, Result};
use crate::tools::catalog::ToolName;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteLookupArgs {
    pub site_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconArgs {
    pub lat: f64,
    pub lon: f64,
    pub radius_m: f64,
    pub alt_m: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TakeOffArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_m: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrientationMode {
    None,
    ToTarget,
    HeadingStart,
    HeadingDuring,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoToArgs {
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_mps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation_mode: Option<OrientationMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircleDirection {
    #[serde(rename = "CW")]
    Clockwise,
    #[serde(rename = "CCW")]
    CounterClockwise,
    #[serde(rename = "default")]
    DroneDefault,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleArgs {
    pub target_lat: f64,
    pub target_lon: f64,
    pub alt_m: f64,
    pub radius_m: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laps: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<CircleDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    Photo,
    Video,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaptureArgs {
    #[serde(rename = "type")]
    pub kind: CaptureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_s: Option<f64>,
}

/// One validated tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolInvocation {
    SiteCoordinates(SiteLookupArgs),
    BaselineState,
    NoFlyZones,
    ReconMission(ReconArgs),
    TakeOff(TakeOffArgs),
    GoTo(GoToArgs),
    Circle(CircleArgs),
    Capture(CaptureArgs),
    ReturnToHome,
    Land,
    Status,
}

impl ToolInvocation {
    /// Validate `arguments` against the declared parameters of `name`.
    ///
    /// `null` is accepted as "no arguments". Unknown keys are ignored, the
    /// same way the schema declaration leaves `additionalProperties` open.
    pub fn parse(name: &str, arguments: &Value) -> Result<Self> {
        let tool = ToolName::from_wire(name)
            .ok_or_else(|| AppError::ValidationError(format!("Unknown tool: {}", name)))?;

        let invocation = match tool {
            ToolName::SiteCoordinates => {
                let args: SiteLookupArgs = decode(tool, arguments)?;
                if args.site_name.trim().is_empty() {
                    return Err(AppError::ValidationError(
                        "site_name cannot be empty".to_string(),
                    ));
                }
                Self::SiteCoordinates(args)
            }
            ToolName::BaselineState => {
                expect_object(tool, arguments)?;
                Self::BaselineState
            }
            ToolName::NoFlyZones => {
                expect_object(tool, arguments)?;
                Self::NoFlyZones
            }
            ToolName::ReconMission => Self::ReconMission(decode(tool, arguments)?),
            ToolName::TakeOff => Self::TakeOff(decode(tool, arguments)?),
            ToolName::GoTo => Self::GoTo(decode(tool, arguments)?),
            ToolName::Circle => Self::Circle(decode(tool, arguments)?),
            ToolName::Capture => Self::Capture(decode(tool, arguments)?),
            ToolName::ReturnToHome => {
                expect_object(tool, arguments)?;
                Self::ReturnToHome
            }
            ToolName::Land => {
                expect_object(tool, arguments)?;
                Self::Land
            }
            ToolName::Status => {
                expect_object(tool, arguments)?;
                Self::Status
            }
        };

        Ok(invocation)
    }

    pub fn name(&self) -> ToolName {
        match self {
            Self::SiteCoordinates(_) => ToolName::SiteCoordinates,
            Self::BaselineState => ToolName::BaselineState,
            Self::NoFlyZones => ToolName::NoFlyZones,
            Self::ReconMission(_) => ToolName::ReconMission,
            Self::TakeOff(_) => ToolName::TakeOff,
            Self::GoTo(_) => ToolName::GoTo,
            Self::Circle(_) => ToolName::Circle,
            Self::Capture(_) => ToolName::Capture,
            Self::ReturnToHome => ToolName::ReturnToHome,
            Self::Land => ToolName::Land,
            Self::Status => ToolName::Status,
        }
    }
}

/// Parse the `arguments` field of an LLM tool call, which providers send
/// either as a JSON-encoded string or as an inline object.
pub fn parse_raw_arguments(raw: &Value) -> Result<Value> {
    match raw {
        Value::String(s) if s.trim().is_empty() => Ok(Value::Object(Default::default())),
        Value::String(s) => serde_json::from_str(s)
            .map_err(|e| AppError::ValidationError(format!("Malformed tool arguments: {}", e))),
        other => Ok(other.clone()),
    }
}

fn decode<T: DeserializeOwned>(tool: ToolName, arguments: &Value) -> Result<T> {
    let value = if arguments.is_null() {
        Value::Object(Default::default())
    } else {
        arguments.clone()
    };
    serde_json::from_value(value)
        .map_err(|e| AppError::ValidationError(format!("Invalid arguments for {}: {}", tool, e)))
}

fn expect_object(tool: ToolName, arguments: &Value) -> Result<()> {
    if arguments.is_null() || arguments.is_object() {
        Ok(())
    } else {
        Err(AppError::ValidationError(format!(
            "Invalid arguments for {}: expected an object",
            tool
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::catalog::{ToolCatalog, CAPTURE_KINDS, CIRCLE_DIRECTIONS, ORIENTATION_MODES};
    use serde_json::json;

    #[test]
    fn test_parse_site_lookup() {
        let inv = ToolInvocation::parse("get_site_coordinates", &json!({"site_name": "Cattenom"}))
            .unwrap();
        assert_eq!(
            inv,
            ToolInvocation::SiteCoordinates(SiteLookupArgs {
                site_name: "Cattenom".to_string()
            })
        );
    }

    #[test]
    fn test_blank_site_name_is_rejected() {
        let err = ToolInvocation::parse("get_site_coordinates", &json!({"site_name": "   "}))
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_unknown_tool_is_rejected() {
        let err = ToolInvocation::parse("self_destruct", &json!({})).unwrap_err();
        assert!(err.message().contains("Unknown tool"));
    }

    #[test]
    fn test_recon_requires_all_numbers() {
        let err = ToolInvocation::parse(
            "plan_recon_mission",
            &json!({"lat": 47.9, "lon": 7.5, "radius_m": 200}),
        )
        .unwrap_err();
        assert!(err.message().contains("alt_m"));

        let err = ToolInvocation::parse(
            "plan_recon_mission",
            &json!({"lat": "north", "lon": 7.5, "radius_m": 200, "alt_m": 50}),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[test]
    fn test_null_arguments_mean_none() {
        assert_eq!(
            ToolInvocation::parse("take_off", &Value::Null).unwrap(),
            ToolInvocation::TakeOff(TakeOffArgs { alt_m: None })
        );
        assert_eq!(
            ToolInvocation::parse("land", &Value::Null).unwrap(),
            ToolInvocation::Land
        );
    }

    #[test]
    fn test_goto_serializes_only_supplied_fields() {
        let inv = ToolInvocation::parse(
            "go_to",
            &json!({"lat": 1.0, "lon": 2.0, "alt_m": 30, "orientation_mode": "TO_TARGET"}),
        )
        .unwrap();
        let ToolInvocation::GoTo(args) = inv else {
            panic!("expected go_to");
        };

        assert_eq!(
            serde_json::to_value(args).unwrap(),
            json!({"lat": 1.0, "lon": 2.0, "alt_m": 30.0, "orientation_mode": "TO_TARGET"})
        );
    }

    #[test]
    fn test_capture_type_field() {
        let inv = ToolInvocation::parse("capture", &json!({"type": "video", "duration_s": 10}))
            .unwrap();
        assert_eq!(
            inv,
            ToolInvocation::Capture(CaptureArgs {
                kind: CaptureKind::Video,
                duration_s: Some(10.0)
            })
        );
        assert!(ToolInvocation::parse("capture", &json!({"type": "thermal"})).is_err());
    }

    #[test]
    fn test_declared_enum_values_are_accepted() {
        for mode in ORIENTATION_MODES {
            let args = json!({"lat": 0, "lon": 0, "alt_m": 10, "orientation_mode": mode});
            assert!(ToolInvocation::parse("go_to", &args).is_ok(), "{}", mode);
        }
        for direction in CIRCLE_DIRECTIONS {
            let args = json!({
                "target_lat": 0, "target_lon": 0, "alt_m": 10, "radius_m": 50,
                "direction": direction
            });
            assert!(ToolInvocation::parse("circle", &args).is_ok(), "{}", direction);
        }
        for kind in CAPTURE_KINDS {
            assert!(ToolInvocation::parse("capture", &json!({ "type": kind })).is_ok());
        }
    }

    #[test]
    fn test_every_declared_tool_parses() {
        let catalog = ToolCatalog::standard();
        for def in catalog.definitions() {
            let result = ToolInvocation::parse(def.name.as_str(), &json!({}));
            let has_required = def.parameters.iter().any(|p| p.required);
            assert_eq!(result.is_err(), has_required, "{}", def.name);
            if let Ok(invocation) = result {
                assert_eq!(invocation.name(), def.name);
            }
        }
    }

    #[test]
    fn test_raw_arguments_string_or_object() {
        assert_eq!(
            parse_raw_arguments(&json!("{\"site_name\":\"gravelines\"}")).unwrap(),
            json!({"site_name": "gravelines"})
        );
        assert_eq!(
            parse_raw_arguments(&json!({"site_name": "gravelines"})).unwrap(),
            json!({"site_name": "gravelines"})
        );
        assert_eq!(parse_raw_arguments(&json!("")).unwrap(), json!({}));
        assert!(parse_raw_arguments(&json!("{not json")).is_err());
    }
}
