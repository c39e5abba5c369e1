//! Where a mission request stands, judged from the tool calls made so far.

use crate::mission::record::ToolCallRecord;
use crate::tools::ToolName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissionStage {
    /// No coordinate lookup has succeeded yet.
    GatheringCoordinates,
    /// At least one site is resolved but the baseline state was never read.
    GatheringBaseline,
    /// Sites and baseline are known and no recon plan was requested.
    ReadyToPlan,
    /// A recon plan was requested (successfully or not).
    Planned,
}

impl MissionStage {
    pub fn evaluate(records: &[ToolCallRecord]) -> Self {
        let planned = records.iter().any(|r| r.is(ToolName::ReconMission));
        let resolved_sites = records
            .iter()
            .filter(|r| r.succeeded_as(ToolName::SiteCoordinates))
            .count();
        let has_baseline = records.iter().any(|r| r.is(ToolName::BaselineState));

        if planned {
            MissionStage::Planned
        } else if resolved_sites == 0 {
            MissionStage::GatheringCoordinates
        } else if !has_baseline {
            MissionStage::GatheringBaseline
        } else {
            MissionStage::ReadyToPlan
        }
    }

    /// Whether the orchestrator should ask for recon plans before finalizing.
    pub fn needs_planning_round(&self) -> bool {
        matches!(self, MissionStage::ReadyToPlan)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStage::GatheringCoordinates => "gathering_coordinates",
            MissionStage::GatheringBaseline => "gathering_baseline",
            MissionStage::ReadyToPlan => "ready_to_plan",
            MissionStage::Planned => "planned",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::record::ToolOutcome;
    use serde_json::json;

    fn ok(name: &str, result: serde_json::Value) -> ToolCallRecord {
        ToolCallRecord::new(format!("id_{}", name), name, json!({}), ToolOutcome::Success(result))
    }

    fn failed(name: &str) -> ToolCallRecord {
        ToolCallRecord::new(
            format!("id_{}", name),
            name,
            json!({}),
            ToolOutcome::Failure {
                error: "nope".into(),
            },
        )
    }

    #[test]
    fn test_empty_history_is_gathering_coordinates() {
        assert_eq!(MissionStage::evaluate(&[]), MissionStage::GatheringCoordinates);
    }

    #[test]
    fn test_failed_lookups_do_not_count() {
        let records = vec![failed("get_site_coordinates"), ok("get_baseline_state", json!({}))];
        let stage = MissionStage::evaluate(&records);

        assert_eq!(stage, MissionStage::GatheringCoordinates);
        assert!(!stage.needs_planning_round());
    }

    #[test]
    fn test_coordinates_without_baseline() {
        let records = vec![ok("get_site_coordinates", json!({"lat": 1.0, "lon": 2.0}))];
        assert_eq!(MissionStage::evaluate(&records), MissionStage::GatheringBaseline);
    }

    #[test]
    fn test_two_sites_and_baseline_are_ready_to_plan() {
        let records = vec![
            ok("get_site_coordinates", json!({"lat": 1.0, "lon": 2.0})),
            ok("get_site_coordinates", json!({"lat": 3.0, "lon": 4.0})),
            ok("get_baseline_state", json!({})),
            ok("get_no_fly_zones", json!([])),
        ];
        let stage = MissionStage::evaluate(&records);

        assert_eq!(stage, MissionStage::ReadyToPlan);
        assert!(stage.needs_planning_round());
    }

    #[test]
    fn test_any_recon_call_means_planned() {
        let records = vec![
            ok("get_site_coordinates", json!({"lat": 1.0, "lon": 2.0})),
            ok("get_baseline_state", json!({})),
            failed("plan_recon_mission"),
        ];
        assert_eq!(MissionStage::evaluate(&records), MissionStage::Planned);
    }
}
