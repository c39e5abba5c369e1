//! Tool layer: the catalog offered to the LLM, argument validation, the site
//! gazetteer and the executor that answers each call.

pub mod args;
pub mod catalog;
pub mod executor;
pub mod sites;
pub mod types;

pub use args::{parse_raw_arguments, ToolInvocation};
pub use catalog::{ToolCatalog, ToolDefinition, ToolName};
pub use executor::{plan_recon_waypoints, ToolExecutor};
pub use sites::{SiteDirectory, StaticSiteTable};
pub use types::{BaselineState, Coordinates, ReconPlan, Waypoint};
