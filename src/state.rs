use crate::config::Config;
use crate::drone::{DroneEndpoint, HttpDroneClient};
use crate::error::Result;
use crate::llm::{ChatCompletion, HttpCompletionClient};
use crate::mission::{ConversationOrchestrator, PlanRunner};
use crate::tools::{SiteDirectory, StaticSiteTable, ToolCatalog, ToolExecutor};
use std::sync::Arc;

/// Application state shared across all request handlers.
pub struct AppState {
    pub orchestrator: ConversationOrchestrator,
    pub runner: Arc<PlanRunner>,
    pub catalog: Arc<ToolCatalog>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Build the production state: HTTP LLM client, HTTP drone client and the
    /// site table (plus `SITES_PATH` if set).
    ///
    /// # Errors
    /// `ConfigurationError` when the selected LLM provider lacks credentials
    /// or the sites file cannot be loaded. Raised at startup, before any LLM
    /// call is attempted.
    pub fn new(config: Config) -> Result<Self> {
        let llm = HttpCompletionClient::from_config(&config.llm)?;
        tracing::info!(provider = llm.provider().label(), "LLM client configured");

        let drone = HttpDroneClient::new(&config.drone_api_url, config.drone_timeout)?;
        tracing::info!(url = drone.command_url(), "Drone endpoint configured");

        let mut sites = StaticSiteTable::builtin();
        if let Some(path) = &config.sites_path {
            sites = sites.merge_file(path)?;
        }
        tracing::info!(sites = sites.len(), "Site table loaded");

        Ok(Self::with_components(
            config,
            Arc::new(llm),
            Arc::new(drone),
            Arc::new(sites),
        ))
    }

    /// Assemble state from explicit collaborators.
    pub fn with_components(
        config: Config,
        llm: Arc<dyn ChatCompletion>,
        drone: Arc<dyn DroneEndpoint>,
        sites: Arc<dyn SiteDirectory>,
    ) -> Self {
        let catalog = Arc::new(ToolCatalog::standard());
        let executor = Arc::new(ToolExecutor::new(sites, Arc::clone(&drone)));
        let orchestrator = ConversationOrchestrator::new(
            llm,
            executor,
            Arc::clone(&catalog),
            config.max_tool_rounds,
        );
        let runner = Arc::new(PlanRunner::new(drone, config.command_delay));

        Self {
            orchestrator,
            runner,
            catalog,
            config: Arc::new(config),
        }
    }
}
