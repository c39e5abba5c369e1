use crate::config::clean_url;
use crate::drone::command::{DroneCommand, DroneEndpoint};
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// HTTP client for the drone command server.
pub struct HttpDroneClient {
    command_url: String,
    client: reqwest::Client,
}

impl HttpDroneClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::ConfigurationError(format!("Failed to build drone HTTP client: {}", e))
            })?;

        Ok(Self {
            command_url: format!("{}/cmd", clean_url(base_url)),
            client,
        })
    }

    pub fn command_url(&self) -> &str {
        &self.command_url
    }
}

#[async_trait]
impl DroneEndpoint for HttpDroneClient {
    async fn execute(&self, command: &DroneCommand) -> Result<Value> {
        tracing::debug!(
            id = %command.id,
            action = %command.action,
            parameters = %command.parameters,
            url = %self.command_url,
            "Sending drone command"
        );

        let response = self
            .client
            .post(&self.command_url)
            .json(command)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                id = %command.id,
                action = %command.action,
                status = status.as_u16(),
                "Drone endpoint rejected command"
            );
            return Err(AppError::UpstreamError(format!(
                "Drone endpoint returned HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let result: Value = response.json().await?;
        tracing::debug!(id = %command.id, action = %command.action, "Drone command acknowledged");
        Ok(result)
    }
}
