//! Sequential execution of a compiled flight plan.
//!
//! Commands run strictly in order, one at a time. A failed command is marked
//! `error` and the runner moves on so the drone still reaches `rth` / `land`.
//! A runner drives at most one plan at a time; starting another while one is
//! active does nothing.

use crate::drone::DroneEndpoint;
use crate::mission::compiler::{CommandStatus, FlightCommand};
use serde::Serialize;
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Clears the active flag when the run ends, including on panic.
struct ActiveRun {
    flag: Arc<AtomicBool>,
}

impl Drop for ActiveRun {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanProgress {
    pub running: bool,
    pub commands: Vec<FlightCommand>,
}

pub struct PlanRunner {
    drone: Arc<dyn DroneEndpoint>,
    command_delay: Duration,
    active: Arc<AtomicBool>,
    progress: RwLock<Vec<FlightCommand>>,
}

impl PlanRunner {
    pub fn new(drone: Arc<dyn DroneEndpoint>, command_delay: Duration) -> Self {
        Self {
            drone,
            command_delay,
            active: Arc::new(AtomicBool::new(false)),
            progress: RwLock::new(Vec::new()),
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Statuses of the current (or last) plan.
    pub async fn progress(&self) -> PlanProgress {
        PlanProgress {
            running: self.is_running(),
            commands: self.progress.read().await.clone(),
        }
    }

    /// Run `plan` to completion and return it with final statuses.
    ///
    /// Returns `None` without touching the drone if a plan is already running.
    pub async fn run(&self, plan: Vec<FlightCommand>) -> Option<Vec<FlightCommand>> {
        let run = self.claim()?;
        Some(self.drive(plan, run).await)
    }

    /// Start `plan` on a background task. Returns `false` (and does nothing)
    /// if a plan is already running.
    pub fn start(self: &Arc<Self>, plan: Vec<FlightCommand>) -> bool {
        let Some(run) = self.claim() else {
            return false;
        };

        let runner = Arc::clone(self);
        tokio::spawn(async move {
            runner.drive(plan, run).await;
        });
        true
    }

    fn claim(&self) -> Option<ActiveRun> {
        match self
            .active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        {
            Ok(_) => Some(ActiveRun {
                flag: Arc::clone(&self.active),
            }),
            Err(_) => {
                tracing::warn!("Flight plan already running, ignoring new plan");
                None
            }
        }
    }

    async fn drive(&self, mut plan: Vec<FlightCommand>, _run: ActiveRun) -> Vec<FlightCommand> {
        for cmd in plan.iter_mut() {
            cmd.status = CommandStatus::Pending;
            cmd.result = None;
        }
        *self.progress.write().await = plan.clone();

        let total = plan.len();
        tracing::info!(commands = total, "Flight plan execution started");

        for index in 0..total {
            plan[index].status = CommandStatus::Executing;
            self.publish(index, &plan[index]).await;

            let command = plan[index].to_drone_command();
            tracing::info!(
                step = index + 1,
                total,
                id = %command.id,
                action = %command.action,
                "Executing flight command"
            );

            let succeeded = match self.drone.execute(&command).await {
                Ok(result) => {
                    plan[index].status = CommandStatus::Success;
                    plan[index].result = Some(result);
                    true
                }
                Err(e) => {
                    tracing::error!(
                        step = index + 1,
                        id = %command.id,
                        action = %command.action,
                        error = %e,
                        "Flight command failed, continuing with next command"
                    );
                    plan[index].status = CommandStatus::Error;
                    plan[index].result = Some(json!({
                        "error": e.message(),
                        "details": e.to_string(),
                    }));
                    false
                }
            };
            self.publish(index, &plan[index]).await;

            metrics::counter!(
                "flight_commands_total",
                "action" => command.action.as_str(),
                "status" => if succeeded { "success" } else { "error" }
            )
            .increment(1);

            if succeeded && !self.command_delay.is_zero() {
                tokio::time::sleep(self.command_delay).await;
            }
        }

        let failed = plan
            .iter()
            .filter(|c| c.status == CommandStatus::Error)
            .count();
        tracing::info!(commands = total, failed, "Flight plan execution finished");

        plan
    }

    async fn publish(&self, index: usize, command: &FlightCommand) {
        if let Some(slot) = self.progress.write().await.get_mut(index) {
            *slot = command.clone();
        }
    }
}
