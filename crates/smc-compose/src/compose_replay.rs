//! Scripted replay of a compose session.
//!
//! A replay script lists canned bus replies per action, queued confirmation
//! decisions, and the triggers to feed the controller. Running it yields a
//! summary with every emitted signal, every issued request, every prompt
//! shown, and the final workflow state.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use smc_compose_core::{ComposeConfig, WorkflowState};
use smc_contract::{
    BusAction, BusRequest, ConfirmDecision, ConfirmPrompt, OpenRouteGuard,
    ScriptedConfirmationChannel, ScriptedReply, ScriptedRequestBus,
};

use crate::compose_controller::{ComposeCollaborators, ComposeController, ComposeUser};
use crate::compose_events::ComposeEvent;
use crate::compose_signals::ComposeSignal;

pub const COMPOSE_REPLAY_SCHEMA_VERSION: u32 = 1;

fn replay_schema_version() -> u32 {
    COMPOSE_REPLAY_SCHEMA_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Signed-in user for the replayed session.
pub struct ReplayUser {
    pub first_name: String,
    pub last_name: String,
}

impl Default for ReplayUser {
    fn default() -> Self {
        Self {
            first_name: "Replay".to_string(),
            last_name: "User".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `ComposeReplayScript` used by the replay harness.
pub struct ComposeReplayScript {
    #[serde(default = "replay_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub user: ReplayUser,
    #[serde(default)]
    pub bus: BTreeMap<BusAction, Vec<ScriptedReply>>,
    #[serde(default)]
    pub confirmations: Vec<ConfirmDecision>,
    #[serde(default)]
    pub events: Vec<ComposeEvent>,
}

#[derive(Debug, Clone, Serialize)]
/// Everything observable after a replay.
pub struct ComposeReplaySummary {
    pub schema_version: u32,
    pub events_handled: usize,
    pub signals: Vec<ComposeSignal>,
    pub requests: Vec<BusRequest>,
    pub prompts: Vec<ConfirmPrompt>,
    pub final_state: WorkflowState,
}

impl ComposeReplaySummary {
    pub fn signal_names(&self) -> Vec<&'static str> {
        self.signals.iter().map(ComposeSignal::as_str).collect()
    }
}

pub fn parse_replay_script(raw: &str) -> Result<ComposeReplayScript> {
    let script = serde_json::from_str::<ComposeReplayScript>(raw)
        .context("failed to decode compose replay script")?;
    if script.schema_version != COMPOSE_REPLAY_SCHEMA_VERSION {
        bail!(
            "unsupported compose replay schema_version {} (expected {})",
            script.schema_version,
            COMPOSE_REPLAY_SCHEMA_VERSION
        );
    }
    Ok(script)
}

pub fn load_replay_script(path: &Path) -> Result<ComposeReplayScript> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_replay_script(&raw).with_context(|| format!("invalid replay script {}", path.display()))
}

/// Feeds every scripted trigger to a fresh controller, in order.
pub async fn run_replay(
    script: ComposeReplayScript,
    config: ComposeConfig,
) -> ComposeReplaySummary {
    let bus = Arc::new(ScriptedRequestBus::from_script(script.bus));
    let confirmation = Arc::new(ScriptedConfirmationChannel::new(script.confirmations));
    let user = ComposeUser::new(script.user.first_name, script.user.last_name);
    let mut controller = ComposeController::new(
        ComposeCollaborators {
            bus: bus.clone(),
            confirmation: confirmation.clone(),
            route_guard: Arc::new(OpenRouteGuard),
        },
        config,
        &user,
    );
    let signals = Arc::new(Mutex::new(Vec::new()));
    let sink = signals.clone();
    controller.subscribe(move |signal| {
        sink.lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(signal.clone());
    });

    let events_handled = script.events.len();
    for event in script.events {
        tracing::info!(action = event.action_name(), "replaying compose trigger");
        controller.handle(event).await;
    }

    let signals = signals
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();
    ComposeReplaySummary {
        schema_version: COMPOSE_REPLAY_SCHEMA_VERSION,
        events_handled,
        signals,
        requests: bus.requests().await,
        prompts: confirmation.prompts().await,
        final_state: controller.snapshot(),
    }
}
