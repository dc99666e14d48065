//! Deterministic collaborator doubles.
//!
//! Used by the replay harness and by tests: the bus replays canned replies
//! per action in FIFO order, the confirmation channel replays a queue of
//! decisions, and the route guard can be flipped between safe and blocked.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex as AsyncMutex;

use crate::bus_contract::{BusAction, BusError, BusRequest, BusResponse, RequestBus};
use crate::confirmation::{ConfirmDecision, ConfirmPrompt, ConfirmationChannel};
use crate::route_guard::RouteGuard;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
/// One canned bus reply: a rejection or a resolved envelope.
pub enum ScriptedReply {
    Reject { reject: String },
    Response(BusResponse),
}

impl ScriptedReply {
    fn into_result(self, action: BusAction) -> Result<BusResponse, BusError> {
        match self {
            Self::Reject { reject } => Err(BusError::Rejected {
                action,
                reason: reject,
            }),
            Self::Response(response) => Ok(response),
        }
    }
}

/// Request bus that replays scripted replies and records every request.
///
/// An action with no remaining replies resolves as `BusError::Unavailable`.
#[derive(Default)]
pub struct ScriptedRequestBus {
    replies: AsyncMutex<BTreeMap<BusAction, VecDeque<ScriptedReply>>>,
    requests: AsyncMutex<Vec<BusRequest>>,
}

impl ScriptedRequestBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_script(replies: BTreeMap<BusAction, Vec<ScriptedReply>>) -> Self {
        Self {
            replies: AsyncMutex::new(
                replies
                    .into_iter()
                    .map(|(action, queue)| (action, VecDeque::from(queue)))
                    .collect(),
            ),
            requests: AsyncMutex::new(Vec::new()),
        }
    }

    pub async fn push(&self, action: BusAction, reply: ScriptedReply) {
        self.replies
            .lock()
            .await
            .entry(action)
            .or_default()
            .push_back(reply);
    }

    pub async fn push_response(&self, action: BusAction, response: BusResponse) {
        self.push(action, ScriptedReply::Response(response)).await;
    }

    pub async fn push_rejection(&self, action: BusAction, reason: &str) {
        self.push(
            action,
            ScriptedReply::Reject {
                reject: reason.to_string(),
            },
        )
        .await;
    }

    pub async fn requests(&self) -> Vec<BusRequest> {
        self.requests.lock().await.clone()
    }

    pub async fn requests_for(&self, action: BusAction) -> Vec<BusRequest> {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|request| request.action == action)
            .cloned()
            .collect()
    }

    pub async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl RequestBus for ScriptedRequestBus {
    async fn request(&self, request: &BusRequest) -> Result<BusResponse, BusError> {
        self.requests.lock().await.push(request.clone());
        let reply = self
            .replies
            .lock()
            .await
            .get_mut(&request.action)
            .and_then(VecDeque::pop_front);
        match reply {
            Some(reply) => reply.into_result(request.action),
            None => Err(BusError::Unavailable {
                action: request.action,
            }),
        }
    }
}

/// Confirmation channel that replays queued decisions and records prompts.
///
/// Once the queue is empty every prompt resolves `Yes`. Acknowledgement
/// prompts always resolve `Yes`, without consuming a queued decision.
#[derive(Default)]
pub struct ScriptedConfirmationChannel {
    decisions: AsyncMutex<VecDeque<ConfirmDecision>>,
    prompts: AsyncMutex<Vec<ConfirmPrompt>>,
}

impl ScriptedConfirmationChannel {
    pub fn new(decisions: Vec<ConfirmDecision>) -> Self {
        Self {
            decisions: AsyncMutex::new(VecDeque::from(decisions)),
            prompts: AsyncMutex::new(Vec::new()),
        }
    }

    pub async fn prompts(&self) -> Vec<ConfirmPrompt> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl ConfirmationChannel for ScriptedConfirmationChannel {
    async fn confirm(&self, prompt: ConfirmPrompt) -> ConfirmDecision {
        let acknowledgement = prompt.is_acknowledgement();
        self.prompts.lock().await.push(prompt);
        if acknowledgement {
            return ConfirmDecision::Yes;
        }
        self.decisions
            .lock()
            .await
            .pop_front()
            .unwrap_or(ConfirmDecision::Yes)
    }
}

/// Route guard with a switchable verdict that records blocked actions.
#[derive(Debug)]
pub struct SwitchableRouteGuard {
    safe: AtomicBool,
    blocked: Mutex<Vec<String>>,
}

impl SwitchableRouteGuard {
    pub fn new(safe: bool) -> Self {
        Self {
            safe: AtomicBool::new(safe),
            blocked: Mutex::new(Vec::new()),
        }
    }

    pub fn set_safe(&self, safe: bool) {
        self.safe.store(safe, Ordering::SeqCst);
    }

    pub fn blocked_actions(&self) -> Vec<String> {
        self.blocked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl Default for SwitchableRouteGuard {
    fn default() -> Self {
        Self::new(true)
    }
}

impl RouteGuard for SwitchableRouteGuard {
    fn is_safe_to_leave(&self) -> bool {
        self.safe.load(Ordering::SeqCst)
    }

    fn on_blocked(&self, action: &str) {
        self.blocked
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(action.to_string());
    }
}
