//! The compose workflow controller.
//!
//! The controller owns the single live [`WorkflowState`] and is the only code
//! that writes to it. Triggers run through [`ComposeController::handle`];
//! each flow step may return a follow-up trigger, which the dispatch loop runs
//! next instead of recursing.
//!
//! Flows suspend on bus requests and confirmations. The state lock is never
//! held across a suspension, and every continuation re-checks the session
//! epoch before touching state: `Open` and `Closed` start a new epoch, so a
//! response that arrives after the user navigated away is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use smc_compose_core::{ComposeConfig, WorkflowState};
use smc_contract::{
    join_bus_requests, BusRequest, BusResponse, ConfirmContent, ConfirmDecision, ConfirmPrompt,
    ConfirmationChannel, RequestBus, RouteGuard,
};

use crate::compose_errors::{ComposeErrorKind, ComposeRecovery, ComposeStepError};
use crate::compose_events::ComposeEvent;
use crate::compose_signals::ComposeSignal;

pub type ComposeSignalHandler = Arc<dyn Fn(&ComposeSignal) + Send + Sync>;

/// Outcome of one flow step: the trigger to run next, if any.
pub(crate) type FollowUp = Option<ComposeEvent>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Signed-in user whose name is stamped on outgoing threads.
pub struct ComposeUser {
    pub first_name: String,
    pub last_name: String,
}

impl ComposeUser {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Clone)]
/// External collaborators the controller talks to.
pub struct ComposeCollaborators {
    pub bus: Arc<dyn RequestBus>,
    pub confirmation: Arc<dyn ConfirmationChannel>,
    pub route_guard: Arc<dyn RouteGuard>,
}

struct ComposeSession {
    epoch: u64,
    ready: bool,
    state: WorkflowState,
}

/// Drives the compose workflow against a request bus, a confirmation channel,
/// and a route guard.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use smc_compose::{ComposeCollaborators, ComposeController, ComposeUser};
/// use smc_compose_core::ComposeConfig;
/// use smc_contract::{OpenRouteGuard, ScriptedConfirmationChannel, ScriptedRequestBus};
///
/// let controller = ComposeController::new(
///     ComposeCollaborators {
///         bus: Arc::new(ScriptedRequestBus::new()),
///         confirmation: Arc::new(ScriptedConfirmationChannel::default()),
///         route_guard: Arc::new(OpenRouteGuard),
///     },
///     ComposeConfig::default(),
///     &ComposeUser::new("Pat", "Lee"),
/// );
/// assert_eq!(controller.snapshot().username, "Pat Lee");
/// ```
pub struct ComposeController {
    collaborators: ComposeCollaborators,
    config: ComposeConfig,
    session: Mutex<ComposeSession>,
    acknowledgement_open: AtomicBool,
    handlers: Vec<ComposeSignalHandler>,
}

impl ComposeController {
    pub fn new(
        collaborators: ComposeCollaborators,
        config: ComposeConfig,
        user: &ComposeUser,
    ) -> Self {
        Self {
            collaborators,
            config,
            session: Mutex::new(ComposeSession {
                epoch: 0,
                ready: false,
                state: WorkflowState::with_username(user.display_name()),
            }),
            acknowledgement_open: AtomicBool::new(false),
            handlers: Vec::new(),
        }
    }

    /// Adds a subscriber that receives every emitted signal.
    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: Fn(&ComposeSignal) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Copy of the current workflow state.
    pub fn snapshot(&self) -> WorkflowState {
        self.lock_session().state.clone()
    }

    pub fn session_epoch(&self) -> u64 {
        self.lock_session().epoch
    }

    /// Runs a trigger and every follow-up it produces.
    ///
    /// Triggers that may issue a bus request are refused while the route
    /// guard reports it is unsafe to leave; the refusal leaves state untouched.
    pub async fn handle(&self, event: ComposeEvent) {
        let mut next = Some(event);
        while let Some(event) = next.take() {
            let action = event.action_name();
            if event.issues_bus_request() && !self.collaborators.route_guard.is_safe_to_leave() {
                tracing::warn!(action, "compose trigger blocked by route guard");
                self.collaborators.route_guard.on_blocked(action);
                return;
            }
            tracing::debug!(action, "handling compose trigger");
            next = self.dispatch(event).await;
        }
    }

    async fn dispatch(&self, event: ComposeEvent) -> FollowUp {
        match event {
            ComposeEvent::Open { link } => self.open(link).await,
            ComposeEvent::Closed => {
                self.begin_session();
                None
            }
            ComposeEvent::AudienceSelected { audience } => {
                let epoch = self.session_epoch();
                self.select_audience_by_name(epoch, &audience).await
            }
            ComposeEvent::EntitySearch { term } => {
                let epoch = self.session_epoch();
                self.search_entities(epoch, term).await
            }
            ComposeEvent::EntitySelected { business_key } => {
                let epoch = self.session_epoch();
                self.select_entity(epoch, &business_key).await
            }
            ComposeEvent::RelationshipSelected { name } => {
                let epoch = self.session_epoch();
                self.select_relationship(epoch, &name).await
            }
            ComposeEvent::SaveMessage { form } => {
                let epoch = self.session_epoch();
                self.save_message(epoch, form).await
            }
            ComposeEvent::Delete => {
                let epoch = self.session_epoch();
                self.delete_thread(epoch).await
            }
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, ComposeSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Resets state to defaults and starts a new epoch, which invalidates
    /// every in-flight continuation of the previous session.
    pub(crate) fn begin_session(&self) -> u64 {
        let mut session = self.lock_session();
        session.epoch += 1;
        session.ready = false;
        session.state.reset();
        tracing::debug!(epoch = session.epoch, "compose session started");
        session.epoch
    }

    pub(crate) fn is_stale(&self, epoch: u64) -> bool {
        let current = self.lock_session().epoch;
        if current != epoch {
            tracing::warn!(epoch, current, "dropping stale compose continuation");
            return true;
        }
        false
    }

    pub(crate) fn read<R>(&self, read: impl FnOnce(&WorkflowState) -> R) -> R {
        read(&self.lock_session().state)
    }

    /// Applies `update` only while `epoch` is still current.
    pub(crate) fn update<R>(
        &self,
        epoch: u64,
        update: impl FnOnce(&mut WorkflowState) -> R,
    ) -> Option<R> {
        let mut session = self.lock_session();
        if session.epoch != epoch {
            tracing::warn!(
                epoch,
                current = session.epoch,
                "dropping stale compose state update"
            );
            return None;
        }
        Some(update(&mut session.state))
    }

    /// Emits `compose:ready` once per session.
    pub(crate) fn activate(&self, epoch: u64) {
        let first = {
            let mut session = self.lock_session();
            if session.epoch != epoch || session.ready {
                false
            } else {
                session.ready = true;
                true
            }
        };
        if first {
            self.emit(ComposeSignal::Ready);
        }
    }

    pub(crate) fn emit(&self, signal: ComposeSignal) {
        tracing::debug!(signal = signal.as_str(), "emitting compose signal");
        for handler in &self.handlers {
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| handler(&signal)));
        }
    }

    pub(crate) async fn request(&self, request: BusRequest) -> Result<BusResponse, ComposeStepError> {
        tracing::debug!(action = request.action.as_str(), "issuing compose bus request");
        let response = self.collaborators.bus.request(&request).await?;
        require_success(&request, response)
    }

    /// Issues `requests` together; any failed call fails the whole step.
    pub(crate) async fn request_all(
        &self,
        requests: &[BusRequest],
    ) -> Result<Vec<BusResponse>, ComposeStepError> {
        tracing::debug!(count = requests.len(), "issuing joined compose bus requests");
        let results = join_bus_requests(self.collaborators.bus.as_ref(), requests).await;
        requests
            .iter()
            .zip(results)
            .map(|(request, result)| {
                result
                    .map_err(ComposeStepError::from)
                    .and_then(|response| require_success(request, response))
            })
            .collect()
    }

    pub(crate) async fn confirm(&self, prompt: ConfirmPrompt) -> ConfirmDecision {
        self.collaborators.confirmation.confirm(prompt).await
    }

    /// Presents the error acknowledgement for `kind` and runs its recovery.
    ///
    /// Only one acknowledgement is open at a time; a failure raised while one
    /// is showing is logged and abandoned.
    pub(crate) async fn fail(
        &self,
        epoch: u64,
        kind: ComposeErrorKind,
        error: ComposeStepError,
    ) -> FollowUp {
        tracing::warn!(code = kind.code(), error = %error, "compose step failed");
        if self.acknowledgement_open.swap(true, Ordering::SeqCst) {
            tracing::debug!(code = kind.code(), "error acknowledgement already open");
            return None;
        }
        let prompt = ConfirmPrompt::acknowledge(ConfirmContent::Error {
            code: kind.code().to_string(),
            support: true,
        });
        let _ = self.confirm(prompt).await;
        self.acknowledgement_open.store(false, Ordering::SeqCst);
        if self.is_stale(epoch) {
            return None;
        }
        match kind.recovery() {
            ComposeRecovery::RestartCompose => Some(ComposeEvent::open(None)),
            ComposeRecovery::RouteToInbox { reset } => {
                if reset {
                    self.begin_session();
                }
                self.emit(ComposeSignal::InboxOpen);
                None
            }
            ComposeRecovery::ReenableEditor => {
                self.emit(ComposeSignal::EditorUiUpdate {
                    is_disabled: false,
                    is_saved: false,
                });
                None
            }
        }
    }
}

fn require_success(
    request: &BusRequest,
    response: BusResponse,
) -> Result<BusResponse, ComposeStepError> {
    if response.success {
        Ok(response)
    } else {
        Err(ComposeStepError::Unsuccessful {
            action: request.action,
        })
    }
}

/// Truthiness of a bus `content` value.
pub(crate) fn content_is_truthy(content: &Value) -> bool {
    match content {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|value| value != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
