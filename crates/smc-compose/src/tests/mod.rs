//! Controller tests driven through scripted collaborators.

use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use smc_compose_core::{Audience, ComposeConfig, DeepLink, MessageForm};
use smc_contract::{
    BusAction, BusResponse, ConfirmDecision, ScriptedConfirmationChannel, ScriptedRequestBus,
    SwitchableRouteGuard,
};

use crate::{ComposeCollaborators, ComposeController, ComposeEvent, ComposeSignal, ComposeUser};

mod persistence_flows;

struct Harness {
    controller: ComposeController,
    bus: Arc<ScriptedRequestBus>,
    confirmation: Arc<ScriptedConfirmationChannel>,
    guard: Arc<SwitchableRouteGuard>,
    signals: Arc<Mutex<Vec<ComposeSignal>>>,
}

impl Harness {
    fn new() -> Self {
        Self::with_decisions(Vec::new())
    }

    fn with_decisions(decisions: Vec<ConfirmDecision>) -> Self {
        let bus = Arc::new(ScriptedRequestBus::new());
        let confirmation = Arc::new(ScriptedConfirmationChannel::new(decisions));
        let guard = Arc::new(SwitchableRouteGuard::new(true));
        let mut controller = ComposeController::new(
            ComposeCollaborators {
                bus: bus.clone(),
                confirmation: confirmation.clone(),
                route_guard: guard.clone(),
            },
            ComposeConfig::default(),
            &ComposeUser::new("Pat", "Lee"),
        );
        let signals = Arc::new(Mutex::new(Vec::new()));
        let sink = signals.clone();
        controller.subscribe(move |signal| {
            sink.lock().expect("signal sink").push(signal.clone());
        });
        Self {
            controller,
            bus,
            confirmation,
            guard,
            signals,
        }
    }

    async fn reply(&self, action: BusAction, content: Value) {
        self.bus.push_response(action, BusResponse::ok(content)).await;
    }

    async fn reject(&self, action: BusAction, reason: &str) {
        self.bus.push_rejection(action, reason).await;
    }

    async fn handle(&self, event: ComposeEvent) {
        self.controller.handle(event).await;
    }

    fn signals(&self) -> Vec<ComposeSignal> {
        self.signals.lock().expect("signal sink").clone()
    }

    fn signal_names(&self) -> Vec<&'static str> {
        self.signals().iter().map(ComposeSignal::as_str).collect()
    }

    fn count_signal(&self, name: &str) -> usize {
        self.signal_names()
            .into_iter()
            .filter(|signal| *signal == name)
            .count()
    }

    fn clear_signals(&self) {
        self.signals.lock().expect("signal sink").clear();
    }

    /// Error codes of every acknowledgement shown so far.
    async fn error_codes(&self) -> Vec<String> {
        self.confirmation
            .prompts()
            .await
            .into_iter()
            .filter_map(|prompt| match prompt.content {
                smc_contract::ConfirmContent::Error { code, .. } => Some(code),
                _ => None,
            })
            .collect()
    }

    /// Drives a claims deep link with one candidate and one identifier all
    /// the way into the editor.
    async fn reach_editor(&self, key: &str) {
        self.reply(
            BusAction::EntityClaimRequested,
            json!([claim_record(key, json!([identifier("Injured Worker", "ClaimId", key)]))]),
        )
        .await;
        self.reply(BusAction::SubscribedRequested, json!(true)).await;
        self.reply(BusAction::WorkposClaimRequested, claims_contact())
            .await;
        self.reply(BusAction::WorkposReviewDateRequested, json!("11/02/2026"))
            .await;
        self.handle(ComposeEvent::open(Some(DeepLink::lookup(Audience::Claims, key))))
            .await;
    }
}

fn identifier(name: &str, identifier_type: &str, value: &str) -> Value {
    json!({
        "Name": name,
        "IdentifierType": identifier_type,
        "IdentifierValue": value,
        "EntityRelation": name,
    })
}

fn claim_record(key: &str, identifiers: Value) -> Value {
    json!({
        "BusinessDataType": 1,
        "BusinessDataValue": key,
        "FirstName": "Dana",
        "LastName": "Reyes",
        "Identifiers": identifiers,
    })
}

fn account_record(key: &str, identifiers: Value) -> Value {
    json!({
        "BusinessDataType": 2,
        "BusinessDataValue": key,
        "BusinessName": "Cedar Roofing",
        "Identifiers": identifiers,
    })
}

fn claims_contact() -> Value {
    json!({
        "FirstName": "Morgan",
        "LastName": "Hale",
        "PhoneNumber": "3605551234",
        "WorkPos": "CM12",
    })
}

fn message_form(body: &str, is_draft: bool) -> MessageForm {
    MessageForm {
        subject: "Wage statement".to_string(),
        message_body: body.to_string(),
        is_draft,
        response_required: false,
    }
}

fn saved_thread(thread_rid: u64, message_rid: u64, is_draft: bool) -> Value {
    json!({
        "_Rid": thread_rid,
        "_Messages": [{ "_Rid": message_rid, "_IsDraft": is_draft, "_Text": "body" }],
    })
}
