use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use serde_json::{json, Value};
use smc_compose::{
    load_replay_script, parse_replay_script, run_replay, ComposeCollaborators, ComposeController,
    ComposeEvent, ComposeSignal, ComposeUser,
};
use smc_compose_core::{load_compose_config, Audience, ComposeConfig, WorkflowState};
use smc_contract::{
    BusAction, BusError, BusRequest, BusResponse, ConfirmContent, OpenRouteGuard, RequestBus,
    ScriptedConfirmationChannel,
};

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name)
}

/// Answers lookups from a fixed table after a per-action delay, so joined
/// requests complete out of issue order.
struct DelayedBus {
    replies: Vec<(BusAction, Duration, Value)>,
    completed: Mutex<Vec<BusAction>>,
}

#[async_trait]
impl RequestBus for DelayedBus {
    async fn request(&self, request: &BusRequest) -> Result<BusResponse, BusError> {
        let Some((_, delay, content)) = self
            .replies
            .iter()
            .find(|(action, _, _)| *action == request.action)
        else {
            return Err(BusError::Unavailable {
                action: request.action,
            });
        };
        tokio::time::sleep(*delay).await;
        self.completed
            .lock()
            .expect("completion log")
            .push(request.action);
        Ok(BusResponse::ok(content.clone()))
    }
}

#[tokio::test]
async fn integration_replay_single_claim_saves_draft_then_sends() {
    let script = load_replay_script(&fixture_path("compose-replay-single-claim.json"))
        .expect("load replay script");

    let summary = run_replay(script, ComposeConfig::default()).await;

    assert_eq!(summary.events_handled, 3);
    assert_eq!(
        summary.signal_names(),
        vec![
            "compose:ready",
            "render:editor",
            "message:saved",
            "toaster:open",
            "message:sent",
            "toaster:open",
            "inbox:open",
        ]
    );
    assert_eq!(summary.final_state, WorkflowState::with_username("Pat Lee"));

    let subscribe = summary
        .requests
        .iter()
        .find(|request| request.action == BusAction::SubscribeRequested)
        .expect("subscribe request");
    assert_eq!(subscribe.payload.params, json!(["4100255", "ClaimId"]));

    let saves = summary
        .requests
        .iter()
        .filter(|request| request.action == BusAction::MessageSaveRequested)
        .collect::<Vec<_>>();
    assert_eq!(saves.len(), 2);
    let send: Value = serde_json::from_str(
        saves[1].payload.params[0]
            .as_str()
            .expect("encoded thread"),
    )
    .expect("thread json");
    assert_eq!(send["CorrespondenceRid"], json!(501));
    assert_eq!(send["BusinessDataValue"], json!("4100255"));
    assert_eq!(send["Messages"][0]["MessageRid"], json!(9001));
    assert_eq!(send["Messages"][0]["IsDraft"], json!(false));
    assert_eq!(send["Messages"][0]["IsResponseRequired"], json!(true));

    assert!(matches!(
        summary.prompts[0].content,
        ConfirmContent::Subscribe { .. }
    ));
}

#[tokio::test]
async fn integration_replay_employer_relationship_falls_back_then_deletes() {
    let script = load_replay_script(&fixture_path("compose-replay-employer-relationship.json"))
        .expect("load replay script");

    let summary = run_replay(script, ComposeConfig::default()).await;

    assert_eq!(
        summary.signal_names(),
        vec![
            "compose:ready",
            "render:relationship",
            "render:editor",
            "toaster:open",
            "inbox:open",
        ]
    );
    assert!(summary.prompts.is_empty());
    assert!(summary.signals.contains(&ComposeSignal::toast(
        "Message deleted",
        smc_compose::ToastKind::Success
    )));
    let delete = summary
        .requests
        .iter()
        .find(|request| request.action == BusAction::DeleteThreadRequested)
        .expect("delete request");
    assert_eq!(delete.payload.params, json!(["[null]"]));
    assert_eq!(summary.final_state, WorkflowState::with_username("Pat Lee"));
}

#[test]
fn integration_replay_script_rejects_unknown_schema_version() {
    let error = parse_replay_script(r#"{ "schema_version": 7, "events": [] }"#)
        .expect_err("schema version 7 is unsupported");
    assert!(error.to_string().contains("schema_version 7"));
}

#[tokio::test]
async fn integration_configured_fallback_applies_when_joined_lookups_finish_out_of_order() {
    let workspace = tempfile::tempdir().expect("tempdir");
    let config_path = workspace.path().join("compose.json");
    fs::write(
        &config_path,
        serde_json::to_string_pretty(&json!({
            "schema_version": 1,
            "entities_trim_count": 1,
            "workpos": {
                "claims_fallback": {
                    "description": "Department",
                    "first_name": "Claims",
                    "last_name": "Desk",
                    "phone_number": "800-000-0000"
                }
            }
        }))
        .expect("encode config"),
    )
    .expect("write config");
    let config = load_compose_config(&config_path).expect("load config");
    assert_eq!(config.entities_trim_count, 1);

    let claim = json!({
        "BusinessDataType": 1,
        "BusinessDataValue": "77",
        "FirstName": "Dana",
        "LastName": "Reyes",
        "Identifiers": [{
            "Name": "Injured Worker",
            "IdentifierType": "ClaimId",
            "IdentifierValue": "77",
            "EntityRelation": "Injured Worker"
        }]
    });
    let bus = Arc::new(DelayedBus {
        replies: vec![
            (BusAction::EntityClaimRequested, Duration::from_millis(30), json!([claim])),
            (BusAction::EntityAccountRequested, Duration::from_millis(1), json!([])),
            (BusAction::SubscribedRequested, Duration::from_millis(1), json!(true)),
            (BusAction::WorkposClaimRequested, Duration::from_millis(20), json!({})),
            (
                BusAction::WorkposReviewDateRequested,
                Duration::from_millis(1),
                json!("03/03/2027"),
            ),
        ],
        completed: Mutex::new(Vec::new()),
    });
    let mut controller = ComposeController::new(
        ComposeCollaborators {
            bus: bus.clone(),
            confirmation: Arc::new(ScriptedConfirmationChannel::default()),
            route_guard: Arc::new(OpenRouteGuard),
        },
        config,
        &ComposeUser::new("Pat", "Lee"),
    );
    let signals = Arc::new(Mutex::new(Vec::new()));
    let sink = signals.clone();
    controller.subscribe(move |signal| {
        sink.lock().expect("signal sink").push(signal.as_str());
    });

    controller.handle(ComposeEvent::open(None)).await;

    let completed = bus.completed.lock().expect("completion log").clone();
    assert_eq!(
        completed[..2],
        [BusAction::EntityAccountRequested, BusAction::EntityClaimRequested]
    );
    let state = controller.snapshot();
    assert_eq!(state.audience, Audience::Claims);
    assert_eq!((state.claims_count, state.accounts_count), (1, 0));
    assert_eq!(state.workpos.first_name, "Claims");
    assert_eq!(state.workpos.last_name, "Desk");
    assert_eq!(state.workpos.review, "03/03/2027");
    assert_eq!(
        signals.lock().expect("signal sink").clone(),
        vec!["compose:ready", "render:editor"]
    );
}
