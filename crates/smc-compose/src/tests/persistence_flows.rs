use serde_json::{json, Value};
use smc_compose_core::WorkflowState;
use smc_contract::{BusAction, BusResponse};

use super::{message_form, saved_thread, Harness};
use crate::{ComposeEvent, ComposeSignal, ToastKind};

/// Decodes the thread JSON carried by the `index`-th save request.
async fn saved_payload(harness: &Harness, index: usize) -> Value {
    let saves = harness
        .bus
        .requests_for(BusAction::MessageSaveRequested)
        .await;
    let encoded = saves[index].payload.params[0]
        .as_str()
        .expect("encoded thread")
        .to_string();
    serde_json::from_str(&encoded).expect("thread json")
}

#[tokio::test]
async fn functional_draft_save_pins_ids_and_stays_in_editor() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness.clear_signals();
    harness
        .reply(BusAction::MessageSaveRequested, saved_thread(501, 9001, true))
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("first draft", true),
        })
        .await;

    let state = harness.controller.snapshot();
    assert_eq!(state.thread.thread_id, Some(501));
    assert_eq!(state.message.message_rid, Some(9001));
    assert!(state.message.is_draft);
    let saved_at = state.message.saved_at.expect("saved timestamp");
    assert!(saved_at.ends_with(" am") || saved_at.ends_with(" pm"));
    assert_eq!(saved_at.matches(':').count(), 2);
    assert_eq!(
        harness.signals(),
        vec![
            ComposeSignal::MessageSaved,
            ComposeSignal::toast("Message saved", ToastKind::Info),
        ]
    );

    let payload = saved_payload(&harness, 0).await;
    assert_eq!(payload["CorrespondenceRid"], json!(0));
    assert_eq!(payload["From"], json!("Pat Lee"));
    assert_eq!(payload["BusinessDataType"], json!("ClaimId"));
    assert_eq!(payload["EntityIdentifierType"], json!("ClaimId"));
    assert_eq!(payload["Messages"][0]["IsDraft"], json!(true));
    assert_eq!(payload["Messages"][0]["Text"], json!("first draft"));
}

#[tokio::test]
async fn functional_second_save_reuses_stored_thread_and_message_ids() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness
        .reply(BusAction::MessageSaveRequested, saved_thread(501, 9001, true))
        .await;
    harness
        .reply(BusAction::MessageSaveRequested, saved_thread(501, 9001, true))
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("first draft", true),
        })
        .await;
    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("second draft", true),
        })
        .await;

    let second = saved_payload(&harness, 1).await;
    assert_eq!(second["CorrespondenceRid"], json!(501));
    assert_eq!(second["Messages"][0]["MessageRid"], json!(9001));
    assert_eq!(second["Messages"][0]["Text"], json!("second draft"));
    let state = harness.controller.snapshot();
    assert_eq!(
        state.thread.request.map(|request| request.title),
        Some("Wage statement".to_string())
    );
}

#[tokio::test]
async fn functional_send_without_draft_message_routes_to_inbox() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness.clear_signals();
    harness
        .reply(BusAction::MessageSaveRequested, saved_thread(502, 9002, false))
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("final text", false),
        })
        .await;

    assert_eq!(
        harness.signals(),
        vec![
            ComposeSignal::MessageSent,
            ComposeSignal::toast("Message sent", ToastKind::Success),
            ComposeSignal::InboxOpen,
        ]
    );
    assert!(harness.controller.snapshot().entity.is_none());
}

#[tokio::test]
async fn regression_draft_flag_on_request_does_not_decide_outcome() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness.clear_signals();
    harness
        .reply(BusAction::MessageSaveRequested, saved_thread(503, 9003, false))
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("draft that went out", true),
        })
        .await;

    assert_eq!(harness.count_signal("message:sent"), 1);
    assert_eq!(harness.count_signal("message:saved"), 0);
}

#[tokio::test]
async fn regression_sent_response_without_ids_still_routes_to_inbox() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness.clear_signals();
    harness
        .reply(
            BusAction::MessageSaveRequested,
            json!({ "_Messages": [{ "_IsDraft": false }] }),
        )
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("final text", false),
        })
        .await;

    assert!(harness.error_codes().await.is_empty());
    assert_eq!(
        harness.signal_names(),
        vec!["message:sent", "toaster:open", "inbox:open"]
    );
}

#[tokio::test]
async fn regression_draft_response_accepts_string_ids() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness.clear_signals();
    harness
        .reply(
            BusAction::MessageSaveRequested,
            json!({ "_Rid": "501", "_Messages": [{ "_Rid": "9001", "_IsDraft": true }] }),
        )
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("draft", true),
        })
        .await;

    assert!(harness.error_codes().await.is_empty());
    let state = harness.controller.snapshot();
    assert_eq!(state.thread.thread_id, Some(501));
    assert_eq!(state.message.message_rid, Some(9001));
    assert_eq!(harness.count_signal("message:saved"), 1);
}

#[tokio::test]
async fn regression_draft_response_without_ids_is_a_save_error() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness.clear_signals();
    harness
        .reply(
            BusAction::MessageSaveRequested,
            json!({ "_Messages": [{ "_IsDraft": true }] }),
        )
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("draft", true),
        })
        .await;

    assert_eq!(harness.error_codes().await, vec!["COMPOSE_SAVE"]);
    assert_eq!(harness.signal_names(), vec!["editor:ui-update"]);
    let state = harness.controller.snapshot();
    assert_eq!(state.thread.thread_id, None);
    assert_eq!(state.message.message_rid, None);
}

#[tokio::test]
async fn regression_save_failure_reenables_editor_and_keeps_session() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness.clear_signals();
    harness
        .reject(BusAction::MessageSaveRequested, "thread store unavailable")
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("keep me", true),
        })
        .await;

    assert_eq!(harness.error_codes().await, vec!["COMPOSE_SAVE"]);
    assert_eq!(
        harness.signals(),
        vec![ComposeSignal::EditorUiUpdate {
            is_disabled: false,
            is_saved: false,
        }]
    );
    let state = harness.controller.snapshot();
    assert!(state.entity.is_some());
    assert_eq!(state.thread.thread_id, None);
}

#[tokio::test]
async fn regression_unsuccessful_send_reports_send_code() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness
        .bus
        .push_response(
            BusAction::MessageSaveRequested,
            BusResponse::unsuccessful(json!(null)),
        )
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("send me", false),
        })
        .await;

    assert_eq!(harness.error_codes().await, vec!["COMPOSE_SEND"]);
    assert_eq!(harness.count_signal("inbox:open"), 0);
}

#[tokio::test]
async fn regression_malformed_save_response_is_a_save_error() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness
        .reply(BusAction::MessageSaveRequested, json!("not a thread"))
        .await;

    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("draft", true),
        })
        .await;

    assert_eq!(harness.error_codes().await, vec!["COMPOSE_SAVE"]);
    assert_eq!(harness.controller.snapshot().thread.thread_id, None);
}

#[tokio::test]
async fn functional_delete_success_clears_state_and_routes_to_inbox() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    harness
        .reply(BusAction::MessageSaveRequested, saved_thread(501, 9001, true))
        .await;
    harness
        .handle(ComposeEvent::SaveMessage {
            form: message_form("discard me", true),
        })
        .await;
    harness.clear_signals();
    harness
        .reply(BusAction::DeleteThreadRequested, json!(true))
        .await;

    harness.handle(ComposeEvent::Delete).await;

    let deletes = harness
        .bus
        .requests_for(BusAction::DeleteThreadRequested)
        .await;
    assert_eq!(deletes[0].payload.params, json!(["[501]"]));
    assert_eq!(
        harness.signals(),
        vec![
            ComposeSignal::toast("Message deleted", ToastKind::Success),
            ComposeSignal::InboxOpen,
        ]
    );
    assert_eq!(
        harness.controller.snapshot(),
        WorkflowState::with_username("Pat Lee")
    );
}

#[tokio::test]
async fn regression_delete_failure_leaves_state_untouched() {
    let harness = Harness::new();
    harness.reach_editor("12345").await;
    let before = harness.controller.snapshot();
    harness.clear_signals();
    harness
        .reject(BusAction::DeleteThreadRequested, "delete refused")
        .await;

    harness.handle(ComposeEvent::Delete).await;

    assert_eq!(harness.error_codes().await, vec!["COMPOSE_DELETE_THREAD"]);
    assert_eq!(harness.controller.snapshot(), before);
    assert_eq!(harness.signals(), vec![ComposeSignal::InboxOpen]);
}
