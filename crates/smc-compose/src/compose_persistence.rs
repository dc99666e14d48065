//! Draft save, send, and thread delete.

use serde::Deserialize;
use serde_json::json;
use smc_compose_core::{MessageForm, SavedThread, ThreadPayload};
use smc_contract::{BusAction, BusRequest};

use crate::compose_controller::{ComposeController, FollowUp};
use crate::compose_errors::{ComposeErrorKind, ComposeStepError};
use crate::compose_signals::{ComposeSignal, ToastKind};

/// Wall-clock stamp shown next to a saved draft, e.g. `3:07:45 pm`.
pub(crate) fn saved_at_stamp() -> String {
    chrono::Local::now().format("%-I:%M:%S %P").to_string()
}

impl ComposeController {
    /// Persists the editor form.
    ///
    /// A response still holding a draft-flagged message means the draft was
    /// saved and its ids are pinned for later saves; otherwise the message was
    /// sent, the session ends, and the user is routed to the inbox.
    pub(crate) async fn save_message(&self, epoch: u64, form: MessageForm) -> FollowUp {
        let kind = ComposeErrorKind::MessageSave {
            is_draft: form.is_draft,
        };
        let action = BusAction::MessageSaveRequested;
        let payload = match self.read(|state| ThreadPayload::build(state, &form)) {
            Ok(payload) => payload,
            Err(error) => return self.fail(epoch, kind, error.into()).await,
        };
        let encoded = match serde_json::to_string(&payload) {
            Ok(encoded) => encoded,
            Err(source) => {
                return self
                    .fail(epoch, kind, ComposeStepError::Encode { action, source })
                    .await
            }
        };
        tracing::debug!(
            is_draft = form.is_draft,
            correspondence_rid = payload.correspondence_rid,
            "saving compose thread"
        );
        self.update(epoch, |state| state.thread.request = Some(payload))?;

        let result = self
            .request(BusRequest::new(action, vec![json!(encoded)]))
            .await;
        if self.is_stale(epoch) {
            return None;
        }
        let saved = result.and_then(|response| {
            SavedThread::deserialize(&response.content)
                .map_err(|source| ComposeStepError::MalformedContent { action, source })
        });
        let saved = match saved {
            Ok(saved) => saved,
            Err(error) => return self.fail(epoch, kind, error).await,
        };

        let draft = saved.draft().cloned();
        match draft {
            Some(draft) => {
                let saved_at = saved_at_stamp();
                tracing::debug!(thread_id = ?saved.rid, message_rid = ?draft.rid, "compose draft saved");
                let recorded =
                    self.update(epoch, |state| state.record_draft_saved(saved, draft, saved_at))?;
                if let Err(error) = recorded {
                    return self.fail(epoch, kind, error.into()).await;
                }
                self.emit(ComposeSignal::MessageSaved);
                self.emit(ComposeSignal::toast("Message saved", ToastKind::Info));
            }
            None => {
                tracing::debug!(thread_id = ?saved.rid, "compose message sent");
                self.emit(ComposeSignal::MessageSent);
                self.emit(ComposeSignal::toast("Message sent", ToastKind::Success));
                self.begin_session();
                self.emit(ComposeSignal::InboxOpen);
            }
        }
        None
    }

    /// Discards the thread. Success clears the session; failure leaves it
    /// untouched.
    pub(crate) async fn delete_thread(&self, epoch: u64) -> FollowUp {
        let thread_id = self.read(|state| state.thread.thread_id);
        let request = BusRequest::new(
            BusAction::DeleteThreadRequested,
            vec![json!(json!([thread_id]).to_string())],
        );
        let result = self.request(request).await;
        if self.is_stale(epoch) {
            return None;
        }
        match result {
            Ok(_) => {
                tracing::debug!(?thread_id, "compose thread deleted");
                self.begin_session();
                self.emit(ComposeSignal::toast("Message deleted", ToastKind::Success));
                self.emit(ComposeSignal::InboxOpen);
                None
            }
            Err(error) => self.fail(epoch, ComposeErrorKind::DeleteThread, error).await,
        }
    }
}
