use serde::Serialize;

use crate::compose_audience::Audience;
use crate::compose_entity::{EntityIdentifier, EntityRecord, SelectedEntity};
use crate::compose_thread::{SavedMessage, SavedThread, ThreadPayload};
use crate::ComposeCoreError;

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
/// Persistence markers for the server-side thread.
pub struct ThreadState {
    pub request: Option<ThreadPayload>,
    pub data: Option<SavedThread>,
    /// Unset until the first successful save; pins every later save.
    pub thread_id: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
/// Persistence markers for the message being edited.
pub struct MessageState {
    pub data: Option<SavedMessage>,
    pub is_draft: bool,
    pub saved_at: Option<String>,
    pub text: Option<String>,
    pub message_rid: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
/// Contact card shown next to the editor.
pub struct Workpos {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub description: String,
    pub review: String,
    pub work_pos: String,
}

/// The single live compose session record.
///
/// Only the workflow controller writes to it. Identifier type and code are
/// derived from `audience` and are never stored.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WorkflowState {
    pub audience: Audience,
    pub is_search: bool,
    pub entities: Vec<EntityRecord>,
    /// `None` means no active search, which differs from an empty term.
    pub search_term: Option<String>,
    /// True until the first entity list render completes.
    pub entity_init: bool,
    pub entity: Option<SelectedEntity>,
    pub relationship: Option<EntityIdentifier>,
    pub thread: ThreadState,
    pub message: MessageState,
    pub workpos: Workpos,
    pub claims_count: usize,
    pub accounts_count: usize,
    pub trim_count: usize,
    pub username: String,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            audience: Audience::None,
            is_search: false,
            entities: Vec::new(),
            search_term: None,
            entity_init: true,
            entity: None,
            relationship: None,
            thread: ThreadState::default(),
            message: MessageState::default(),
            workpos: Workpos::default(),
            claims_count: 0,
            accounts_count: 0,
            trim_count: 0,
            username: String::new(),
        }
    }
}

impl WorkflowState {
    pub fn with_username(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn audience_type(&self) -> &'static str {
        self.audience.audience_type()
    }

    pub fn audience_code(&self) -> &'static str {
        self.audience.audience_code()
    }

    pub fn assign_audience(&mut self, audience: Audience) {
        self.audience = audience;
    }

    /// Restores defaults for a new session. The signed-in user survives.
    pub fn reset(&mut self) {
        let username = std::mem::take(&mut self.username);
        *self = Self::with_username(username);
    }

    /// Stores the selected entity and forgets any previously chosen identifier.
    pub fn select_entity(&mut self, entity: SelectedEntity) {
        self.entity = Some(entity);
        self.relationship = None;
    }

    pub fn entity_identifiers(&self) -> &[EntityIdentifier] {
        self.entity
            .as_ref()
            .map(SelectedEntity::identifiers)
            .unwrap_or_default()
    }

    /// Records a successful draft save, pinning the thread and message ids.
    ///
    /// A draft response must carry both ids; without them state is left as is.
    pub fn record_draft_saved(
        &mut self,
        thread: SavedThread,
        draft: SavedMessage,
        saved_at: String,
    ) -> Result<(), ComposeCoreError> {
        let (Some(thread_id), Some(message_rid)) = (thread.rid, draft.rid) else {
            return Err(ComposeCoreError::MissingSavedIds);
        };
        self.thread.thread_id = Some(thread_id);
        self.thread.data = Some(thread);
        self.message.message_rid = Some(message_rid);
        self.message.text = draft.text.clone();
        self.message.data = Some(draft);
        self.message.saved_at = Some(saved_at);
        self.message.is_draft = true;
        Ok(())
    }
}
