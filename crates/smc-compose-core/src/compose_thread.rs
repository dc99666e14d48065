use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::compose_serde::lenient_optional_u64;
use crate::compose_state::WorkflowState;
use crate::ComposeCoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
/// Editor form values submitted on save or send.
pub struct MessageForm {
    pub subject: String,
    pub message_body: String,
    pub is_draft: bool,
    #[serde(default)]
    pub response_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
/// Message entry of a thread save request.
pub struct MessagePayload {
    pub is_draft: bool,
    pub is_internal: bool,
    pub message_rid: u64,
    pub text: String,
    pub is_response_required: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
/// Thread save request as the backend expects it.
pub struct ThreadPayload {
    pub title: String,
    /// Empty; the service layer resolves the user from session context.
    pub user: String,
    pub from: String,
    pub is_internal: bool,
    pub action_required: bool,
    pub business_data_type: String,
    pub business_data_value: String,
    pub correspondence_rid: u64,
    pub correspondence_type: String,
    #[serde(rename = "CorrespondentBussinessName")]
    pub correspondent_business_name: Option<String>,
    pub correspondent_first_name: Option<String>,
    pub correspondent_last_name: Option<String>,
    pub entity_identifier_type: String,
    pub entity_identifier_value: String,
    pub lni_relationship_name: String,
    pub messages: Vec<MessagePayload>,
    pub recipient_list: Vec<Value>,
}

impl ThreadPayload {
    /// Builds the save request from the session and the editor form.
    ///
    /// Stored thread and message ids are reused so repeated saves update the
    /// same server-side records; unset ids are sent as 0.
    pub fn build(state: &WorkflowState, form: &MessageForm) -> Result<Self, ComposeCoreError> {
        if !state.audience.is_selected() {
            return Err(ComposeCoreError::MissingAudience);
        }
        let entity = state
            .entity
            .as_ref()
            .ok_or(ComposeCoreError::MissingEntity)?;
        let relationship = state
            .relationship
            .as_ref()
            .ok_or(ComposeCoreError::MissingRelationship)?;
        let message = MessagePayload {
            is_draft: form.is_draft,
            is_internal: false,
            message_rid: state.message.message_rid.unwrap_or(0),
            text: form.message_body.clone(),
            is_response_required: form.response_required,
        };
        Ok(Self {
            title: form.subject.clone(),
            user: String::new(),
            from: state.username.clone(),
            is_internal: false,
            action_required: false,
            business_data_type: state.audience_type().to_string(),
            business_data_value: entity.record.business_data_value.clone(),
            correspondence_rid: state.thread.thread_id.unwrap_or(0),
            correspondence_type: state.audience.as_str().to_string(),
            correspondent_business_name: entity.record.business_name.clone(),
            correspondent_first_name: entity.record.first_name.clone(),
            correspondent_last_name: entity.record.last_name.clone(),
            entity_identifier_type: relationship.identifier_type.clone(),
            entity_identifier_value: relationship.identifier_value.clone(),
            lni_relationship_name: relationship.entity_relation.clone(),
            messages: vec![message],
            recipient_list: Vec::new(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Message entry of a thread save response.
pub struct SavedMessage {
    #[serde(
        rename = "_Rid",
        default,
        deserialize_with = "lenient_optional_u64"
    )]
    pub rid: Option<u64>,
    #[serde(rename = "_IsDraft", default)]
    pub is_draft: bool,
    #[serde(rename = "_Text", default)]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Thread returned by a successful save.
pub struct SavedThread {
    #[serde(
        rename = "_Rid",
        default,
        deserialize_with = "lenient_optional_u64"
    )]
    pub rid: Option<u64>,
    #[serde(rename = "_Messages", default)]
    pub messages: Vec<SavedMessage>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SavedThread {
    /// The message still flagged as draft, if any.
    ///
    /// Its presence is what distinguishes a saved draft from a sent message.
    pub fn draft(&self) -> Option<&SavedMessage> {
        self.messages.iter().find(|message| message.is_draft)
    }
}
