use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// The arm the user picked.
pub enum ConfirmDecision {
    Yes,
    No,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
/// Option descriptor for one arm; `text` overrides the default label.
pub struct ConfirmOption {
    #[serde(default)]
    pub text: Option<String>,
}

impl ConfirmOption {
    pub fn labelled(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
/// Modal sizing hint; `height == None` means auto.
pub struct ModalSizing {
    pub width: u32,
    #[serde(default)]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
/// Enumerates supported `ConfirmContent` values.
pub enum ConfirmContent {
    /// Ask to subscribe to an entity the user is not yet subscribed to.
    Subscribe {
        audience: String,
        entity_text: String,
        entity_identifier: String,
        entity_value: String,
        identifier_type: String,
        identifier_value: String,
        relationship_name: String,
    },
    /// Acknowledge a workflow failure.
    Error { code: String, support: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `ConfirmPrompt` presented on the confirmation channel.
pub struct ConfirmPrompt {
    pub content: ConfirmContent,
    #[serde(default)]
    pub no: Option<ConfirmOption>,
    #[serde(default)]
    pub yes: Option<ConfirmOption>,
    #[serde(default)]
    pub modal: Option<ModalSizing>,
}

impl ConfirmPrompt {
    /// Single-arm acknowledgement prompt labelled "Ok".
    pub fn acknowledge(content: ConfirmContent) -> Self {
        Self {
            content,
            no: None,
            yes: Some(ConfirmOption::labelled("Ok")),
            modal: None,
        }
    }

    pub fn is_acknowledgement(&self) -> bool {
        self.no.is_none() && self.yes.is_some()
    }
}

/// Trait contract for the confirmation channel.
///
/// `confirm` suspends until the user explicitly picks an arm and resolves
/// exactly once. Implementations must never resolve `No` for a prompt
/// without a `no` arm.
#[async_trait]
pub trait ConfirmationChannel: Send + Sync {
    async fn confirm(&self, prompt: ConfirmPrompt) -> ConfirmDecision;
}
