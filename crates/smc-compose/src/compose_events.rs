use serde::{Deserialize, Serialize};
use smc_compose_core::{DeepLink, MessageForm};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
/// User and router triggers accepted by the workflow controller.
pub enum ComposeEvent {
    /// Navigation into compose, optionally carrying a deep link.
    Open {
        #[serde(default)]
        link: Option<DeepLink>,
    },
    /// Navigation away from compose.
    Closed,
    AudienceSelected {
        audience: String,
    },
    /// `None` clears the search without a lookup.
    EntitySearch {
        #[serde(default)]
        term: Option<String>,
    },
    EntitySelected {
        business_key: String,
    },
    RelationshipSelected {
        name: String,
    },
    /// Save a draft or send, depending on `form.is_draft`.
    SaveMessage {
        form: MessageForm,
    },
    Delete,
}

impl ComposeEvent {
    pub fn open(link: Option<DeepLink>) -> Self {
        Self::Open { link }
    }

    /// Action name reported to the route guard.
    pub fn action_name(&self) -> &'static str {
        match self {
            Self::Open { .. } => "COMPOSE_OPEN",
            Self::Closed => "COMPOSE_CLOSED",
            Self::AudienceSelected { .. } => "COMPOSE_AUDIENCE_SELECTED",
            Self::EntitySearch { .. } => "COMPOSE_ENTITY_SEARCH",
            Self::EntitySelected { .. } => "COMPOSE_ENTITY_SELECTED",
            Self::RelationshipSelected { .. } => "COMPOSE_RELATIONSHIP_SELECTED",
            Self::SaveMessage { form } if form.is_draft => "COMPOSE_SAVE",
            Self::SaveMessage { .. } => "COMPOSE_SEND",
            Self::Delete => "COMPOSE_DELETE",
        }
    }

    /// Whether handling the trigger may issue a bus request. Only these
    /// triggers consult the route guard.
    pub fn issues_bus_request(&self) -> bool {
        match self {
            Self::Closed => false,
            Self::EntitySearch { term } => term.is_some(),
            _ => true,
        }
    }
}
