//! Failure taxonomy for compose flows.
//!
//! Every failing step maps to exactly one [`ComposeErrorKind`], which fixes
//! both the code shown on the acknowledgement prompt and the recovery run
//! once the user acknowledges it.

use smc_compose_core::ComposeCoreError;
use smc_contract::{BusAction, BusError};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ComposeErrorKind` values.
pub enum ComposeErrorKind {
    /// Deep-link lookup, relationship, subscription and work-position failures.
    Generic,
    /// Entity list loads: fast path, audience selection and search.
    EntityFetch,
    MessageSave { is_draft: bool },
    DeleteThread,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// What happens after the user acknowledges an error.
pub enum ComposeRecovery {
    /// Re-enter compose with no deep link.
    RestartCompose,
    /// Navigate to the inbox, resetting the session when `reset` is set.
    RouteToInbox { reset: bool },
    /// Keep the editor open and re-enable it.
    ReenableEditor,
}

impl ComposeErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            Self::Generic => "COMPOSE_GENERIC",
            Self::EntityFetch => "COMPOSE_ENTITY",
            Self::MessageSave { is_draft: true } => "COMPOSE_SAVE",
            Self::MessageSave { is_draft: false } => "COMPOSE_SEND",
            Self::DeleteThread => "COMPOSE_DELETE_THREAD",
        }
    }

    pub fn recovery(self) -> ComposeRecovery {
        match self {
            Self::Generic => ComposeRecovery::RestartCompose,
            Self::EntityFetch => ComposeRecovery::RouteToInbox { reset: true },
            Self::MessageSave { .. } => ComposeRecovery::ReenableEditor,
            Self::DeleteThread => ComposeRecovery::RouteToInbox { reset: false },
        }
    }
}

/// Enumerates supported `ComposeStepError` values.
#[derive(Debug, Error)]
pub enum ComposeStepError {
    #[error(transparent)]
    Bus(#[from] BusError),
    #[error("{action} resolved unsuccessfully")]
    Unsuccessful { action: BusAction },
    #[error("{action} returned malformed content: {source}")]
    MalformedContent {
        action: BusAction,
        source: serde_json::Error,
    },
    #[error("failed to encode {action} payload: {source}")]
    Encode {
        action: BusAction,
        source: serde_json::Error,
    },
    #[error("entity '{key}' is not among the loaded candidates")]
    UnknownEntity { key: String },
    #[error("identifier '{name}' is not offered by the selected entity")]
    UnknownRelationship { name: String },
    #[error("selected entity exposes no identifiers")]
    MissingIdentifiers,
    #[error(transparent)]
    Core(#[from] ComposeCoreError),
}
