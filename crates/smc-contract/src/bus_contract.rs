use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Enumerates the request bus actions issued by the compose workflow.
pub enum BusAction {
    #[serde(rename = "COMPOSE_ENTITY_CLAIM_REQUESTED")]
    EntityClaimRequested,
    #[serde(rename = "COMPOSE_ENTITY_ACCOUNT_REQUESTED")]
    EntityAccountRequested,
    #[serde(rename = "COMPOSE_SUBSCRIBED_REQUESTED")]
    SubscribedRequested,
    #[serde(rename = "COMPOSE_SUBSCRIBE_REQUESTED")]
    SubscribeRequested,
    #[serde(rename = "WORKPOS_CLAIM_REQUESTED")]
    WorkposClaimRequested,
    #[serde(rename = "WORKPOS_REVIEW_DATE_REQUESTED")]
    WorkposReviewDateRequested,
    #[serde(rename = "WORKPOS_ACCOUNT_REQUESTED")]
    WorkposAccountRequested,
    #[serde(rename = "COMPOSE_MESSAGE_SAVE_REQUESTED")]
    MessageSaveRequested,
    #[serde(rename = "DELETE_THREAD_REQUESTED")]
    DeleteThreadRequested,
}

impl BusAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EntityClaimRequested => "COMPOSE_ENTITY_CLAIM_REQUESTED",
            Self::EntityAccountRequested => "COMPOSE_ENTITY_ACCOUNT_REQUESTED",
            Self::SubscribedRequested => "COMPOSE_SUBSCRIBED_REQUESTED",
            Self::SubscribeRequested => "COMPOSE_SUBSCRIBE_REQUESTED",
            Self::WorkposClaimRequested => "WORKPOS_CLAIM_REQUESTED",
            Self::WorkposReviewDateRequested => "WORKPOS_REVIEW_DATE_REQUESTED",
            Self::WorkposAccountRequested => "WORKPOS_ACCOUNT_REQUESTED",
            Self::MessageSaveRequested => "COMPOSE_MESSAGE_SAVE_REQUESTED",
            Self::DeleteThreadRequested => "DELETE_THREAD_REQUESTED",
        }
    }
}

impl fmt::Display for BusAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload envelope handed to the bus. `params` is either a positional list
/// or a keyed map, depending on the action.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BusPayload {
    pub params: Value,
}

impl BusPayload {
    pub fn positional(params: Vec<Value>) -> Self {
        Self {
            params: Value::Array(params),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// One named action plus its payload.
pub struct BusRequest {
    pub action: BusAction,
    pub payload: BusPayload,
}

impl BusRequest {
    pub fn new(action: BusAction, params: Vec<Value>) -> Self {
        Self {
            action,
            payload: BusPayload::positional(params),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Resolved bus envelope. `success == false` is a resolved but unsuccessful call.
pub struct BusResponse {
    pub success: bool,
    #[serde(default)]
    pub content: Value,
}

impl BusResponse {
    pub fn ok(content: Value) -> Self {
        Self {
            success: true,
            content,
        }
    }

    pub fn unsuccessful(content: Value) -> Self {
        Self {
            success: false,
            content,
        }
    }
}

/// Enumerates supported `BusError` values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("request bus rejected {action}: {reason}")]
    Rejected { action: BusAction, reason: String },
    #[error("request bus transport unavailable for {action}")]
    Unavailable { action: BusAction },
}

/// Trait contract for the asynchronous request bus.
///
/// An `Err` is a rejected call; an `Ok` envelope may still report
/// `success == false`. Callers treat both as failures of the issuing step.
#[async_trait]
pub trait RequestBus: Send + Sync {
    async fn request(&self, request: &BusRequest) -> Result<BusResponse, BusError>;
}
