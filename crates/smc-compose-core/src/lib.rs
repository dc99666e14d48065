//! Data model for the compose workflow.
//!
//! Holds the single live `WorkflowState`, the audience mapping that keeps
//! identifier type and code consistent, entity and identifier records as the
//! backend returns them, the persisted thread/message payloads, work-position
//! shaping with department fallbacks, compose route parsing, and the
//! configuration file.

pub mod compose_audience;
pub mod compose_config;
pub mod compose_entity;
pub mod compose_route;
mod compose_serde;
pub mod compose_state;
pub mod compose_thread;
pub mod compose_workpos;

pub use compose_audience::*;
pub use compose_config::*;
pub use compose_entity::*;
pub use compose_route::*;
pub use compose_state::*;
pub use compose_thread::*;
pub use compose_workpos::*;

use thiserror::Error;

/// Enumerates supported `ComposeCoreError` values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeCoreError {
    #[error("unknown compose audience '{0}'")]
    UnknownAudience(String),
    #[error("unsupported business data type {0}")]
    UnsupportedBusinessDataType(u32),
    #[error("compose audience has not been selected")]
    MissingAudience,
    #[error("compose entity has not been selected")]
    MissingEntity,
    #[error("compose relationship has not been resolved")]
    MissingRelationship,
    #[error("saved draft response is missing its thread or message id")]
    MissingSavedIds,
}
