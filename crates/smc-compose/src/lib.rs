//! Compose workflow controller.
//!
//! Walks a user from audience selection through entity and relationship
//! resolution, the subscription gate and the work-position lookup into the
//! editor, then persists drafts, sends, or discards the thread. All backend
//! traffic goes through the [`smc_contract::RequestBus`]; user decisions go
//! through the [`smc_contract::ConfirmationChannel`].

mod compose_controller;
mod compose_entry;
pub mod compose_errors;
pub mod compose_events;
mod compose_persistence;
pub mod compose_replay;
mod compose_selection;
pub mod compose_signals;

pub use compose_controller::{
    ComposeCollaborators, ComposeController, ComposeSignalHandler, ComposeUser,
};
pub use compose_errors::*;
pub use compose_events::*;
pub use compose_replay::*;
pub use compose_signals::*;

#[cfg(test)]
mod tests;
