//! Collaborator contracts consumed by the compose workflow.
//!
//! Defines the request bus action/payload/response envelope, the ordered join
//! used when several actions are awaited together, the confirmation channel
//! suspend point, and the route guard consulted before any bus-issuing
//! transition. Scripted doubles for all three live in [`scripted`].

pub mod bus_contract;
pub mod bus_join;
pub mod confirmation;
pub mod route_guard;
pub mod scripted;

pub use bus_contract::*;
pub use bus_join::*;
pub use confirmation::*;
pub use route_guard::*;
pub use scripted::*;
