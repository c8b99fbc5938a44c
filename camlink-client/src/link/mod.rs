mod backoff;
mod link_command;
mod link_event;
mod link_handle;
mod link_manager;
mod link_snapshot;
mod negotiation;
mod session_factory;

pub use backoff::*;
pub use link_command::*;
pub use link_event::*;
pub use link_handle::*;
pub use link_manager::*;
pub use link_snapshot::*;
pub use negotiation::*;
pub use session_factory::*;
