mod heartbeat;
mod signaling_channel;
mod signaling_client;
mod signaling_event;

pub use heartbeat::*;
pub use signaling_channel::*;
pub use signaling_client::*;
pub use signaling_event::*;
