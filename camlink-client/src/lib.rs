pub mod link;
pub mod signaling;
pub mod transport;

pub use link::*;
pub use signaling::*;
pub use transport::*;
