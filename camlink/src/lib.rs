pub use camlink_core::{Environment, Error, LinkConfig, Result};

pub mod model {
    pub use camlink_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use camlink_client::*;
}

#[cfg(feature = "client")]
pub use camlink_client::{LinkHandle, LinkManager, LinkSnapshot};
