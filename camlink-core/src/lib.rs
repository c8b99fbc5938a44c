pub mod config;
pub mod error;
pub mod model;

pub use config::{Environment, LinkConfig};
pub use error::{Error, Result};
pub use model::*;
