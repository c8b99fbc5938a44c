//! Error types shared by the camlink crates.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Fault raised by the media transport engine.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Offer/answer exchange could not be completed.
    #[error("Negotiation error: {0}")]
    Negotiation(String),
}
