use thiserror::Error;

/// Failure of a single block-explorer call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Rate limited by block explorer: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    #[error("Invalid numeric format: {0:?}")]
    InvalidFormat(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Balance store unavailable: {0}")]
    Unavailable(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(e: rusqlite::Error) -> Self {
        PersistenceError::Unavailable(e.to_string())
    }
}

/// Any upstream failure while building an `AddrInfo`. No partial result exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AggregationError {
    #[error("Gateway call failed: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Balance cache update failed: {0}")]
    Persistence(#[from] PersistenceError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContractError {
    #[error("Contract call rejected: {0}")]
    Rejected(String),

    #[error("Contract transport error: {0}")]
    Transport(String),

    #[error("Contract call timed out after {0} seconds")]
    Timeout(u64),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("No wallet connected")]
    NotConnected,

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Invalid token id: {0}")]
    InvalidTokenId(String),

    #[error("Token {token_id} is owned by {owner:?}, not the connected account")]
    NotOwner {
        token_id: String,
        owner: alloy_primitives::Address,
    },

    #[error(transparent)]
    Contract(#[from] ContractError),
}
