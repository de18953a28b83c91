/// Shared error type used across all World Control Protocol crates.
///
/// Every mutating kernel operation returns one of these instead of panicking;
/// the RPC layer (`wcp-server`) maps each variant to a stable error code.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("validation: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("cross-world reference: {0}")]
    CrossWorld(String),

    #[error("not here: {0}")]
    NotHere(String),

    #[error("not holding: {0}")]
    NotHolding(String),

    #[error("no area: {0}")]
    NoArea(String),

    #[error("slot occupied: {0}")]
    SlotOccupied(String),

    #[error("both hands full")]
    BothHandsFull,

    #[error("already owned: {0}")]
    AlreadyOwned(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("database: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("fatal: {0}")]
    Fatal(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Stable application-level RPC error code (positive range, reserved
    /// below `-32700..-32600` which are the JSON-RPC protocol codes).
    pub fn rpc_code(&self) -> i64 {
        match self {
            Error::Validation(_) => 1000,
            Error::NotFound(_) => 1001,
            Error::CrossWorld(_) => 1002,
            Error::NotHere(_) => 1003,
            Error::NotHolding(_) => 1004,
            Error::NoArea(_) => 1005,
            Error::SlotOccupied(_) => 1006,
            Error::BothHandsFull => 1007,
            Error::AlreadyOwned(_) => 1008,
            Error::Timeout(_) => 1009,
            Error::Conflict(_) => 1010,
            Error::ParseError(_) => 1011,
            Error::UnknownAction(_) => 1012,
            Error::Database(_) => 1013,
            Error::Json(_) => 1014,
            Error::Io(_) => 1015,
            Error::Config(_) => 1016,
            Error::Fatal(_) => 1017,
            Error::Other(_) => 1099,
        }
    }
}
