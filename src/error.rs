use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while folding trades into a `Holding` or loading configuration.
///
/// Accounting errors carry the asset and the timestamp of the offending record so the
/// caller can decide whether to skip that asset's report or abort the run.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Non-positive quantity or price, or a negative fee.
    #[error("malformed record for {asset} at {timestamp}: {reason}")]
    MalformedRecord {
        asset: String,
        timestamp: NaiveDateTime,
        reason: String,
    },

    /// A sell or withdraw larger than the quantity currently held.
    #[error("insufficient quantity for {asset} at {timestamp}: requested {requested}, held {held}")]
    InsufficientQuantity {
        asset: String,
        timestamp: NaiveDateTime,
        requested: Decimal,
        held: Decimal,
    },

    /// A record older than the one applied before it for the same asset.
    #[error("unordered input for {asset}: {current} follows {previous}")]
    UnorderedInput {
        asset: String,
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    /// A result too large for `Decimal`.
    #[error("decimal overflow for {asset}: {context}")]
    Overflow { asset: String, context: String },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A text line that could not be turned into a `Transaction`.
    #[error("cannot parse '{input}': {reason}")]
    RecordParse { input: String, reason: String },
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Asset the error belongs to, if it came out of an accounting fold.
    pub fn asset(&self) -> Option<&str> {
        match self {
            EngineError::MalformedRecord { asset, .. }
            | EngineError::InsufficientQuantity { asset, .. }
            | EngineError::UnorderedInput { asset, .. }
            | EngineError::Overflow { asset, .. } => Some(asset),
            _ => None,
        }
    }
}
