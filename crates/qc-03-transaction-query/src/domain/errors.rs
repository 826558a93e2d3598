//! # Domain Errors
//!
//! Error types for the transaction query subsystem.
//!
//! - `ValidationError`: the request was malformed (HTTP 400, never cached)
//! - `StoreError`: the pools could not be read (HTTP 500, never cached)
//! - `CacheError`: the response cache failed (logged, never surfaced)
//! - `PoolError`: a pool mutation was rejected

use shared_bus::TransientPool;
use thiserror::Error;

/// A request parameter failed validation.
///
/// Every variant names the offending parameter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Unknown parameter: {parameter}")]
    UnknownParameter { parameter: String },

    #[error("{parameter}: parameter may not be repeated")]
    Repeated { parameter: String },

    #[error("{parameter}: comma-separated values are not supported, repeat the parameter instead")]
    CommaSeparated { parameter: String },

    #[error("{parameter}: value must not be empty")]
    Empty { parameter: String },

    #[error("{parameter}: required parameter is missing")]
    Missing { parameter: String },

    #[error("{parameter}: expected an integer, got '{value}'")]
    NotAnInteger { parameter: String, value: String },

    #[error("{parameter}: {value} is outside the accepted range [{min}, {max}]")]
    OutOfRange {
        parameter: String,
        value: i128,
        min: i128,
        max: i128,
    },

    #[error("{parameter}: {value} precedes the chain epoch ({epoch})")]
    BeforeEpoch {
        parameter: String,
        value: i128,
        epoch: i128,
    },

    #[error("{parameter}: expected {expected}")]
    InvalidFormat {
        parameter: String,
        expected: &'static str,
    },

    #[error("sort: '{value}' is not a supported field:direction pair")]
    InvalidSort { value: String },

    #[error("type: {value} is not a known transaction type")]
    UnknownTransactionType { value: i128 },
}

impl ValidationError {
    /// Name of the parameter that failed.
    pub fn parameter(&self) -> &str {
        match self {
            Self::UnknownParameter { parameter }
            | Self::Repeated { parameter }
            | Self::CommaSeparated { parameter }
            | Self::Empty { parameter }
            | Self::Missing { parameter }
            | Self::NotAnInteger { parameter, .. }
            | Self::OutOfRange { parameter, .. }
            | Self::BeforeEpoch { parameter, .. }
            | Self::InvalidFormat { parameter, .. } => parameter,
            Self::InvalidSort { .. } => "sort",
            Self::UnknownTransactionType { .. } => "type",
        }
    }
}

/// The pool store could not produce a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Transaction store unavailable: {message}")]
    Unavailable { message: String },
}

/// Failure of a query, split by who is at fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Response cache failures. Never fatal to a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Cache unavailable: {message}")]
    Unavailable { message: String },

    #[error("Cache serialization error: {message}")]
    Serialization { message: String },
}

/// Pool a transaction lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Confirmed,
    Transient(TransientPool),
}

impl std::fmt::Display for PoolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirmed => write!(f, "confirmed"),
            Self::Transient(pool) => write!(f, "{}", pool),
        }
    }
}

/// Pool mutation rejected; the pools are left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("Transaction {id} already present in the {pool} pool")]
    DuplicateTransaction { id: String, pool: PoolKind },

    #[error("Transaction {id} not found in the {pool} pool")]
    NotInPool { id: String, pool: TransientPool },

    #[error("Block height {height} does not extend the confirmed tip {tip}")]
    NonIncreasingHeight { height: u64, tip: u64 },
}

/// Configuration rejected at construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid cache configuration: {0}")]
    InvalidCache(String),
}
