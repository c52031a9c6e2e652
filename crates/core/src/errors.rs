//! Core error types for the Amora backend.
//!
//! This module defines database-agnostic error types. Storage-specific
//! errors (from Diesel, SQLite, etc.) are converted to these types by the
//! storage layer; the HTTP surface maps them onto status codes.

use rust_decimal::Decimal;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the payments backend.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Wallet KYC level is below the level the operation requires.
    #[error("KYC level insufficient")]
    KycInsufficient,

    /// Withdrawals are blocked on the wallet pending risk review.
    #[error("Withdrawals blocked pending risk review")]
    WithdrawalsBlocked,

    #[error("Sender is banned from sending gifts")]
    SenderBanned,

    #[error("Cannot send a gift to yourself")]
    SelfGift,

    #[error("Invalid gift: {0}")]
    InvalidGift(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),

    #[error("Invalid coin package: {0}")]
    InvalidPackage(String),

    #[error("Insufficient coin balance")]
    InsufficientCoins,

    #[error("Insufficient available balance")]
    InsufficientAvailable,

    #[error("Minimum withdrawal is {0} ETB")]
    BelowMinimumWithdrawal(Decimal),

    #[error("{0} withdrawal limit exceeded")]
    LimitExceeded(String),

    /// Provider could not be reached or answered with a server error.
    /// The operation may be retried.
    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider rejected the request. Not retryable as-is.
    #[error("Payment provider rejected the request: {0}")]
    ProviderRejected(String),

    /// A serializable ledger transaction could not be committed after
    /// retries. Callers should retry the whole operation.
    #[error("Ledger conflict: {0}")]
    LedgerConflict(String),

    /// An entity was not in the state the transition requires
    /// (e.g. approving a non-PENDING withdrawal).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid configuration value: {0}")]
    Config(String),

    #[error("Secret store error: {0}")]
    Secret(String),

    #[error("Money computation failed: {0}")]
    Money(#[from] MoneyError),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Database-agnostic error type for storage operations.
///
/// Uses `String` for the details so the storage layer can convert
/// driver-specific errors into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    #[error("Database query failed: {0}")]
    QueryFailed(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for user input and data parsing.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),

    #[error("Failed to parse decimal number: {0}")]
    DecimalParse(#[from] rust_decimal::Error),

    #[error("Failed to parse date/time: {0}")]
    DateTimeParse(#[from] chrono::ParseError),
}

/// Errors from the pure money arithmetic.
#[derive(Error, Debug)]
pub enum MoneyError {
    #[error("gateway rate must be less than 1, got {0}")]
    GatewayRateNotBelowOne(Decimal),
}

// === From implementations for common error types ===

impl From<rust_decimal::Error> for Error {
    fn from(err: rust_decimal::Error) -> Self {
        Error::Validation(ValidationError::DecimalParse(err))
    }
}

impl From<chrono::ParseError> for Error {
    fn from(err: chrono::ParseError) -> Self {
        Error::Validation(ValidationError::DateTimeParse(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Unexpected(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
