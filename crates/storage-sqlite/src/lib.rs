//! SQLite ledger implementation for Amora.
//!
//! This crate is the only place where Diesel exists. It implements the
//! repository traits defined in `amora-core` and contains:
//! - connection pooling and embedded migrations
//! - the single-writer transaction actor every mutation goes through
//! - repository implementations for all ledger entities
//!
//! ```text
//! core (domain)
//!       │
//!       ▼
//! storage-sqlite (this crate)
//!       │
//!       ▼
//!   SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod audit;
pub mod gifts;
pub mod kyc;
pub mod payments;
pub mod subscriptions;
pub mod users;
pub mod wallets;
pub mod withdrawals;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, run_migrations, spawn_writer, DbConnection, DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from amora-core for convenience
pub use amora_core::errors::{DatabaseError, Error, Result};
