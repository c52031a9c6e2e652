pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod events;
pub mod kyc_store;
mod main_lib;
pub mod rate_limit;
pub mod scheduler;

pub use main_lib::{build_state, init_tracing, AppState};
