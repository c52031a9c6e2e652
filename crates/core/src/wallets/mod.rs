//! Coin wallets and creator earnings balances.

mod wallets_model;
mod wallets_service;
mod wallets_traits;

pub use wallets_model::{Wallet, WalletView};
pub use wallets_service::WalletService;
pub use wallets_traits::{WalletRepositoryTrait, WalletServiceTrait};
