//! Wallet repository and service traits.

use async_trait::async_trait;

use super::{Wallet, WalletView};
use crate::errors::Result;

/// Persistence contract for wallets.
///
/// Balance *mutations* are not exposed here: they only happen inside the
/// composite ledger operations (settlement, gift send, withdrawal
/// lifecycle) so that every movement stays atomic with its records.
#[async_trait]
pub trait WalletRepositoryTrait: Send + Sync {
    /// Fetches the user's wallet, creating an empty one on first touch.
    async fn get_or_create(&self, user_id: &str) -> Result<Wallet>;

    fn get_by_user(&self, user_id: &str) -> Result<Option<Wallet>>;

    /// Toggles the risk flag. Returns the previous value.
    async fn set_withdrawals_blocked(&self, user_id: &str, blocked: bool) -> Result<bool>;

    /// Raises `kyc_level` to at least `level`; never lowers it.
    async fn raise_kyc_level(&self, user_id: &str, level: u8) -> Result<Wallet>;

    /// Marks a wallet banned/unbanned.
    async fn set_banned(&self, user_id: &str, banned: bool) -> Result<()>;
}

#[async_trait]
pub trait WalletServiceTrait: Send + Sync {
    /// Wallet snapshot plus recent gift activity for the owner.
    async fn get_wallet_view(&self, user_id: &str) -> Result<WalletView>;

    /// Bare wallet, created on first touch.
    async fn get_wallet(&self, user_id: &str) -> Result<Wallet>;
}
