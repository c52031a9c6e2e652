//! Wallet service implementation.

use std::sync::Arc;

use async_trait::async_trait;

use super::wallets_model::{Wallet, WalletView};
use super::wallets_traits::{WalletRepositoryTrait, WalletServiceTrait};
use crate::constants::WALLET_RECENT_GIFTS;
use crate::errors::Result;
use crate::gifts::GiftTransactionRepositoryTrait;

/// Read-side service for the wallet endpoint.
pub struct WalletService {
    wallets: Arc<dyn WalletRepositoryTrait>,
    gift_transactions: Arc<dyn GiftTransactionRepositoryTrait>,
}

impl WalletService {
    pub fn new(
        wallets: Arc<dyn WalletRepositoryTrait>,
        gift_transactions: Arc<dyn GiftTransactionRepositoryTrait>,
    ) -> Self {
        Self {
            wallets,
            gift_transactions,
        }
    }
}

#[async_trait]
impl WalletServiceTrait for WalletService {
    async fn get_wallet_view(&self, user_id: &str) -> Result<WalletView> {
        let wallet = self.wallets.get_or_create(user_id).await?;
        let recent_gifts = self
            .gift_transactions
            .recent_for_user(user_id, WALLET_RECENT_GIFTS)?;

        Ok(WalletView {
            coin_balance: wallet.coin_balance,
            balance_etb: wallet.balance_etb,
            hold_etb: wallet.hold_etb,
            available_etb: wallet.available_etb(),
            kyc_level: wallet.kyc_level,
            withdrawals_blocked: wallet.withdrawals_blocked,
            recent_gifts,
        })
    }

    async fn get_wallet(&self, user_id: &str) -> Result<Wallet> {
        self.wallets.get_or_create(user_id).await
    }
}
