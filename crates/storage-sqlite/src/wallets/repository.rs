use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::SqliteConnection;
use rust_decimal::Decimal;

use amora_core::errors::Result;
use amora_core::wallets::{Wallet, WalletRepositoryTrait};

use super::model::WalletDb;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::wallets;
use crate::utils::{dec_to_text, now_naive};

pub struct WalletRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl WalletRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl WalletRepositoryTrait for WalletRepository {
    async fn get_or_create(&self, user_id: &str) -> Result<Wallet> {
        // Fast path: most calls find an existing row.
        if let Some(wallet) = self.get_by_user(user_id)? {
            return Ok(wallet);
        }
        let owner = user_id.to_string();
        self.writer
            .exec(move |conn| Ok(get_or_create_tx(conn, &owner)?.into()))
            .await
    }

    fn get_by_user(&self, user_id: &str) -> Result<Option<Wallet>> {
        let mut conn = get_connection(&self.pool)?;
        wallets::table
            .select(WalletDb::as_select())
            .filter(wallets::user_id.eq(user_id))
            .first::<WalletDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(Wallet::from))
    }

    async fn set_withdrawals_blocked(&self, user_id: &str, blocked: bool) -> Result<bool> {
        let owner = user_id.to_string();
        self.writer
            .exec(move |conn| {
                let wallet = get_or_create_tx(conn, &owner)?;
                if wallet.withdrawals_blocked != blocked {
                    diesel::update(wallets::table.filter(wallets::user_id.eq(&owner)))
                        .set((
                            wallets::withdrawals_blocked.eq(blocked),
                            wallets::updated_at.eq(now_naive()),
                        ))
                        .execute(conn)?;
                }
                Ok(wallet.withdrawals_blocked)
            })
            .await
    }

    async fn raise_kyc_level(&self, user_id: &str, level: u8) -> Result<Wallet> {
        let owner = user_id.to_string();
        self.writer
            .exec(move |conn| {
                let wallet = get_or_create_tx(conn, &owner)?;
                if wallet.kyc_level < i32::from(level) {
                    diesel::update(wallets::table.filter(wallets::user_id.eq(&owner)))
                        .set((
                            wallets::kyc_level.eq(i32::from(level)),
                            wallets::updated_at.eq(now_naive()),
                        ))
                        .execute(conn)?;
                }
                Ok(get_wallet_tx(conn, &owner)?.into())
            })
            .await
    }

    async fn set_banned(&self, user_id: &str, banned: bool) -> Result<()> {
        let owner = user_id.to_string();
        self.writer
            .exec(move |conn| {
                get_or_create_tx(conn, &owner)?;
                diesel::update(wallets::table.filter(wallets::user_id.eq(&owner)))
                    .set((
                        wallets::is_banned.eq(banned),
                        wallets::updated_at.eq(now_naive()),
                    ))
                    .execute(conn)?;
                Ok(())
            })
            .await
    }
}

// Transaction-scoped helpers shared by the composite ledger operations.
// All of them run on the writer connection, inside its transaction.

pub(crate) fn get_wallet_tx(
    conn: &mut SqliteConnection,
    owner: &str,
) -> std::result::Result<WalletDb, StorageError> {
    Ok(wallets::table
        .select(WalletDb::as_select())
        .filter(wallets::user_id.eq(owner))
        .first::<WalletDb>(conn)?)
}

pub(crate) fn get_or_create_tx(
    conn: &mut SqliteConnection,
    owner: &str,
) -> std::result::Result<WalletDb, StorageError> {
    if let Some(existing) = wallets::table
        .select(WalletDb::as_select())
        .filter(wallets::user_id.eq(owner))
        .first::<WalletDb>(conn)
        .optional()?
    {
        return Ok(existing);
    }
    let fresh = WalletDb::fresh(owner);
    diesel::insert_into(wallets::table)
        .values(&fresh)
        .execute(conn)?;
    Ok(fresh)
}

/// Unconditional coin credit (top-up settlement).
pub(crate) fn credit_coins_tx(
    conn: &mut SqliteConnection,
    owner: &str,
    coins: u64,
) -> std::result::Result<WalletDb, StorageError> {
    diesel::update(wallets::table.filter(wallets::user_id.eq(owner)))
        .set((
            wallets::coin_balance.eq(wallets::coin_balance + coins as i64),
            wallets::updated_at.eq(now_naive()),
        ))
        .execute(conn)?;
    get_wallet_tx(conn, owner)
}

/// Conditional coin debit in a single statement: affects one row only
/// when the current balance covers the amount. Guards concurrent spends.
pub(crate) fn try_debit_coins_tx(
    conn: &mut SqliteConnection,
    owner: &str,
    coins: u64,
) -> std::result::Result<bool, StorageError> {
    let updated = diesel::update(
        wallets::table.filter(
            wallets::user_id
                .eq(owner)
                .and(wallets::coin_balance.ge(coins as i64)),
        ),
    )
    .set((
        wallets::coin_balance.eq(wallets::coin_balance - coins as i64),
        wallets::updated_at.eq(now_naive()),
    ))
    .execute(conn)?;
    Ok(updated == 1)
}

/// Credits creator earnings.
pub(crate) fn credit_balance_tx(
    conn: &mut SqliteConnection,
    owner: &str,
    amount: Decimal,
) -> std::result::Result<WalletDb, StorageError> {
    let wallet = get_wallet_tx(conn, owner)?;
    let next = wallet.balance() + amount;
    update_money_tx(conn, owner, next, wallet.hold())?;
    get_wallet_tx(conn, owner)
}

/// Writes both money columns. Fiat math happens in `Decimal` inside the
/// transaction; the single-writer actor makes read-modify-write safe.
pub(crate) fn update_money_tx(
    conn: &mut SqliteConnection,
    owner: &str,
    balance: Decimal,
    hold: Decimal,
) -> std::result::Result<(), StorageError> {
    diesel::update(wallets::table.filter(wallets::user_id.eq(owner)))
        .set((
            wallets::balance_etb.eq(dec_to_text(balance)),
            wallets::hold_etb.eq(dec_to_text(hold)),
            wallets::updated_at.eq(now_naive()),
        ))
        .execute(conn)?;
    Ok(())
}
