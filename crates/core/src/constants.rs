//! Shared constants for the payments domain.

/// The fiat currency every amount in the ledger is denominated in.
pub const CURRENCY_ETB: &str = "ETB";

/// Prefix for coin top-up transaction references (`coin-{user}-{random}`).
pub const COIN_TX_REF_PREFIX: &str = "coin";

/// Prefix for subscription transaction references (`sub-{plan}-{random}`).
pub const SUB_TX_REF_PREFIX: &str = "sub";

/// Providers cap transaction references at this length.
pub const TX_REF_MAX_LEN: usize = 50;

/// Gift sends accept a quantity in `1..=GIFT_MAX_QUANTITY`.
pub const GIFT_MAX_QUANTITY: u32 = 100;

/// Checkout customization limits imposed by the provider contract.
pub const CHECKOUT_TITLE_MAX_LEN: usize = 16;
pub const CHECKOUT_DESCRIPTION_MAX_LEN: usize = 50;

/// How many gift transactions the wallet view returns.
pub const WALLET_RECENT_GIFTS: i64 = 10;
