mod model;
mod repository;

pub use model::WalletDb;
pub use repository::WalletRepository;

pub(crate) use repository::{
    credit_balance_tx, credit_coins_tx, get_or_create_tx, get_wallet_tx, try_debit_coins_tx,
    update_money_tx,
};
