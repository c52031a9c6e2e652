mod model;
mod repository;

pub use model::{GiftDb, GiftTransactionDb};
pub use repository::{GiftRepository, GiftTransactionRepository};
