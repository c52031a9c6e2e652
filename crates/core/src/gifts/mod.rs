//! Gift catalog and the atomic gift send engine.

mod gifts_model;
mod gifts_service;
mod gifts_traits;

pub use gifts_model::{
    Gift, GiftSendOutcome, GiftSendRequest, GiftTransaction, GiftTransactionStatus, NewGift,
};
pub use gifts_service::GiftService;
pub use gifts_traits::{GiftRepositoryTrait, GiftTransactionRepositoryTrait, RecordGiftSend};
