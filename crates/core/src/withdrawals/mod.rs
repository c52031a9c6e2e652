//! Creator withdrawals: holds, review workflow, and payout settlement.

mod withdrawals_model;
mod withdrawals_service;
mod withdrawals_traits;

pub use withdrawals_model::{
    NewWithdrawal, WithdrawalMethod, WithdrawalRequest, WithdrawalStatus,
};
pub use withdrawals_service::WithdrawalService;
pub use withdrawals_traits::{WithdrawalRepositoryTrait, WithdrawalTotals};
