mod model;
mod repository;

pub use model::WithdrawalRequestDb;
pub use repository::WithdrawalRepository;
