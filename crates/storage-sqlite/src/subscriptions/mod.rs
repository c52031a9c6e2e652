mod model;
mod repository;

pub use model::SubscriptionPurchaseDb;
pub use repository::SubscriptionRepository;
