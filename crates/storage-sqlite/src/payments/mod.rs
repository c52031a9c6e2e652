mod model;
mod package_repository;
mod repository;

pub use model::{CoinPackageDb, PaymentDb, ReceiptDb};
pub use package_repository::CoinPackageRepository;
pub use repository::PaymentRepository;
