mod model;
mod repository;

pub use model::KycSubmissionDb;
pub use repository::KycRepository;
