//! KYC submissions with encrypted-at-rest document storage.

mod kyc_model;
mod kyc_service;
mod kyc_traits;

pub use kyc_model::{KycDecision, KycDocType, KycStatus, KycSubmission, NewKycSubmission};
pub use kyc_service::{KycService, SubmitOutcome};
pub use kyc_traits::{KycRepositoryTrait, ObjectStore};
