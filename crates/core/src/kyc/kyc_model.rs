//! KYC models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Error, ValidationError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycDocType {
    Nid,
    Passport,
}

impl KycDocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycDocType::Nid => "NID",
            KycDocType::Passport => "PASSPORT",
        }
    }
}

impl std::str::FromStr for KycDocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NID" => Ok(KycDocType::Nid),
            "PASSPORT" => Ok(KycDocType::Passport),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown document type '{other}'"
            ))
            .into()),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    Pending,
    Verified,
    Rejected,
}

impl KycStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KycStatus::Pending => "PENDING",
            KycStatus::Verified => "VERIFIED",
            KycStatus::Rejected => "REJECTED",
        }
    }
}

impl std::str::FromStr for KycStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(KycStatus::Pending),
            "VERIFIED" => Ok(KycStatus::Verified),
            "REJECTED" => Ok(KycStatus::Rejected),
            other => Err(ValidationError::InvalidInput(format!(
                "unknown KYC status '{other}'"
            ))
            .into()),
        }
    }
}

/// Review decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycDecision {
    Verified,
    Rejected,
}

/// One identity submission. Document and selfie fields hold object-store
/// keys; the bytes behind them are ciphertext at rest.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmission {
    pub id: String,
    pub user_id: String,
    pub doc_type: KycDocType,
    pub document_path: String,
    pub selfie_path: String,
    pub status: KycStatus,
    pub notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewKycSubmission {
    pub user_id: String,
    pub doc_type: KycDocType,
    pub document_path: String,
    pub selfie_path: String,
}
