//! User models.
//!
//! The dating-app profile proper lives outside this backend; the ledger
//! only needs identity, contact fields for provider payloads, the admin
//! bit, and the three purchasable perk flags with their expiries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub is_admin: bool,
    pub has_boost: bool,
    pub boost_expiry: Option<DateTime<Utc>>,
    pub can_see_likes: bool,
    pub likes_reveal_expiry: Option<DateTime<Utc>>,
    pub ad_free: bool,
    pub ad_free_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub api_token: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Authenticated caller, resolved from the bearer token and passed
/// explicitly through every service call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub is_admin: bool,
}

impl Principal {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }
}
