//! Database model for users.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use amora_core::users::{NewUser, User};

use crate::utils::{new_id, now_naive, to_utc};

#[derive(Queryable, Insertable, Identifiable, Selectable, AsChangeset, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDb {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub api_token: String,
    pub is_admin: bool,
    pub has_boost: bool,
    pub boost_expiry: Option<NaiveDateTime>,
    pub can_see_likes: bool,
    pub likes_reveal_expiry: Option<NaiveDateTime>,
    pub ad_free: bool,
    pub ad_free_expiry: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<UserDb> for User {
    fn from(db: UserDb) -> Self {
        Self {
            id: db.id,
            email: db.email,
            first_name: db.first_name,
            last_name: db.last_name,
            phone: db.phone,
            is_admin: db.is_admin,
            has_boost: db.has_boost,
            boost_expiry: db.boost_expiry.map(to_utc),
            can_see_likes: db.can_see_likes,
            likes_reveal_expiry: db.likes_reveal_expiry.map(to_utc),
            ad_free: db.ad_free,
            ad_free_expiry: db.ad_free_expiry.map(to_utc),
            created_at: to_utc(db.created_at),
            updated_at: to_utc(db.updated_at),
        }
    }
}

impl From<NewUser> for UserDb {
    fn from(new_user: NewUser) -> Self {
        let now = now_naive();
        Self {
            id: new_id(),
            email: new_user.email,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            phone: new_user.phone,
            api_token: new_user.api_token,
            is_admin: new_user.is_admin,
            has_boost: false,
            boost_expiry: None,
            can_see_likes: false,
            likes_reveal_expiry: None,
            ad_free: false,
            ad_free_expiry: None,
            created_at: now,
            updated_at: now,
        }
    }
}
