use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use amora_core::errors::Result;
use amora_core::users::{NewUser, User, UserRepositoryTrait};

use super::model::UserDb;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::users::dsl::*;

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    async fn create(&self, new_user: NewUser) -> Result<User> {
        self.writer
            .exec(move |conn| {
                let user_db: UserDb = new_user.into();
                diesel::insert_into(users).values(&user_db).execute(conn)?;
                Ok(user_db.into())
            })
            .await
    }

    fn get_by_id(&self, user_id: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        users
            .select(UserDb::as_select())
            .find(user_id)
            .first::<UserDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(User::from))
    }

    fn get_by_token(&self, token: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        users
            .select(UserDb::as_select())
            .filter(api_token.eq(token))
            .first::<UserDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(User::from))
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let mut conn = get_connection(&self.pool)?;
        users.select(id).load::<String>(&mut conn).into_core()
    }
}
