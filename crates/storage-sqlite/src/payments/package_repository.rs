use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;

use amora_core::errors::Result;
use amora_core::payments::{CoinPackage, CoinPackageRepositoryTrait};

use super::model::CoinPackageDb;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::IntoCore;
use crate::schema::coin_packages::dsl::*;

pub struct CoinPackageRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CoinPackageRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CoinPackageRepositoryTrait for CoinPackageRepository {
    fn list_active(&self) -> Result<Vec<CoinPackage>> {
        let mut conn = get_connection(&self.pool)?;
        coin_packages
            .select(CoinPackageDb::as_select())
            .filter(is_active.eq(true))
            .load::<CoinPackageDb>(&mut conn)
            .into_core()
            .map(|rows| {
                let mut packages: Vec<CoinPackage> =
                    rows.into_iter().map(CoinPackage::from).collect();
                packages.sort_by(|a, b| a.price_total_etb.cmp(&b.price_total_etb));
                packages
            })
    }

    fn get_active(&self, package_id: &str) -> Result<Option<CoinPackage>> {
        let mut conn = get_connection(&self.pool)?;
        coin_packages
            .select(CoinPackageDb::as_select())
            .find(package_id)
            .filter(is_active.eq(true))
            .first::<CoinPackageDb>(&mut conn)
            .optional()
            .into_core()
            .map(|row| row.map(CoinPackage::from))
    }

    async fn create(&self, package: CoinPackage) -> Result<CoinPackage> {
        self.writer
            .exec(move |conn| {
                let row: CoinPackageDb = package.into();
                diesel::insert_into(coin_packages)
                    .values(&row)
                    .execute(conn)?;
                Ok(row.into())
            })
            .await
    }

    fn count(&self) -> Result<i64> {
        let mut conn = get_connection(&self.pool)?;
        coin_packages.count().get_result(&mut conn).into_core()
    }
}
