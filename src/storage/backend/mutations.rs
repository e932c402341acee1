//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations.

use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use tracing::{debug, info};

use super::converters::link_to_active_model;
use super::{SeaOrmStorage, map_db_err, retry};
use crate::storage::StoreResult;
use crate::storage::models::Link;

use migration::entities::link;

impl SeaOrmStorage {
    /// 插入新链接
    ///
    /// 不经过重试：连接错误后重放 INSERT 可能把自己的上一次写入误判为冲突
    pub(super) async fn insert_link(&self, new_link: &Link) -> StoreResult<()> {
        link::Entity::insert(link_to_active_model(new_link))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| map_db_err(e, &new_link.short))?;

        debug!("Link inserted: {}", new_link.short);
        Ok(())
    }

    pub(super) async fn delete_expired_before(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let db = &self.db;

        let result = retry::with_retry("delete_expired", self.retry_config, || async {
            link::Entity::delete_many()
                .filter(link::Column::ExpireAt.lte(now))
                .exec(db)
                .await
        })
        .await
        .map_err(|e| map_db_err(e, ""))?;

        Ok(result.rows_affected)
    }

    pub(super) async fn delete_short(&self, short: &str) -> StoreResult<bool> {
        let db = &self.db;
        let short_owned = short.to_string();

        let result = retry::with_retry(
            &format!("delete_short({})", short),
            self.retry_config,
            || async {
                link::Entity::delete_many()
                    .filter(link::Column::Short.eq(short_owned.as_str()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| map_db_err(e, short))?;

        if result.rows_affected > 0 {
            info!("Link deleted: {}", short);
        }
        Ok(result.rows_affected > 0)
    }
}
