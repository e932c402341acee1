//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect};

use super::converters::model_to_link;
use super::{SeaOrmStorage, map_db_err, retry};
use crate::storage::StoreResult;
use crate::storage::models::Link;

use migration::entities::link;

impl SeaOrmStorage {
    pub(super) async fn find_url(&self, short: &str) -> StoreResult<Option<String>> {
        self.find_column(short, link::Column::Url).await
    }

    pub(super) async fn find_password_hash(&self, short: &str) -> StoreResult<Option<String>> {
        self.find_column(short, link::Column::PasswordHash).await
    }

    /// 按 short 读取单个字符串列
    async fn find_column(&self, short: &str, column: link::Column) -> StoreResult<Option<String>> {
        let db = &self.db;
        let short_owned = short.to_string();

        retry::with_retry(
            &format!("find_column({}, {:?})", short, column),
            self.retry_config,
            || async {
                link::Entity::find()
                    .select_only()
                    .column(column)
                    .filter(link::Column::Short.eq(short_owned.as_str()))
                    .into_tuple::<String>()
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| map_db_err(e, short))
    }

    pub(super) async fn find_link(&self, short: &str) -> StoreResult<Option<Link>> {
        let db = &self.db;
        let short_owned = short.to_string();

        let model = retry::with_retry(&format!("find_link({})", short), self.retry_config, || async {
            link::Entity::find()
                .filter(link::Column::Short.eq(short_owned.as_str()))
                .one(db)
                .await
        })
        .await
        .map_err(|e| map_db_err(e, short))?;

        model.map(model_to_link).transpose()
    }

    pub(super) async fn count_links(&self) -> StoreResult<u64> {
        let db = &self.db;

        retry::with_retry("count", self.retry_config, || async {
            link::Entity::find().count(db).await
        })
        .await
        .map_err(|e| map_db_err(e, ""))
    }
}
