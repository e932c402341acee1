use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

/// short 列的最大长度，与配置校验中的上限保持一致
const MAX_SHORT_COLUMN_LENGTH: u32 = 255;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// MySQL 的 TIMESTAMP 上限是 2038 年，放不下 "永不过期" 的哨兵时间，改用 DATETIME
fn timestamp_column(backend: DatabaseBackend, column: Links) -> ColumnDef {
    let mut def = ColumnDef::new(column);
    if backend == DatabaseBackend::MySql {
        def.date_time();
    } else {
        def.timestamp_with_time_zone();
    }
    def.not_null();
    def
}

/// MySQL 默认排序规则不区分大小写，"Abc" 与 "abc" 会撞唯一键
fn short_column(backend: DatabaseBackend) -> ColumnDef {
    let mut def = ColumnDef::new(Links::Short);
    def.string_len(MAX_SHORT_COLUMN_LENGTH).not_null().unique_key();
    if backend == DatabaseBackend::MySql {
        def.extra("COLLATE utf8mb4_bin");
    }
    def
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let backend = manager.get_database_backend();

        // 创建 links 表
        manager
            .create_table(
                Table::create()
                    .table(Links::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Links::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(&mut short_column(backend))
                    .col(ColumnDef::new(Links::Url).text().not_null())
                    .col(&mut timestamp_column(backend, Links::CreatedAt))
                    .col(&mut timestamp_column(backend, Links::ExpireAt))
                    .col(
                        ColumnDef::new(Links::PasswordHash)
                            .string_len(128)
                            .not_null()
                            .default(""),
                    )
                    .to_owned(),
            )
            .await?;

        // 垃圾回收按 expire_at 范围删除
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_links_expire_at")
                    .table(Links::Table)
                    .col(Links::ExpireAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_links_expire_at")
                    .table(Links::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Links::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden, Clone, Copy)]
enum Links {
    Table,
    Id,
    Short,
    Url,
    CreatedAt,
    ExpireAt,
    PasswordHash,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_sql(backend: DatabaseBackend) -> String {
        let stmt = Table::create()
            .table(Links::Table)
            .col(&mut short_column(backend))
            .to_owned();
        match backend {
            DatabaseBackend::MySql => stmt.to_string(MysqlQueryBuilder),
            DatabaseBackend::Postgres => stmt.to_string(PostgresQueryBuilder),
            _ => stmt.to_string(SqliteQueryBuilder),
        }
    }

    #[test]
    fn test_mysql_short_column_is_case_sensitive() {
        let sql = create_sql(DatabaseBackend::MySql);
        assert!(sql.contains("COLLATE utf8mb4_bin"), "{}", sql);
    }

    #[test]
    fn test_other_backends_keep_default_collation() {
        assert!(!create_sql(DatabaseBackend::Sqlite).contains("COLLATE"));
        assert!(!create_sql(DatabaseBackend::Postgres).contains("COLLATE"));
    }
}
