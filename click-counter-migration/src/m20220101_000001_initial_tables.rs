use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            CREATE TABLE counters (
                doc_id text NOT NULL,
                country text DEFAULT NULL,
                count bigint NOT NULL DEFAULT 0,
                PRIMARY KEY (doc_id)
            );

            CREATE TABLE processed_messages (
                message_id text NOT NULL,
                country text DEFAULT NULL,
                recorded_at timestamptz NOT NULL DEFAULT (now()),
                PRIMARY KEY (message_id)
            );

            INSERT INTO counters (doc_id, country, count) VALUES ('global', NULL, 0);
        "#;
        crate::from_sql(manager, sql).await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let sql = r#"
            DROP TABLE IF EXISTS processed_messages;
            DROP TABLE IF EXISTS counters;
        "#;
        crate::from_sql(manager, sql).await
    }
}
