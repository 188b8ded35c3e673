use entity::processed_messages;
use sea_orm::{ConnectionTrait, DbBackend, EntityTrait, Statement};

use crate::error::ServiceError;

/// `IsProcessed` (§4.B): "not found" means false.
pub async fn is_processed<C>(db: &C, message_id: &str) -> Result<bool, ServiceError>
where
    C: ConnectionTrait,
{
    let found = processed_messages::Entity::find_by_id(message_id.to_string())
        .one(db)
        .await?;
    Ok(found.is_some())
}

const UPSERT_RECORD_SQL: &str = r#"
    INSERT INTO processed_messages (message_id, country, recorded_at)
    VALUES ($1, $2, now())
    ON CONFLICT (message_id) DO NOTHING
"#;

/// Unconditional set of the processed-message record (§4.B
/// `RecordProcessed`). Idempotent by construction: a redelivery that lands
/// here after a crash between increment and record simply no-ops.
pub async fn record_processed<C>(db: &C, message_id: &str, country: &str) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    db.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        UPSERT_RECORD_SQL,
        [message_id.to_string().into(), country.to_string().into()],
    ))
    .await?;
    Ok(())
}
