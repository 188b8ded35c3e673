use sea_orm::{ConnectionTrait, TransactionTrait};

use crate::{
    error::ServiceError,
    metrics, repository,
    services::broadcast_client::BroadcastClient,
    types::{envelope::decode_click_event, BusPushEnvelope},
};

/// Runs one bus delivery through the state machine in §4.E:
/// `RECEIVED → (permanent-bad) DROP`,
/// `RECEIVED → IDEMPOTENT-HIT → ACK`,
/// `RECEIVED → INCREMENTED → RECORDED → (broadcast best-effort) → ACK`,
/// `RECEIVED → INCREMENTED → RECORD-FAIL → NACK`.
///
/// `Ok(())` is the fresh-increment success path; an idempotent replay is
/// reported as `Err(ServiceError::AlreadyApplied)` so the caller (the
/// `/process` handler) can tell the two apart while still mapping both onto
/// a 200 per §7. Any other `Err` maps onto a non-2xx status per §7.
pub async fn process_message<C>(
    db: &C,
    broadcast: &BroadcastClient,
    envelope: &BusPushEnvelope,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait + TransactionTrait,
{
    let event = decode_click_event(envelope)?;
    let message_id = &envelope.message.message_id;

    if repository::processed_messages::is_processed(db, message_id).await? {
        metrics::PROCESSOR_IDEMPOTENT_HITS_TOTAL.inc();
        tracing::info!(message_id, "idempotent replay, skipping increment");
        return Err(ServiceError::AlreadyApplied);
    }

    repository::counters::increment(db, &event.country, &event.country).await?;
    metrics::PROCESSOR_INCREMENTS_TOTAL.inc();

    // Not folded into the increment transaction above: the known
    // double-increment window if the process dies here before the record
    // write lands (see design notes). The record write is a single-key set,
    // far less likely to fail than the transactional increment, which keeps
    // the window narrow in practice.
    repository::processed_messages::record_processed(db, message_id, &event.country).await?;

    match repository::counters::get_totals(db).await {
        Ok(totals) => {
            if let Err(err) = broadcast.notify_totals(&totals).await {
                tracing::warn!(message_id, error = %err, "broadcast notify failed");
            }
        }
        Err(err) => {
            tracing::warn!(message_id, error = %err, "totals read failed after increment, broadcast skipped");
        }
    }

    Ok(())
}
