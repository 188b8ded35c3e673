//! `POST /process` (`spec.md §4.D`): the bus push handler. Receives the
//! push envelope, delegates the state machine in `spec.md §4.E` to
//! `click_counter_logic::services::processor`, and maps the result onto
//! the HTTP status the bus reads as its retry signal (`spec.md §7`).

use actix_web::{web, HttpResponse, ResponseError};
use click_counter_logic::{services::processor, types::BusPushEnvelope, ServiceError};

use crate::server::AppState;

pub async fn process(
    state: web::Data<AppState>,
    envelope: web::Json<BusPushEnvelope>,
) -> HttpResponse {
    let message_id = envelope.message.message_id.clone();
    match processor::process_message(&state.db, &state.broadcast, &envelope).await {
        // §7: `AlreadyApplied` is an idempotent-replay ack, not an error —
        // it maps onto the same 200 a fresh increment gets, with no body.
        Ok(()) | Err(ServiceError::AlreadyApplied) => HttpResponse::Ok().finish(),
        Err(err) => {
            match &err {
                ServiceError::PermanentBadInput(reason) => {
                    tracing::warn!(message_id, reason, "dropping permanently bad bus delivery");
                }
                other => {
                    tracing::error!(message_id, error = %other, "retriable processor failure");
                }
            }
            err.error_response()
        }
    }
}
