use actix_web::{web, HttpResponse, ResponseError};
use click_counter_logic::repository;

use crate::server::AppState;

/// `GET /count` (`spec.md §6`): a plain HTTP read of the current totals,
/// independent of any open session.
pub async fn get_count(state: web::Data<AppState>) -> HttpResponse {
    match repository::counters::get_totals(&state.db).await {
        Ok(totals) => HttpResponse::Ok().json(totals),
        Err(err) => err.error_response(),
    }
}
