use actix_web::{web, HttpResponse};
use click_counter_logic::types::{CountryTotal, ServerFrame};
use serde::Deserialize;
use std::collections::HashMap;

use crate::server::AppState;

/// Body the processor posts to the front's internal broadcast endpoint
/// (`spec.md §4.F`).
#[derive(Debug, Deserialize)]
pub struct BroadcastRequest {
    global: i64,
    #[serde(default)]
    countries: HashMap<String, CountryTotal>,
}

/// `POST /internal/broadcast`: not exposed to browser clients in
/// production (`spec.md §6` — reachable only from the processor's network),
/// but carries no separate auth of its own since the spec defines none.
pub async fn broadcast(state: web::Data<AppState>, body: web::Json<BroadcastRequest>) -> HttpResponse {
    let body = body.into_inner();
    state.hub.broadcast(ServerFrame::CounterUpdate {
        global: body.global,
        countries: body.countries,
    });
    HttpResponse::Ok().finish()
}
