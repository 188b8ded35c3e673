//! Per-session inbound/outbound loops and the upgrade endpoint
//! (`spec.md §4.G`).

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_ws::AggregatedMessage;
use click_counter_logic::{
    metrics,
    services::ratelimit::RateLimiter,
    types::{click_event::ClickEvent, ClientFrame, ServerFrame},
    ServiceError,
};
use futures_util::StreamExt;
use sea_orm::DatabaseConnection;

use crate::server::AppState;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(60);

/// Session-upgrade endpoint. Resolves the session's country once (per
/// `spec.md §4.A`: geolocation is resolved once per session, not per
/// click), registers with the hub, and spawns the inbound and outbound
/// tasks (`§5`).
pub async fn session_upgrade(
    req: HttpRequest,
    body: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let ip = extract_client_ip(&req);
    let country = state.geo.resolve(&ip).await;

    let (response, session, msg_stream) = actix_ws::handle(&req, body)?;
    let msg_stream = msg_stream
        .aggregate_continuations()
        .max_continuation_size(64 * 1024);

    let joined = state
        .hub
        .register(state.session.outbox_capacity, state.session.rate_limit_cap)
        .await;

    if joined.outbox.try_send(ServerFrame::AuthToken { token: joined.token.to_string() }).is_err() {
        tracing::error!("could not enqueue auth_token on a freshly created outbox");
    }

    actix_web::rt::spawn(outbound_loop(session.clone(), joined.outbox_rx));
    actix_web::rt::spawn(inbound_loop(
        joined.id,
        ip,
        country,
        joined.outbox,
        joined.rate_limiter,
        session,
        msg_stream,
        state,
    ));

    Ok(response)
}

/// Single writer to the socket. Drains the outbox until it closes — which
/// the inbound task does on peer disconnect — then closes the connection
/// (`spec.md §4.G` Close step).
async fn outbound_loop(
    mut session: actix_ws::Session,
    outbox_rx: async_channel::Receiver<ServerFrame>,
) {
    while let Ok(frame) = outbox_rx.recv().await {
        match serde_json::to_string(&frame) {
            Ok(text) => {
                if session.text(text).await.is_err() {
                    break;
                }
            }
            Err(err) => tracing::error!(error = %err, "failed to serialize outbound frame"),
        }
    }
    let _ = session.close(None).await;
}

#[allow(clippy::too_many_arguments)]
async fn inbound_loop(
    session_id: uuid::Uuid,
    ip: String,
    country: String,
    outbox: async_channel::Sender<ServerFrame>,
    rate_limiter: std::sync::Arc<RateLimiter>,
    mut session: actix_ws::Session,
    mut msg_stream: impl futures_util::Stream<Item = Result<AggregatedMessage, actix_ws::ProtocolError>>
        + Unpin,
    state: web::Data<AppState>,
) {
    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    let mut last_heartbeat = Instant::now();

    loop {
        tokio::select! {
            message = msg_stream.next() => {
                match message {
                    Some(Ok(AggregatedMessage::Text(text))) => {
                        last_heartbeat = Instant::now();
                        handle_client_frame(&text, &outbox, &state.db, &state.bus, &rate_limiter, &ip, &country).await;
                    }
                    Some(Ok(AggregatedMessage::Ping(bytes))) => {
                        last_heartbeat = Instant::now();
                        if session.pong(&bytes).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(AggregatedMessage::Pong(_))) => {
                        last_heartbeat = Instant::now();
                    }
                    Some(Ok(AggregatedMessage::Close(_))) => break,
                    Some(Ok(AggregatedMessage::Binary(_))) => {
                        tracing::debug!(session = %session_id, "ignoring binary frame");
                    }
                    Some(Err(err)) => {
                        tracing::warn!(session = %session_id, error = %err, "websocket protocol error");
                        break;
                    }
                    None => break,
                }
            }
            _ = heartbeat.tick() => {
                if last_heartbeat.elapsed() > CLIENT_TIMEOUT {
                    tracing::info!(session = %session_id, "session timed out, closing");
                    break;
                }
            }
        }
    }

    state.hub.unregister(session_id).await;
    outbox.close();
}

async fn handle_client_frame(
    raw: &str,
    outbox: &async_channel::Sender<ServerFrame>,
    db: &DatabaseConnection,
    bus: &click_counter_logic::services::bus::BusPublisher,
    rate_limiter: &RateLimiter,
    ip: &str,
    country: &str,
) {
    let frame: ClientFrame = match serde_json::from_str(raw) {
        Ok(frame) => frame,
        Err(err) => {
            tracing::warn!(error = %err, "failed to decode inbound session frame");
            return;
        }
    };

    match frame {
        ClientFrame::Click => handle_click(outbox, bus, rate_limiter, ip, country).await,
        ClientFrame::GetCount => handle_get_count(outbox, db).await,
        ClientFrame::GetCountries => handle_get_countries(outbox, db).await,
        ClientFrame::Unknown => tracing::debug!("ignoring unrecognized inbound frame type"),
    }
}

async fn handle_click(
    outbox: &async_channel::Sender<ServerFrame>,
    bus: &click_counter_logic::services::bus::BusPublisher,
    rate_limiter: &RateLimiter,
    ip: &str,
    country: &str,
) {
    if !rate_limiter.try_acquire().await {
        metrics::CLICKS_RATE_LIMITED_TOTAL.inc();
        push(outbox, ServerFrame::from(&ServiceError::RateLimited));
        return;
    }

    let event = ClickEvent {
        timestamp: now_seconds(),
        country: country.to_string(),
        ip: ip.to_string(),
    };

    match bus.publish(&event).await {
        Ok(()) => {
            metrics::CLICKS_ACCEPTED_TOTAL.inc();
            push(outbox, ServerFrame::click_success());
        }
        Err(err) => {
            // §7: TransientPublish is surfaced as a click_error frame, never
            // an HTTP/connection failure.
            tracing::warn!(error = %err, "click publish failed");
            push(outbox, ServerFrame::from(&err));
        }
    }
}

async fn handle_get_count(outbox: &async_channel::Sender<ServerFrame>, db: &DatabaseConnection) {
    match click_counter_logic::repository::counters::get_totals(db).await {
        Ok(totals) => push(
            outbox,
            ServerFrame::CountResponse {
                global: totals.global,
                countries: totals.countries,
            },
        ),
        Err(err) => tracing::warn!(error = %err, "get_count read failed, skipping response"),
    }
}

async fn handle_get_countries(outbox: &async_channel::Sender<ServerFrame>, db: &DatabaseConnection) {
    // §4.G: serve a fixed empty response rather than erroring when the
    // store is unavailable.
    let countries = click_counter_logic::repository::counters::get_totals(db)
        .await
        .map(|totals| totals.countries)
        .unwrap_or_default();
    push(outbox, ServerFrame::CountriesResponse { countries });
}

fn push(outbox: &async_channel::Sender<ServerFrame>, frame: ServerFrame) {
    if outbox.try_send(frame).is_err() {
        tracing::warn!("session outbox full, dropping outbound frame");
    }
}

fn now_seconds() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs() as i64)
        .unwrap_or_default()
}

/// Prefers a trusted forwarding header (the service sits behind a proxy in
/// production) and falls back to the socket's peer address.
fn extract_client_ip(req: &HttpRequest) -> String {
    if let Some(forwarded) = req.headers().get("x-forwarded-for") {
        if let Ok(text) = forwarded.to_str() {
            if let Some(first) = text.split(',').next().map(str::trim) {
                if !first.is_empty() {
                    return first.to_string();
                }
            }
        }
    }
    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
