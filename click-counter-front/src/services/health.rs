use actix_web::HttpResponse;

/// Liveness probe. The front has no external dependency it must reach to
/// be considered up — the database and bus are checked lazily on the hot
/// paths that use them.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
