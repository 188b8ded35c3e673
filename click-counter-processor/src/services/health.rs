use actix_web::HttpResponse;

/// `GET /health` and `GET /live` (`spec.md §6`). Plain JSON liveness — this
/// service carries no gRPC surface to health-check (see `DESIGN.md`), so it
/// is rendered as REST rather than a gRPC `HealthService`.
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
