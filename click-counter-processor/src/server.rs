//! Wiring and the HTTP launch loop (`spec.md §4.D`, `§6`).
//!
//! Same rationale as `click_counter_front::server`: `blockscout_service_launcher`'s
//! `launcher::launch` expects a paired gRPC router, but this service has no
//! gRPC surface at all, so the launch loop is our own `actix_web::HttpServer`
//! built on the same `actix-web-prom` metrics middleware `launcher::launch`
//! itself wires up.

use actix_web::{web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use click_counter_logic::services::broadcast_client::BroadcastClient;
use migration::Migrator;
use sea_orm::DatabaseConnection;

use crate::{
    services::{health, process},
    settings::Settings,
};

const SERVICE_NAME: &str = "click_counter_processor";

/// Shared state handed to every route handler.
pub struct AppState {
    pub db: DatabaseConnection,
    pub broadcast: BroadcastClient,
}

fn configure_routes(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |config| {
        config
            .app_data(state)
            .route("/health", web::get().to(health::health))
            .route("/live", web::get().to(health::health))
            .route("/process", web::post().to(process::process));
    }
}

pub async fn run(settings: Settings) -> Result<(), anyhow::Error> {
    blockscout_service_launcher::tracing::init_logs(
        SERVICE_NAME,
        &settings.tracing,
        &settings.jaeger,
    )?;
    settings.validate()?;
    tracing::info!(
        project_id = %settings.project_id,
        subscription_name = ?settings.subscription_name,
        "starting click-counter-processor"
    );

    let db = blockscout_service_launcher::database::initialize_postgres::<Migrator>(
        &settings.database.connect.url(),
        settings.database.create_database,
        settings.database.run_migrations,
    )
    .await?;

    let broadcast = BroadcastClient::new(settings.backend_url, settings.backend_call_deadline);

    let state = web::Data::new(AppState { db, broadcast });

    let metrics_enabled = settings.metrics.enabled;
    let metrics_middleware = metrics_enabled.then(|| {
        PrometheusMetricsBuilder::new(SERVICE_NAME)
            .registry(prometheus::default_registry().clone())
            .build()
            .expect("prometheus middleware")
    });

    let http_settings = settings.server.http;
    let server = HttpServer::new(move || {
        let app = App::new().configure(configure_routes(state.clone()));
        match &metrics_middleware {
            Some(metrics) => app.wrap(metrics.clone()),
            None => app,
        }
    })
    .bind(http_settings.addr)?
    .run();

    let handle = server.handle();
    let server_task = tokio::spawn(async move { server.await.map_err(anyhow::Error::from) });
    let shutdown_task = tokio::spawn(shutdown_on_signal(handle));

    tokio::select! {
        result = server_task => result?,
        result = shutdown_task => { result?; Ok(()) }
    }
}

async fn shutdown_on_signal(handle: actix_web::dev::ServerHandle) -> Result<(), anyhow::Error> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("received shutdown signal, stopping gracefully");
    handle.stop(true).await;
    Ok(())
}
