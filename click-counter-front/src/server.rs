//! Wiring and the HTTP launch loop (`spec.md §4.G`, `§6`).
//!
//! `blockscout_service_launcher::launcher::launch` expects a
//! `tonic::transport::server::Router` alongside the HTTP router; this
//! service has no gRPC surface at all (`spec.md §10.4` drops it
//! entirely), so the launch loop below is our own, built directly on the
//! same `actix_web::HttpServer` + `actix-web-prom` pieces
//! `launcher::launch` itself uses.

use actix_cors::Cors;
use actix_web::{middleware::Condition, web, App, HttpServer};
use actix_web_prom::PrometheusMetricsBuilder;
use click_counter_logic::services::{bus::BusPublisher, geo::GeoResolver};
use migration::Migrator;
use sea_orm::DatabaseConnection;

use crate::{
    hub::HubHandle,
    services::{broadcast, count, health},
    settings::{SessionSettings, Settings},
    ws::session_upgrade,
};

const SERVICE_NAME: &str = "click_counter_front";

/// Shared state handed to every route handler.
pub struct AppState {
    pub db: DatabaseConnection,
    pub hub: HubHandle,
    pub geo: GeoResolver,
    pub bus: BusPublisher,
    pub session: SessionSettings,
}

fn configure_routes(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |config| {
        config
            .app_data(state)
            .route("/health", web::get().to(health::health))
            .route("/count", web::get().to(count::get_count))
            .route("/internal/broadcast", web::post().to(broadcast::broadcast))
            .route("/ws", web::get().to(session_upgrade));
    }
}

pub async fn run(settings: Settings) -> Result<(), anyhow::Error> {
    blockscout_service_launcher::tracing::init_logs(
        SERVICE_NAME,
        &settings.tracing,
        &settings.jaeger,
    )?;
    settings.validate()?;
    tracing::info!(project_id = %settings.project_id, "starting click-counter-front");

    let db = blockscout_service_launcher::database::initialize_postgres::<Migrator>(
        &settings.database.connect.url(),
        settings.database.create_database,
        settings.database.run_migrations,
    )
    .await?;

    let hub = HubHandle::spawn(settings.session.broadcast_capacity);
    let geo = GeoResolver::new(
        settings.geolocation.primary_url,
        settings.geolocation.fallback_url,
        settings.geolocation.cache_ttl,
        settings.geolocation.call_deadline,
    );
    let bus = BusPublisher::new(
        settings.bus.publish_url,
        settings.bus.topic,
        settings.bus.call_deadline,
    );

    let state = web::Data::new(AppState {
        db,
        hub,
        geo,
        bus,
        session: settings.session.clone(),
    });

    let mut servers = Vec::new();

    if settings.server.http.enabled {
        let http_settings = settings.server.http.clone();
        let metrics_enabled = settings.metrics.enabled;
        let metrics_middleware = metrics_enabled.then(|| {
            PrometheusMetricsBuilder::new(SERVICE_NAME)
                .registry(prometheus::default_registry().clone())
                .build()
                .expect("prometheus middleware")
        });
        let json_cfg = web::JsonConfig::default().limit(http_settings.max_body_size);
        let cors_settings = http_settings.cors.clone();
        let cors_enabled = cors_settings.enabled;
        let state = state.clone();

        let server = HttpServer::new(move || {
            let cors: Cors = cors_settings.clone().build();
            let app = App::new()
                .wrap(Condition::new(cors_enabled, cors))
                .app_data(json_cfg.clone())
                .configure(configure_routes(state.clone()));
            match &metrics_middleware {
                Some(metrics) => app.wrap(metrics.clone()),
                None => app,
            }
        })
        .bind(http_settings.addr)?
        .run();

        let handle = server.handle();
        servers.push(tokio::spawn(async move { server.await.map_err(anyhow::Error::from) }));
        servers.push(tokio::spawn(shutdown_on_signal(handle)));
    }

    if settings.metrics.enabled && !settings.server.http.enabled {
        // Metrics were requested on their own port only when the combined
        // http+metrics middleware above isn't serving `/metrics` already.
        let addr = settings.metrics.addr;
        let route = settings.metrics.route.clone();
        let metrics = PrometheusMetricsBuilder::new(SERVICE_NAME)
            .registry(prometheus::default_registry().clone())
            .endpoint(&route)
            .build()
            .expect("prometheus middleware");
        let server = HttpServer::new(move || App::new().wrap(metrics.clone()))
            .bind(addr)?
            .run();
        let handle = server.handle();
        servers.push(tokio::spawn(async move { server.await.map_err(anyhow::Error::from) }));
        servers.push(tokio::spawn(shutdown_on_signal(handle)));
    }

    let (result, _, rest) = futures::future::select_all(servers).await;
    for task in rest {
        task.abort();
    }
    result?
}

async fn shutdown_on_signal(handle: actix_web::dev::ServerHandle) -> Result<(), anyhow::Error> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("received shutdown signal, stopping gracefully");
    // Resolves once the server has fully drained, at which point the
    // corresponding server task has also finished.
    handle.stop(true).await;
    Ok(())
}
