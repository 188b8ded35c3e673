use blockscout_service_launcher::test_server;
use click_counter_processor::Settings;
use reqwest::Url;

/// Boots the processor service against an already-migrated test database
/// and waits for it to answer `/health`.
///
/// `settings_setup` lets a test point `backend_url` at a `wiremock` server
/// standing in for the front service's `/internal/broadcast` (`spec.md
/// §4.F`).
pub async fn init_server<F>(db_url: String, settings_setup: F) -> Url
where
    F: Fn(Settings) -> Settings,
{
    let mut settings = Settings::default(db_url);
    let (server_settings, base) = test_server::get_test_server_settings();
    settings.server = server_settings;
    settings.metrics.enabled = false;
    settings.tracing.enabled = false;
    settings.jaeger.enabled = false;
    let settings = settings_setup(settings);

    test_server::init_server(|| click_counter_processor::run(settings), &base).await;
    base
}
