use blockscout_service_launcher::test_server;
use click_counter_front::Settings;
use reqwest::Url;

/// Boots the front service against an already-migrated test database and
/// waits for it to answer `/health`.
pub async fn init_server(db_url: String) -> Url {
    let mut settings = Settings::default(db_url);
    let (server_settings, base) = test_server::get_test_server_settings();
    settings.server = server_settings;
    settings.metrics.enabled = false;
    settings.tracing.enabled = false;
    settings.jaeger.enabled = false;

    test_server::init_server(|| click_counter_front::run(settings), &base).await;
    base
}
