use blockscout_service_launcher::{
    database::{DatabaseConnectSettings, DatabaseSettings},
    launcher::{ConfigSettings, MetricsSettings, ServerSettings},
    tracing::{JaegerSettings, TracingSettings},
};
use click_counter_logic::ServiceError;
use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::time::Duration;
use url::Url;

/// Processor service configuration, loaded through `ConfigSettings::build`
/// (env vars prefixed `CLICK_COUNTER_PROCESSOR__*`), per `spec.md §6`'s
/// configuration table.
#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_server")]
    pub server: ServerSettings,
    #[serde(default)]
    pub metrics: MetricsSettings,
    #[serde(default)]
    pub tracing: TracingSettings,
    #[serde(default)]
    pub jaeger: JaegerSettings,
    pub database: DatabaseSettings,

    /// Bus/store namespace. Required — `spec.md §6`.
    pub project_id: String,
    /// Front's `POST /internal/broadcast` endpoint.
    pub backend_url: Url,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_backend_call_deadline")]
    pub backend_call_deadline: Duration,
    /// Informational only — the processor never subscribes to anything
    /// itself, it is invoked by the bus's push webhook. Kept purely so
    /// deployment configs can record which subscription feeds it without
    /// the processor acting on the value.
    #[serde(default)]
    pub subscription_name: Option<String>,
}

impl ConfigSettings for Settings {
    const SERVICE_NAME: &'static str = "CLICK_COUNTER_PROCESSOR";
}

impl Settings {
    pub fn default(database_url: String) -> Self {
        Self {
            server: default_server(),
            metrics: Default::default(),
            tracing: Default::default(),
            jaeger: Default::default(),
            database: DatabaseSettings {
                connect: DatabaseConnectSettings::Url(database_url),
                connect_options: Default::default(),
                create_database: Default::default(),
                run_migrations: Default::default(),
            },
            project_id: "click-counter".to_string(),
            backend_url: Url::parse("http://localhost:8080/internal/broadcast").unwrap(),
            backend_call_deadline: default_backend_call_deadline(),
            subscription_name: None,
        }
    }

    /// Checks the invariants `serde`'s required-field mechanism can't
    /// express on its own — a required `String` still deserializes fine as
    /// `""`. Called once at startup, before the broadcast client and HTTP
    /// server spin up (§7: `Fatal` — misconfiguration aborts startup).
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.project_id.trim().is_empty() {
            return Err(ServiceError::Fatal("project_id must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_project_id() {
        let mut settings = Settings::default("postgres://localhost/click_counter".to_string());
        settings.project_id = "   ".to_string();
        assert!(matches!(settings.validate(), Err(ServiceError::Fatal(_))));
    }

    #[test]
    fn accepts_the_default_settings() {
        let settings = Settings::default("postgres://localhost/click_counter".to_string());
        assert!(settings.validate().is_ok());
    }
}

fn default_backend_call_deadline() -> Duration {
    Duration::from_secs(2)
}

/// `spec.md §6` fixes this service's default port at `8080`, not the
/// library's own `0.0.0.0:8050` (`SPEC_FULL.md §10.1`).
fn default_server() -> ServerSettings {
    let mut server = ServerSettings::default();
    server.http.addr = "0.0.0.0:8080".parse().expect("valid default addr");
    server
}
