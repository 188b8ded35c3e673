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

/// Front service configuration, loaded through `ConfigSettings::build` (env
/// vars prefixed `CLICK_COUNTER_FRONT__`, `__`-nested, or a TOML file named
/// by `CLICK_COUNTER_FRONT__CONFIG`) per `spec.md §6`'s configuration table.
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
    pub session: SessionSettings,
    pub geolocation: GeolocationSettings,
    pub bus: BusSettings,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SessionSettings {
    /// Per-session sliding-window click cap (§4.I). Default 10/s.
    #[serde(default = "default_rate_limit_cap")]
    pub rate_limit_cap: u32,
    /// Bound on each session's outbox (§4.G). Default 256.
    #[serde(default = "default_outbox_capacity")]
    pub outbox_capacity: usize,
    /// Bound on the single broadcast channel feeding the fan-out loop.
    #[serde(default = "default_broadcast_capacity")]
    pub broadcast_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            rate_limit_cap: default_rate_limit_cap(),
            outbox_capacity: default_outbox_capacity(),
            broadcast_capacity: default_broadcast_capacity(),
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GeolocationSettings {
    pub primary_url: Url,
    #[serde(default)]
    pub fallback_url: Option<Url>,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_geo_cache_ttl")]
    pub cache_ttl: Duration,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_geo_call_deadline")]
    pub call_deadline: Duration,
}

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BusSettings {
    /// Endpoint the front publishes bus envelopes to (§4.C). No topic
    /// existence probe happens at startup — see `click-counter-logic::services::bus`.
    pub publish_url: Url,
    pub topic: String,
    #[serde_as(as = "serde_with::DurationSeconds<u64>")]
    #[serde(default = "default_bus_call_deadline")]
    pub call_deadline: Duration,
}

impl ConfigSettings for Settings {
    const SERVICE_NAME: &'static str = "CLICK_COUNTER_FRONT";
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
            session: Default::default(),
            geolocation: GeolocationSettings {
                primary_url: Url::parse("http://localhost:9100").unwrap(),
                fallback_url: None,
                cache_ttl: default_geo_cache_ttl(),
                call_deadline: default_geo_call_deadline(),
            },
            bus: BusSettings {
                publish_url: Url::parse("http://localhost:9200").unwrap(),
                topic: "clicks".to_string(),
                call_deadline: default_bus_call_deadline(),
            },
        }
    }

    /// Checks the invariants `serde`'s required-field mechanism can't
    /// express on its own — a required `String` still deserializes fine as
    /// `""`. Called once at startup, before anything downstream (the hub,
    /// the bus client) spins up (§7: `Fatal` — misconfiguration aborts
    /// startup).
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.project_id.trim().is_empty() {
            return Err(ServiceError::Fatal("project_id must not be empty".to_string()));
        }
        if self.bus.topic.trim().is_empty() {
            return Err(ServiceError::Fatal("bus.topic must not be empty".to_string()));
        }
        Ok(())
    }
}


/// `spec.md §6` fixes the front's default port at `8080`, not the
/// library's own `0.0.0.0:8050` (`SPEC_FULL.md §10.1`).
fn default_server() -> ServerSettings {
    let mut server = ServerSettings::default();
    server.http.addr = "0.0.0.0:8080".parse().expect("valid default addr");
    server
}

fn default_rate_limit_cap() -> u32 {
    10
}

fn default_outbox_capacity() -> usize {
    256
}

fn default_broadcast_capacity() -> usize {
    1024
}

fn default_geo_cache_ttl() -> Duration {
    Duration::from_secs(3600)
}

fn default_geo_call_deadline() -> Duration {
    Duration::from_secs(2)
}

fn default_bus_call_deadline() -> Duration {
    Duration::from_secs(2)
}
