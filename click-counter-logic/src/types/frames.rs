use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::totals::CountryTotal;

/// Inbound session frames (§4.G, §6). Anything not recognized here
/// deserializes to `Unknown` — the hub logs and ignores it rather than
/// closing the session.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientFrame {
    #[serde(rename = "click")]
    Click,
    #[serde(rename = "get_count")]
    GetCount,
    #[serde(rename = "get_countries")]
    GetCountries,
    #[serde(other)]
    Unknown,
}

/// Outbound session frames, serialized as `{ "type": ..., "data": ... }`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerFrame {
    #[serde(rename = "auth_token")]
    AuthToken { token: String },
    #[serde(rename = "count_response")]
    CountResponse {
        global: i64,
        countries: HashMap<String, CountryTotal>,
    },
    #[serde(rename = "countries_response")]
    CountriesResponse {
        countries: HashMap<String, CountryTotal>,
    },
    #[serde(rename = "counter_update")]
    CounterUpdate {
        global: i64,
        countries: HashMap<String, CountryTotal>,
    },
    #[serde(rename = "click_success")]
    ClickSuccess { status: String },
    #[serde(rename = "click_error")]
    ClickError { error: String },
}

impl ServerFrame {
    pub fn click_success() -> Self {
        Self::ClickSuccess {
            status: "ok".to_string(),
        }
    }

    pub fn click_error(message: impl Into<String>) -> Self {
        Self::ClickError {
            error: message.into(),
        }
    }
}
