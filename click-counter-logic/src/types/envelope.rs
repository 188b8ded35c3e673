use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::{error::ServiceError, types::click_event::ClickEvent};

/// The bus-push envelope delivered to `POST /process` (§4.D, §6).
#[derive(Debug, Clone, Deserialize)]
pub struct BusPushEnvelope {
    pub message: BusMessage,
    #[serde(default)]
    pub subscription: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusMessage {
    #[serde(rename = "messageId")]
    pub message_id: String,
    #[serde(default)]
    pub data: String,
}

/// Serializes a [`ClickEvent`] the way the front publishes it: base64-of-JSON,
/// as the bus carries it (§6).
pub fn encode_click_event(event: &ClickEvent) -> Result<String, ServiceError> {
    let json = serde_json::to_vec(event)
        .map_err(|err| ServiceError::PermanentBadInput(format!("encode click event: {err}")))?;
    Ok(STANDARD.encode(json))
}

/// Decodes the envelope's `data` field into a [`ClickEvent`], per §4.E step 1.
/// Any malformed base64, JSON, or an empty `country` is a permanent failure —
/// it must never be retried by the bus.
pub fn decode_click_event(envelope: &BusPushEnvelope) -> Result<ClickEvent, ServiceError> {
    if envelope.message.data.is_empty() {
        return Err(ServiceError::PermanentBadInput(
            "empty message data".to_string(),
        ));
    }
    let raw = STANDARD
        .decode(&envelope.message.data)
        .map_err(|err| ServiceError::PermanentBadInput(format!("invalid base64: {err}")))?;
    let event: ClickEvent = serde_json::from_slice(&raw)
        .map_err(|err| ServiceError::PermanentBadInput(format!("invalid click event json: {err}")))?;
    if event.country.is_empty() {
        return Err(ServiceError::PermanentBadInput(
            "missing country".to_string(),
        ));
    }
    Ok(event)
}
