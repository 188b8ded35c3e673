use std::time::Duration;

use url::Url;

use crate::{
    error::ServiceError,
    metrics,
    types::{click_event::ClickEvent, envelope::encode_click_event},
};

/// Publishes click events to the configured bus topic (§4.C).
///
/// Does not probe topic existence at startup — the topic is assumed to
/// exist, and any authorization or topology failure surfaces lazily on the
/// first `publish` call. Startup existence probes have been observed to fail
/// transiently on managed bus implementations even with correct
/// authorization.
#[derive(Clone)]
pub struct BusPublisher {
    client: reqwest::Client,
    endpoint: Url,
    topic: String,
}

impl BusPublisher {
    pub fn new(endpoint: Url, topic: String, call_deadline: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(call_deadline)
            .build()
            .expect("bus publisher http client");
        Self {
            client,
            endpoint,
            topic,
        }
    }

    /// Serializes and publishes one click event. Fire-and-log on the hot
    /// path: the caller (the hub) logs a publish failure and surfaces a
    /// `click_error` frame, but must not crash.
    pub async fn publish(&self, event: &ClickEvent) -> Result<(), ServiceError> {
        let data = encode_click_event(event)?;
        let result = self
            .client
            .post(self.endpoint.clone())
            .json(&serde_json::json!({ "topic": self.topic, "data": data }))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                metrics::BUS_PUBLISH_TOTAL.with_label_values(&["success"]).inc();
                Ok(())
            }
            Ok(response) => {
                metrics::BUS_PUBLISH_TOTAL.with_label_values(&["failure"]).inc();
                Err(ServiceError::TransientPublish(format!(
                    "bus responded with {}",
                    response.status()
                )))
            }
            Err(err) => {
                metrics::BUS_PUBLISH_TOTAL.with_label_values(&["failure"]).inc();
                Err(ServiceError::TransientPublish(err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn publish_success_increments_success_metric() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let publisher = BusPublisher::new(
            Url::parse(&server.uri()).unwrap(),
            "clicks".to_string(),
            Duration::from_secs(2),
        );

        let event = ClickEvent {
            timestamp: 1,
            country: "ES".to_string(),
            ip: "192.0.2.10".to_string(),
        };
        publisher.publish(&event).await.unwrap();
    }

    #[tokio::test]
    async fn publish_failure_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let publisher = BusPublisher::new(
            Url::parse(&server.uri()).unwrap(),
            "clicks".to_string(),
            Duration::from_secs(2),
        );

        let event = ClickEvent {
            timestamp: 1,
            country: "ES".to_string(),
            ip: "192.0.2.10".to_string(),
        };
        let err = publisher.publish(&event).await.unwrap_err();
        assert!(matches!(err, ServiceError::TransientPublish(_)));
    }
}
