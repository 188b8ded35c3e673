use std::time::Duration;

use url::Url;

use crate::{error::ServiceError, types::CounterTotals};

/// Notifies the front service's internal broadcast endpoint of new totals
/// (§4.F). Any non-2xx or transport error is returned to the caller, which
/// must log it and continue — the processor never fails on a broadcast
/// failure.
#[derive(Clone)]
pub struct BroadcastClient {
    client: reqwest::Client,
    backend_url: Url,
}

impl BroadcastClient {
    pub fn new(backend_url: Url, call_deadline: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(call_deadline)
            .build()
            .expect("broadcast client http client");
        Self { client, backend_url }
    }

    pub async fn notify_totals(&self, totals: &CounterTotals) -> Result<(), ServiceError> {
        let body = serde_json::json!({
            "type": "counter_update",
            "global": totals.global,
            "countries": totals.countries,
        });

        let response = self
            .client
            .post(self.backend_url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|err| ServiceError::TransientUpstream(err.to_string()))?;

        if !response.status().is_success() {
            return Err(ServiceError::TransientUpstream(format!(
                "broadcast endpoint responded with {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn notify_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = BroadcastClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(2));
        let totals = CounterTotals {
            global: 1,
            countries: HashMap::new(),
        };
        client.notify_totals(&totals).await.unwrap();
    }

    #[tokio::test]
    async fn notify_failure_is_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = BroadcastClient::new(Url::parse(&server.uri()).unwrap(), Duration::from_secs(2));
        let totals = CounterTotals::default();
        let err = client.notify_totals(&totals).await.unwrap_err();
        assert!(matches!(err, ServiceError::TransientUpstream(_)));
    }
}
