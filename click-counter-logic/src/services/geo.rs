use std::{net::IpAddr, sync::Arc, time::Duration};

use cached::{Cached, TimedCache};
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use crate::{
    metrics,
    types::click_event::{COUNTRY_LOCAL, COUNTRY_UNKNOWN},
};

/// Maps IPs to ISO-3166 country codes, per §4.A. Resolution happens once per
/// session at upgrade; the result is cached on the session, not re-resolved
/// per click.
#[derive(Clone)]
pub struct GeoResolver {
    client: reqwest::Client,
    primary: Url,
    fallback: Option<Url>,
    cache: Arc<Mutex<TimedCache<String, String>>>,
}

impl GeoResolver {
    pub fn new(primary: Url, fallback: Option<Url>, cache_ttl: Duration, call_deadline: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(call_deadline)
            .build()
            .expect("geolocation http client");
        Self {
            client,
            primary,
            fallback,
            cache: Arc::new(Mutex::new(TimedCache::with_lifespan(cache_ttl.as_secs()))),
        }
    }

    /// Resolves an IP to a country code, `"LOCAL"`, or `"Unknown"`. Never
    /// blocks a click on failure — `"Unknown"` is a valid classification.
    pub async fn resolve(&self, ip: &str) -> String {
        if is_local(ip) {
            return COUNTRY_LOCAL.to_string();
        }

        if let Some(country) = self.cache.lock().await.cache_get(&ip.to_string()).cloned() {
            metrics::GEO_CACHE_TOTAL.with_label_values(&["hit"]).inc();
            return country;
        }
        metrics::GEO_CACHE_TOTAL.with_label_values(&["miss"]).inc();

        match self.lookup(ip).await {
            Some(country) => {
                self.cache
                    .lock()
                    .await
                    .cache_set(ip.to_string(), country.clone());
                country
            }
            // Negative results are not cached, so a transient upstream
            // outage self-heals on the next session's upgrade.
            None => COUNTRY_UNKNOWN.to_string(),
        }
    }

    async fn lookup(&self, ip: &str) -> Option<String> {
        if let Some(code) = self.query(&self.primary, ip).await {
            return Some(code);
        }
        if let Some(fallback) = self.fallback.clone() {
            return self.query(&fallback, ip).await;
        }
        None
    }

    async fn query(&self, base: &Url, ip: &str) -> Option<String> {
        let mut url = base.clone();
        url.path_segments_mut().ok()?.push(ip);
        let response = self.client.get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: GeoProviderResponse = response.json().await.ok()?;
        if body.country_code.is_empty() {
            return None;
        }
        Some(body.country_code.to_uppercase())
    }
}

#[derive(Debug, Deserialize)]
struct GeoProviderResponse {
    #[serde(rename = "countryCode", default)]
    country_code: String,
}

fn is_local(ip: &str) -> bool {
    match ip.parse::<IpAddr>() {
        Ok(IpAddr::V4(v4)) => v4.is_loopback() || v4.is_private(),
        Ok(IpAddr::V6(v6)) => v6.is_loopback(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_and_private_ips_are_local() {
        assert!(is_local("127.0.0.1"));
        assert!(is_local("10.0.0.5"));
        assert!(is_local("192.168.1.1"));
        assert!(is_local("::1"));
    }

    #[test]
    fn public_ips_are_not_local() {
        assert!(!is_local("192.0.2.10"));
        assert!(!is_local("not-an-ip"));
    }

    #[tokio::test]
    async fn falls_back_when_primary_fails() {
        use wiremock::{
            matchers::{method, path},
            Mock, MockServer, ResponseTemplate,
        };

        let primary = MockServer::start().await;
        let fallback = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/192.0.2.10"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&primary)
            .await;
        Mock::given(method("GET"))
            .and(path("/192.0.2.10"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "countryCode": "es"
            })))
            .mount(&fallback)
            .await;

        let resolver = GeoResolver::new(
            Url::parse(&primary.uri()).unwrap(),
            Some(Url::parse(&fallback.uri()).unwrap()),
            Duration::from_secs(3600),
            Duration::from_secs(2),
        );

        assert_eq!(resolver.resolve("192.0.2.10").await, "ES");
    }

    #[tokio::test]
    async fn unknown_when_both_providers_fail() {
        use wiremock::{
            matchers::{method, path},
            Mock, MockServer, ResponseTemplate,
        };

        let primary = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/192.0.2.20"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&primary)
            .await;

        let resolver = GeoResolver::new(
            Url::parse(&primary.uri()).unwrap(),
            None,
            Duration::from_secs(3600),
            Duration::from_secs(2),
        );

        assert_eq!(resolver.resolve("192.0.2.20").await, COUNTRY_UNKNOWN);
    }
}
