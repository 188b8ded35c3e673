#![allow(dead_code)]
mod helpers;

use blockscout_service_launcher::database;
use click_counter_logic::types::{click_event::ClickEvent, envelope::encode_click_event};
use entity::{counters, processed_messages};
use migration::Migrator;
use pretty_assertions::assert_eq;
use reqwest::Url;
use sea_orm::EntityTrait;
use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

fn push_envelope(message_id: &str, event: &ClickEvent) -> serde_json::Value {
    serde_json::json!({
        "message": {
            "messageId": message_id,
            "data": encode_click_event(event).unwrap(),
        }
    })
}

async fn post_process(base: &Url, body: &serde_json::Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(base.join("process").unwrap())
        .json(body)
        .send()
        .await
        .expect("request should succeed")
}

/// S1: a fresh delivery increments the global and country counters and
/// records exactly one processed-message entry (`spec.md §8` S1).
#[tokio::test]
#[ignore = "Needs database to run"]
async fn fresh_delivery_increments_and_records() {
    let broadcast_target = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&broadcast_target)
        .await;

    let db = database!(Migrator);
    let db_url = db.db_url();
    let base = helpers::init_server(db_url, |mut s| {
        s.backend_url = Url::parse(&format!("{}/internal/broadcast", broadcast_target.uri())).unwrap();
        s
    })
    .await;

    let event = ClickEvent {
        timestamp: 1,
        country: "ES".to_string(),
        ip: "192.0.2.10".to_string(),
    };
    let body = push_envelope("m1", &event);
    let response = post_process(&base, &body).await;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let conn = db.client();
    let global = counters::Entity::find_by_id(counters::GLOBAL_DOC_ID.to_string())
        .one(conn.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(global.count, 1);

    let country = counters::Entity::find_by_id("country_ES".to_string())
        .one(conn.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(country.count, 1);
    assert_eq!(country.country.as_deref(), Some("ES"));

    let processed = processed_messages::Entity::find_by_id("m1".to_string())
        .one(conn.as_ref())
        .await
        .unwrap();
    assert!(processed.is_some());
}

/// S2: duplicate delivery of the same message id is a no-op the second
/// time (`spec.md §8` S2, invariant 3 in `§3`).
#[tokio::test]
#[ignore = "Needs database to run"]
async fn duplicate_delivery_increments_once() {
    let broadcast_target = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&broadcast_target)
        .await;

    let db = database!(Migrator);
    let db_url = db.db_url();
    let base = helpers::init_server(db_url, |mut s| {
        s.backend_url = Url::parse(&format!("{}/internal/broadcast", broadcast_target.uri())).unwrap();
        s
    })
    .await;

    let event = ClickEvent {
        timestamp: 1,
        country: "ES".to_string(),
        ip: "192.0.2.10".to_string(),
    };
    let body = push_envelope("m-dup", &event);

    let first = post_process(&base, &body).await;
    let second = post_process(&base, &body).await;
    assert_eq!(first.status(), reqwest::StatusCode::OK);
    assert_eq!(second.status(), reqwest::StatusCode::OK);

    let conn = db.client();
    let global = counters::Entity::find_by_id(counters::GLOBAL_DOC_ID.to_string())
        .one(conn.as_ref())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(global.count, 1);
}

/// S3: permanent-bad input (empty country) is rejected with 400 and
/// mutates nothing (`spec.md §8` S3).
#[tokio::test]
#[ignore = "Needs database to run"]
async fn permanent_bad_input_is_rejected() {
    let db = database!(Migrator);
    let db_url = db.db_url();
    let base = helpers::init_server(db_url, |s| s).await;

    let event = ClickEvent {
        timestamp: 1,
        country: String::new(),
        ip: "x".to_string(),
    };
    let body = push_envelope("m-bad", &event);
    let response = post_process(&base, &body).await;
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);

    let conn = db.client();
    let processed = processed_messages::Entity::find_by_id("m-bad".to_string())
        .one(conn.as_ref())
        .await
        .unwrap();
    assert!(processed.is_none());
}

/// Wrong HTTP method on `/process` yields 405 (`spec.md §6`).
#[tokio::test]
#[ignore = "Needs database to run"]
async fn wrong_method_is_rejected() {
    let db = database!(Migrator);
    let db_url = db.db_url();
    let base = helpers::init_server(db_url, |s| s).await;

    let response = reqwest::Client::new()
        .get(base.join("process").unwrap())
        .send()
        .await
        .expect("request should succeed");
    assert_eq!(response.status(), reqwest::StatusCode::METHOD_NOT_ALLOWED);
}
