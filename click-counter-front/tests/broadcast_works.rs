#![allow(dead_code)]
mod helpers;

use blockscout_service_launcher::database;
use migration::Migrator;
use pretty_assertions::assert_eq;

#[tokio::test]
#[ignore = "Needs database to run"]
async fn internal_broadcast_accepts_a_counter_update() {
    let db = database!(Migrator);
    let db_url = db.db_url();
    let base = helpers::init_server(db_url).await;

    let response = reqwest::Client::new()
        .post(base.join("internal/broadcast").unwrap())
        .json(&serde_json::json!({
            "type": "counter_update",
            "global": 5,
            "countries": { "country_ES": { "count": 5, "country": "ES" } },
        }))
        .send()
        .await
        .expect("request should succeed");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
}
