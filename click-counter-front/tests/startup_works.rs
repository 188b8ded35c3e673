#![allow(dead_code)]
mod helpers;

use blockscout_service_launcher::{database, test_server};
use migration::Migrator;
use pretty_assertions::assert_eq;

#[tokio::test]
#[ignore = "Needs database to run"]
async fn test_startup_works() {
    let db = database!(Migrator);
    let db_url = db.db_url();
    let base = helpers::init_server(db_url).await;
    let response: serde_json::Value = test_server::send_get_request(&base, "/health").await;
    assert_eq!(response, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
#[ignore = "Needs database to run"]
async fn test_count_reflects_seeded_global_row() {
    let db = database!(Migrator);
    let db_url = db.db_url();
    let base = helpers::init_server(db_url).await;

    let response: serde_json::Value = test_server::send_get_request(&base, "/count").await;
    assert_eq!(response["global"], 0);
}
