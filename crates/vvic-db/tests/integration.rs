//! Offline unit tests for vvic-db pool configuration and row types.
//! These tests do not require a live database connection.

use std::path::PathBuf;

use vvic_core::{AppConfig, Environment};
use vvic_db::{ListingRow, PoolConfig, QueueJobRow};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        log_level: "info".to_string(),
        vvic_app_id: "app".to_string(),
        vvic_app_secret: "secret".to_string(),
        vvic_endpoint: "http://localhost/detail".to_string(),
        vvic_lang: "en".to_string(),
        failure_log_path: PathBuf::from("log.txt"),
        ids_url: "http://localhost/ids".to_string(),
        index_queue: "goods-to-es-normal".to_string(),
        default_region: 1,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        http_timeout_secs: 30,
        queue_connect_timeout_secs: 10,
        worker_poll_interval_ms: 2000,
        notify_max_retries: 3,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`ListingRow`] keeps the region
/// price maps as JSON. No database required.
#[test]
fn listing_row_has_expected_fields() {
    use chrono::Utc;

    let row = ListingRow {
        id: 7_i64,
        id_by_vendor: "vvic-1".to_string(),
        title: "Knit cardigan".to_string(),
        images: serde_json::json!(["https://img/a.jpg"]),
        specs: serde_json::json!([]),
        package: serde_json::json!({ "weight": "0.26" }),
        category_id: 1203,
        category_name: "Cardigans".to_string(),
        status: 1_i16,
        min_price: serde_json::json!({ "1": 1898 }),
        max_price: serde_json::json!({ "1": 1898 }),
        min_list_price: serde_json::json!({ "1": 2278 }),
        max_list_price: serde_json::json!({ "1": 2278 }),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    assert_eq!(row.min_price["1"], 1898);
    assert_eq!(row.status, 1);
}

#[test]
fn queue_job_row_has_expected_fields() {
    use chrono::Utc;

    let row = QueueJobRow {
        id: 1,
        queue: "vvic-immigrate".to_string(),
        payload: r#"{"item_vid":"v1"}"#.to_string(),
        status: "pending".to_string(),
        attempts: 0,
        last_error: None,
        locked_by: None,
        scheduled_at: Utc::now(),
        created_at: Utc::now(),
    };

    assert_eq!(row.status, "pending");
    assert!(row.locked_by.is_none());
}
