mod common;

#[tokio::test]
async fn test_health_endpoint_success() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store);

    let response = server.get("/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["gateway"]["status"], "ok");
    assert_eq!(json["checks"]["storage"]["status"], "ok");
}

#[tokio::test]
async fn test_health_endpoint_structure() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store);

    let response = server.get("/health").await;

    let json = response.json::<serde_json::Value>();

    assert!(json.get("status").is_some());
    assert!(json.get("version").is_some());
    assert!(json.get("checks").is_some());
    assert!(json["checks"].get("gateway").is_some());
    assert!(json["checks"].get("storage").is_some());
}

#[tokio::test]
async fn test_health_endpoint_degraded_when_storage_closed() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store.clone());

    store.close();

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), 503);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["gateway"]["status"], "ok");
    assert_eq!(json["checks"]["storage"]["status"], "error");
}
