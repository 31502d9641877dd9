mod common;

use serde_json::json;

#[tokio::test]
async fn test_shorten_success() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store.clone());

    let response = server
        .post("/s")
        .json(&json!({ "url": "https://example.com/some/long/path" }))
        .await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["original"], "https://example.com/some/long/path");
    // First id under "test-salt" encodes to "kK".
    assert_eq!(json["shortened"], "http://short.test/kK");
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_shorten_deduplication() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store.clone());

    let first = server
        .post("/s")
        .json(&json!({ "url": "https://example.com/dup" }))
        .await
        .json::<serde_json::Value>();

    let second = server
        .post("/s")
        .json(&json!({ "url": "https://example.com/dup" }))
        .await
        .json::<serde_json::Value>();

    assert_eq!(first["shortened"], second["shortened"]);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn test_shorten_distinct_urls_get_distinct_tokens() {
    let store = common::memory_store(4);
    let (server, state) = common::test_server(store);

    let mut shortened = Vec::new();
    for url in [
        "https://example.com/a",
        "https://example.com/A",
        "https://example.com/a/",
    ] {
        let json = server
            .post("/s")
            .json(&json!({ "url": url }))
            .await
            .json::<serde_json::Value>();
        shortened.push(json["shortened"].as_str().unwrap().to_string());
    }

    assert_eq!(shortened[0], state.short_url(&state.codec.generate(1)));
    assert_eq!(shortened[1], state.short_url(&state.codec.generate(2)));
    assert_eq!(shortened[2], state.short_url(&state.codec.generate(3)));
}

#[tokio::test]
async fn test_shorten_invalid_url() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store.clone());

    for url in ["not-a-valid-url", "", "javascript:alert(1)", "ftp://example.com/file"] {
        let response = server.post("/s").json(&json!({ "url": url })).await;
        response.assert_status_bad_request();
    }

    assert_eq!(store.acquisitions(), 0);
}

#[tokio::test]
async fn test_shorten_oversized_url() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store.clone());

    let url = format!("https://example.com/{}", "a".repeat(3000));
    let response = server.post("/s").json(&json!({ "url": url })).await;

    response.assert_status_bad_request();
    assert_eq!(store.acquisitions(), 0);
}

#[tokio::test]
async fn test_shorten_missing_url_field() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store.clone());

    let response = server.post("/s").json(&json!({ "link": "https://a.example" })).await;

    assert_eq!(response.status_code(), 422);
    assert_eq!(store.acquisitions(), 0);
}

#[tokio::test]
async fn test_shorten_storage_unavailable() {
    let store = common::memory_store(4);
    let (server, _state) = common::test_server(store.clone());
    store.close();

    let response = server
        .post("/s")
        .json(&json!({ "url": "https://example.com" }))
        .await;

    assert_eq!(response.status_code(), 503);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "unavailable");
    assert_eq!(json["error"]["details"]["failure_code"], 1);
}
