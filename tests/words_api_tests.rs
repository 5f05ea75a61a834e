use axum::http::{Method, StatusCode};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use lexicon_backend::entries::EntrySchema;

mod common;

use common::{delete, get, post, put, rich_entry, send_raw, total_entries};

fn timestamp(value: &Value) -> DateTime<Utc> {
    value
        .as_str()
        .expect("timestamp should be a string")
        .parse::<DateTime<Utc>>()
        .expect("timestamp should be RFC 3339")
}

#[tokio::test]
async fn test_create_then_fetch_case_insensitive() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (status, created) = post(
        &app,
        "/api/words",
        json!({
            "word": "Okuhepa",
            "pronunciation": "oh-koo-heh-pah",
            "definitions": [{"type": "verb", "definition": "to need"}]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["word"], "okuhepa");
    assert_eq!(created["pronunciation"], "oh-koo-heh-pah");
    assert_eq!(created["definitions"][0]["type"], "verb");
    assert_eq!(created["definitions"][0]["definition"], "to need");
    assert_eq!(created["dateAdded"], created["lastModified"]);

    let (status, fetched) = get(&app, "/api/words/OKUHEPA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_create_requires_mandatory_fields() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let bodies = [
        json!({"pronunciation": "p", "definitions": [{"type": "noun", "definition": "d"}]}),
        json!({"word": "w", "definitions": [{"type": "noun", "definition": "d"}]}),
        json!({"word": "w", "pronunciation": "p"}),
        json!({"word": "w", "pronunciation": "p", "definitions": []}),
        json!({"word": "w", "pronunciation": "p", "definitions": [{"type": "noun"}]}),
        json!({"word": "   ", "pronunciation": "p", "definitions": [{"type": "noun", "definition": "d"}]}),
    ];

    for body in bodies {
        let (status, error) = post(&app, "/api/words", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(error["message"].is_string());
    }

    assert_eq!(total_entries(&app).await, 0);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (status, error) = send_raw(&app, Method::POST, "/api/words", "{\"word\": ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["message"].as_str().unwrap().starts_with("Invalid request body"));
}

#[tokio::test]
async fn test_duplicate_after_normalization_rejected() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (status, _) = post(&app, "/api/words", rich_entry("ondjou", "on-joh", "elephant")).await;
    assert_eq!(status, StatusCode::CREATED);

    for variant in ["ONDJOU", "  Ondjou  ", "ondjou"] {
        let (status, error) = post(&app, "/api/words", rich_entry(variant, "x", "y")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error["message"], "Word already exists");
    }

    assert_eq!(total_entries(&app).await, 1);
}

#[tokio::test]
async fn test_list_sorted_and_paginated() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    for word in ["delta", "Alpha", "echo", "charlie", "bravo"] {
        let (status, _) = post(&app, "/api/words", rich_entry(word, "p", "d")).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, page) = get(&app, "/api/words?page=1&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    let words: Vec<&str> = page["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["word"].as_str().unwrap())
        .collect();
    assert_eq!(words, vec!["alpha", "bravo"]);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["totalEntries"], 5);

    let (_, page) = get(&app, "/api/words?page=3&limit=2").await;
    let entries = page["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["word"], "echo");

    let (status, page) = get(&app, "/api/words?page=9&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert!(page["entries"].as_array().unwrap().is_empty());
    assert_eq!(page["currentPage"], 9);
    assert_eq!(page["totalEntries"], 5);
}

#[tokio::test]
async fn test_list_defaults_on_bad_params() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    for i in 0..12 {
        let word = format!("word{i:02}");
        post(&app, "/api/words", rich_entry(&word, "p", "d")).await;
    }

    let (status, page) = get(&app, "/api/words?page=abc&limit=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["entries"].as_array().unwrap().len(), 10);
    assert_eq!(page["totalPages"], 2);

    let (_, page) = get(&app, "/api/words").await;
    assert_eq!(page["entries"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_list_tolerates_repeated_params() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    for i in 0..5 {
        let word = format!("word{i:02}");
        post(&app, "/api/words", rich_entry(&word, "p", "d")).await;
    }

    let (status, page) = get(&app, "/api/words?page=1&page=2&limit=2&limit=4").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["currentPage"], 1);
    assert_eq!(page["entries"].as_array().unwrap().len(), 2);
    assert_eq!(page["totalPages"], 3);
    assert_eq!(page["entries"][0]["word"], "word00");
}

#[tokio::test]
async fn test_search_requires_term() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (status, error) = get(&app, "/api/words/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "Search term is required");

    let (status, _) = get(&app, "/api/words/search?q=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_repeated_term_is_json_bad_request() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (status, error) = get(&app, "/api/words/search?q=a&q=b").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error.is_object(), "expected a JSON error body, got {error}");
    assert!(!error["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_matches_word_definition_and_example() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    post(&app, "/api/words", rich_entry("omeva", "oh-meh-vah", "water")).await;
    post(&app, "/api/words", rich_entry("ombura", "om-boo-rah", "rain that brings WATER")).await;
    post(
        &app,
        "/api/words",
        json!({
            "word": "okulya",
            "pronunciation": "oh-kool-yah",
            "definitions": [{"type": "verb", "definition": "to eat", "example": "Eat, then drink water"}]
        }),
    )
    .await;
    post(&app, "/api/words", rich_entry("ondjou", "on-joh", "elephant")).await;

    let (status, results) = get(&app, "/api/words/search?q=WaTeR").await;
    assert_eq!(status, StatusCode::OK);
    let words: Vec<&str> = results
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["word"].as_str().unwrap())
        .collect();
    assert_eq!(words, vec!["omeva", "ombura", "okulya"]);

    let (_, results) = get(&app, "/api/words/search?q=OND").await;
    assert_eq!(results.as_array().unwrap().len(), 1);

    let (_, results) = get(&app, "/api/words/search?q=oh-meh").await;
    assert!(results.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_caps_results() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    for i in 0..15 {
        let word = format!("shared{i:02}");
        post(&app, "/api/words", rich_entry(&word, "p", "d")).await;
    }

    let (status, results) = get(&app, "/api/words/search?q=shared").await;
    assert_eq!(status, StatusCode::OK);
    let results = results.as_array().unwrap();
    assert_eq!(results.len(), 10);
    assert_eq!(results[0]["word"], "shared00");
}

#[tokio::test]
async fn test_update_round_trip() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (_, created) = post(&app, "/api/words", rich_entry("Ekaya", "eh-kah-yah", "a house")).await;

    let (status, updated) = put(
        &app,
        "/api/words/EKAYA",
        json!({
            "word": "Ekaya",
            "pronunciation": "eh-KAH-yah",
            "definitions": [
                {"type": "noun", "definition": "a home", "example": "Ekaya lyandje"},
                {"type": "noun", "definition": "a household"}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["pronunciation"], "eh-KAH-yah");
    assert_eq!(updated["definitions"].as_array().unwrap().len(), 2);
    assert_eq!(updated["dateAdded"], created["dateAdded"]);
    assert_eq!(updated["id"], created["id"]);

    let (status, fetched) = get(&app, "/api/words/ekaya").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);
    assert_eq!(fetched["definitions"][0]["example"], "Ekaya lyandje");
    assert!(timestamp(&fetched["lastModified"]) > timestamp(&fetched["dateAdded"]));
}

#[tokio::test]
async fn test_update_missing_fields_leaves_record() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (_, created) = post(&app, "/api/words", rich_entry("oshana", "oh-shah-nah", "seasonal river")).await;

    let (status, _) = put(
        &app,
        "/api/words/oshana",
        json!({"word": "oshana", "definitions": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, fetched) = get(&app, "/api/words/oshana").await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn test_update_unknown_word_not_found() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (status, error) = put(&app, "/api/words/ghost", rich_entry("ghost", "g", "d")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["message"], "Word not found");
}

#[tokio::test]
async fn test_update_rename_onto_existing_word_rejected() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    post(&app, "/api/words", rich_entry("first", "p", "d")).await;
    post(&app, "/api/words", rich_entry("second", "p", "d")).await;

    let (status, error) = put(&app, "/api/words/second", rich_entry("FIRST", "p", "d")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["message"], "Word already exists");

    let (status, _) = get(&app, "/api/words/second").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_can_rename_word() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    post(&app, "/api/words", rich_entry("colour", "p", "d")).await;
    let (status, updated) = put(&app, "/api/words/colour", rich_entry(" Color ", "p", "d")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["word"], "color");

    let (status, _) = get(&app, "/api/words/colour").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = get(&app, "/api/words/color").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_flow() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    post(&app, "/api/words", rich_entry("ondjila", "on-jee-lah", "road")).await;
    post(&app, "/api/words", rich_entry("omuti", "oh-moo-tee", "tree")).await;

    let (status, error) = delete(&app, "/api/words/nothing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error["message"], "Word not found");
    assert_eq!(total_entries(&app).await, 2);

    let (status, body) = delete(&app, "/api/words/ONDJILA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Word deleted successfully");
    assert_eq!(total_entries(&app).await, 1);

    let (status, _) = get(&app, "/api/words/ondjila").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route_not_found() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (status, body) = get(&app, "/nonexistent/path").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn test_health_reports_store() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    post(&app, "/api/words", rich_entry("one", "p", "d")).await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
    assert_eq!(body["entries"], 1);
    assert_eq!(body["schema"], "rich");

    let (status, body) = get(&app, "/health/live").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_concurrent_creates_keep_one_entry() {
    let app = common::create_test_app(EntrySchema::Rich).await;

    let (a, b, c) = tokio::join!(
        post(&app, "/api/words", rich_entry("race", "p", "one")),
        post(&app, "/api/words", rich_entry("RACE", "p", "two")),
        post(&app, "/api/words", rich_entry(" race ", "p", "three")),
    );

    let statuses = [a.0, b.0, c.0];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(), 2);
    assert_eq!(total_entries(&app).await, 1);
}

#[tokio::test]
async fn test_store_failure_is_generic_internal_error() {
    let (app, state) = common::create_test_app_with_state(EntrySchema::Rich).await;

    let (status, _) = post(&app, "/api/words", rich_entry("omeva", "oh-meh-vah", "water")).await;
    assert_eq!(status, StatusCode::CREATED);

    state.db_proxy().close().await;

    let requests = [
        (Method::GET, "/api/words/omeva"),
        (Method::DELETE, "/api/words/omeva"),
        (Method::GET, "/api/words"),
        (Method::GET, "/api/words/search?q=om"),
    ];
    for (method, uri) in requests {
        let (status, body) = common::send(&app, method.clone(), uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{method} {uri}");
        assert_eq!(body, json!({"message": "Internal server error"}), "{method} {uri}");
    }

    let (status, body) = put(&app, "/api/words/omeva", rich_entry("omeva", "p", "d")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Internal server error"}));
}
