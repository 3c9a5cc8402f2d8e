mod common;

use std::sync::Arc;

use axum::http::StatusCode;
use common::{app, get, post_json, send, InMemoryDb, ScriptedCompletion, TEST_KEY};
use serde_json::{json, Value};

fn deck(size: usize) -> Value {
    let cards: Vec<Value> = (1..=size)
        .map(|n| json!({"question": format!("Q{n}"), "answer": format!("A{n}")}))
        .collect();
    Value::Array(cards)
}

#[tokio::test]
async fn library_routes_require_a_session() {
    let app = app(
        Arc::new(InMemoryDb::default()),
        ScriptedCompletion::replying("unused"),
        Some(TEST_KEY),
    );

    for uri in ["/library/summaries", "/library/flashcards", "/library/qa"] {
        let (status, body) = send(app.clone(), get(uri, Some("not-a-session"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body, json!({"error": "Unauthorized"}));
    }
}

#[tokio::test]
async fn saved_summary_gets_a_dated_title_and_can_be_read_back() {
    let db = Arc::new(InMemoryDb::default());
    let (user_id, token) = db.signed_in_user();
    let app = app(db.clone(), ScriptedCompletion::replying("unused"), Some(TEST_KEY));

    let (status, saved) = send(
        app.clone(),
        post_json(
            "/library/summaries",
            json!({"original_text": "Chapter 3", "summary_text": "Key points"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(saved["title"].as_str().unwrap().starts_with("Summary "));

    let id = saved["id"].as_str().unwrap();
    let (status, fetched) = send(app.clone(), get(&format!("/library/summaries/{id}"), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["summary_text"], "Key points");

    let (status, listed) = send(app, get("/library/summaries", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(db.summaries.lock().unwrap()[0].user_id, user_id);
}

#[tokio::test]
async fn another_users_summary_is_not_found() {
    let db = Arc::new(InMemoryDb::default());
    let (_, owner_token) = db.signed_in_user();
    let (_, other_token) = db.signed_in_user();
    let app = app(db, ScriptedCompletion::replying("unused"), Some(TEST_KEY));

    let (_, saved) = send(
        app.clone(),
        post_json(
            "/library/summaries",
            json!({"original_text": "Notes", "summary_text": "Short", "title": "Mine"}),
            Some(&owner_token),
        ),
    )
    .await;
    let id = saved["id"].as_str().unwrap();

    let (status, body) = send(app, get(&format!("/library/summaries/{id}"), Some(&other_token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn deck_is_saved_card_by_card() {
    let db = Arc::new(InMemoryDb::default());
    let (_, token) = db.signed_in_user();
    let app = app(db.clone(), ScriptedCompletion::replying("unused"), Some(TEST_KEY));

    let (status, body) = send(
        app.clone(),
        post_json(
            "/library/flashcards",
            json!({"original_text": "Cells", "title": "Biology", "cards": deck(3)}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"saved": 3, "title": "Biology"}));

    let (status, listed) = send(app, get("/library/flashcards", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn partial_deck_failure_keeps_the_other_cards() {
    let db = Arc::new(InMemoryDb {
        reject_questions: vec!["Q7".to_string()],
        ..Default::default()
    });
    let (_, token) = db.signed_in_user();
    let app = app(db.clone(), ScriptedCompletion::replying("unused"), Some(TEST_KEY));

    let (status, body) = send(
        app,
        post_json(
            "/library/flashcards",
            json!({"original_text": "Cells", "cards": deck(10)}),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to save flashcards");
    assert_eq!(body["details"]["saved"], 9);
    assert_eq!(body["details"]["failed"][0]["index"], 6);
    // The store's own message stays out of the response.
    assert_eq!(body["details"]["failed"][0]["error"], "Internal server error");

    let stored = db.flashcards.lock().unwrap();
    assert_eq!(stored.len(), 9);
    assert!(stored.iter().all(|c| c.question != "Q7"));
}

#[tokio::test]
async fn empty_deck_is_rejected() {
    let db = Arc::new(InMemoryDb::default());
    let (_, token) = db.signed_in_user();
    let app = app(db, ScriptedCompletion::replying("unused"), Some(TEST_KEY));

    let (status, body) = send(
        app,
        post_json(
            "/library/flashcards",
            json!({"original_text": "Cells", "cards": []}),
            Some(&token),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "No flashcards to save"}));
}

#[tokio::test]
async fn oversized_deck_is_rejected_before_any_insert() {
    let db = Arc::new(InMemoryDb::default());
    let (_, token) = db.signed_in_user();
    let app = app(db.clone(), ScriptedCompletion::replying("unused"), Some(TEST_KEY));

    let (status, body) = send(
        app.clone(),
        post_json(
            "/library/flashcards",
            json!({"original_text": "Cells", "cards": deck(26)}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "A deck holds at most 25 flashcards"}));
    assert!(db.flashcards.lock().unwrap().is_empty());

    let (status, _) = send(
        app,
        post_json(
            "/library/flashcards",
            json!({"original_text": "Cells", "cards": deck(25)}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(db.flashcards.lock().unwrap().len(), 25);
}

#[tokio::test]
async fn qa_history_lists_only_the_callers_answers() {
    let db = Arc::new(InMemoryDb::default());
    let (_, token) = db.signed_in_user();
    let (_, other_token) = db.signed_in_user();
    let app = app(db, ScriptedCompletion::replying("Osmosis is..."), Some(TEST_KEY));

    let (status, _) = send(
        app.clone(),
        post_json(
            "/functions/ask-question",
            json!({"question": "What is osmosis?"}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, mine) = send(app.clone(), get("/library/qa", Some(&token))).await;
    assert_eq!(mine[0]["question"], "What is osmosis?");
    assert_eq!(mine[0]["answer"], "Osmosis is...");

    let (_, theirs) = send(app, get("/library/qa", Some(&other_token))).await;
    assert_eq!(theirs, json!([]));
}
