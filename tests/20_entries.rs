mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_then_retrieve() -> Result<()> {
    let server = common::ensure_server().await?;
    let user = server.user().await?;

    let created = user
        .create_entry(json!({ "text": "Write code for BuJo API", "user_id": 9999 }))
        .await?;

    assert_eq!(created["text"], "Write code for BuJo API");
    assert_eq!(created["notes"], "");
    assert_eq!(created["user_id"], user.id);
    assert_eq!(created["date_created"], created["date_modified"]);

    let id = created["id"].as_i64().unwrap();
    let res = user.get(&format!("/entries/{}", id)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let fetched: Value = res.json().await?;
    assert_eq!(fetched, created);
    Ok(())
}

#[tokio::test]
async fn list_returns_only_own_entries() -> Result<()> {
    let server = common::ensure_server().await?;
    let alice = server.user().await?;
    let bob = server.user().await?;

    alice.create_entry(json!({ "text": "a1" })).await?;
    alice.create_entry(json!({ "text": "a2", "notes": "n" })).await?;
    bob.create_entry(json!({ "text": "b1" })).await?;

    let res = alice.get("/entries").send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let entries: Vec<Value> = res.json().await?;
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["user_id"] == alice.id));
    Ok(())
}

#[tokio::test]
async fn create_validates_text() -> Result<()> {
    let server = common::ensure_server().await?;
    let user = server.user().await?;

    let res = user.post("/entries").json(&json!({ "text": "" })).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["text"], "This field may not be blank.");

    let res = user
        .post("/entries")
        .json(&json!({ "text": "x".repeat(256) }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = user.post("/entries").send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["field_errors"]["text"], "This field is required.");

    let res = user
        .post("/entries")
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(server.store.count_entries().await?, 0);

    user.create_entry(json!({ "text": "x".repeat(255) })).await?;
    assert_eq!(server.store.count_entries().await?, 1);
    Ok(())
}

#[tokio::test]
async fn update_replaces_fields_and_advances_modified() -> Result<()> {
    let server = common::ensure_server().await?;
    let user = server.user().await?;
    let created = user
        .create_entry(json!({ "text": "draft", "notes": "keep me" }))
        .await?;
    let id = created["id"].as_i64().unwrap();

    let res = user
        .put(&format!("/entries/{}", id))
        .json(&json!({ "text": "final" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let updated: Value = res.json().await?;

    assert_eq!(updated["text"], "final");
    assert_eq!(updated["notes"], "keep me");
    assert_eq!(updated["date_created"], created["date_created"]);
    let before = chrono::DateTime::parse_from_rfc3339(created["date_modified"].as_str().unwrap())?;
    let after = chrono::DateTime::parse_from_rfc3339(updated["date_modified"].as_str().unwrap())?;
    assert!(after >= before);

    let res = user
        .patch(&format!("/entries/{}", id))
        .json(&json!({ "notes": "" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let patched: Value = res.json().await?;
    assert_eq!(patched["text"], "final");
    assert_eq!(patched["notes"], "");

    let res = user
        .put(&format!("/entries/{}", id))
        .json(&json!({ "notes": "no text" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn delete_removes_entry() -> Result<()> {
    let server = common::ensure_server().await?;
    let user = server.user().await?;
    let created = user.create_entry(json!({ "text": "gone soon" })).await?;
    user.create_entry(json!({ "text": "stays" })).await?;
    let path = format!("/entries/{}", created["id"]);

    let res = user.delete(&path).send().await?;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.bytes().await?.is_empty());
    assert_eq!(server.store.count_entries().await?, 1);

    assert_eq!(user.get(&path).send().await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(user.delete(&path).send().await?.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let user = server.user().await?;

    assert_eq!(user.get("/entries/424242").send().await?.status(), StatusCode::NOT_FOUND);
    assert_eq!(user.get("/entries/abc").send().await?.status(), StatusCode::NOT_FOUND);
    let res = user
        .put("/entries/424242")
        .json(&json!({ "text": "x" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn other_users_entries_are_not_found() -> Result<()> {
    let server = common::ensure_server().await?;
    let alice = server.user().await?;
    let bob = server.user().await?;
    let entry = alice.create_entry(json!({ "text": "private" })).await?;
    let path = format!("/entries/{}", entry["id"]);

    assert_eq!(bob.get(&path).send().await?.status(), StatusCode::NOT_FOUND);
    let res = bob.put(&path).json(&json!({ "text": "mine now" })).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(bob.delete(&path).send().await?.status(), StatusCode::NOT_FOUND);

    let res = alice.get(&path).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["text"], "private");
    Ok(())
}

#[tokio::test]
async fn unauthenticated_requests_change_nothing() -> Result<()> {
    let server = common::ensure_server().await?;
    let user = server.user().await?;
    let entry = user.create_entry(json!({ "text": "original" })).await?;
    let path = server.url(&format!("/entries/{}", entry["id"]));
    let client = &server.client;

    let responses = vec![
        client.get(server.url("/entries")).send().await?,
        client.post(server.url("/entries")).json(&json!({ "text": "x" })).send().await?,
        client.get(&path).send().await?,
        client.put(&path).json(&json!({ "text": "changed" })).send().await?,
        client.patch(&path).json(&json!({ "text": "changed" })).send().await?,
        client.delete(&path).send().await?,
        client.get(server.url("/entries/day")).send().await?,
    ];
    for res in responses {
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    assert_eq!(server.store.count_entries().await?, 1);
    let res = user.get(&format!("/entries/{}", entry["id"])).send().await?;
    let body: Value = res.json().await?;
    assert_eq!(body["text"], "original");
    Ok(())
}
