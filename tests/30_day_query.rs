use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use bujo_api::config::{AppConfig, DayZone};
use bujo_api::database::models::NewEntry;
use bujo_api::database::{JournalStore, MemoryStore};
use bujo_api::services::UserService;
use bujo_api::{app, AppState};

struct Journal {
    app: Router,
    store: Arc<dyn JournalStore>,
}

impl Journal {
    fn new(zone: DayZone) -> Self {
        let store: Arc<dyn JournalStore> = Arc::new(MemoryStore::new());
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        config.api.day_zone = zone;
        Self {
            app: app(AppState::new(store.clone(), config)),
            store,
        }
    }

    async fn user(&self, username: &str) -> Result<(i64, String)> {
        let (user, token) = UserService::new(self.store.clone())
            .create_user(username, "pw")
            .await?;
        Ok((user.id, token.key))
    }

    async fn entry_at(&self, owner: i64, text: &str, created_at: DateTime<Utc>) -> Result<i64> {
        let entry = self
            .store
            .insert_entry(NewEntry {
                user_id: owner,
                text: text.to_string(),
                notes: String::new(),
                created_at,
            })
            .await?;
        Ok(entry.id)
    }

    async fn post_entry(&self, token: &str, text: &str) -> Result<i64> {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::post("/entries")
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::json!({ "text": text }).to_string()))?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let entry: Value = serde_json::from_slice(&bytes)?;
        entry["id"].as_i64().context("missing entry id")
    }

    async fn day_ids(&self, token: &str, path: &str) -> Result<Vec<i64>> {
        let response = self
            .app
            .clone()
            .oneshot(
                Request::get(path)
                    .header(header::AUTHORIZATION, format!("Bearer {}", token))
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK, "GET {}", path);

        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let entries: Vec<Value> = serde_json::from_slice(&bytes)?;
        let mut ids: Vec<i64> = entries.iter().filter_map(|e| e["id"].as_i64()).collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// A wall-clock time in the server's zone, as stored
fn local(day: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&day.and_time(time))
        .earliest()
        .expect("local time exists")
        .with_timezone(&Utc)
}

fn noon() -> NaiveTime {
    NaiveTime::from_hms_opt(12, 0, 0).unwrap()
}

#[tokio::test]
async fn day_query_filters_by_local_creation_day_and_owner() -> Result<()> {
    let journal = Journal::new(DayZone::Local);
    let (alice, alice_token) = journal.user("alice").await?;
    let (bob, _) = journal.user("bob").await?;

    let today = Local::now().date_naive();
    let yesterday = today - Duration::days(1);
    let two_days_ago = today - Duration::days(2);

    let e1 = journal.entry_at(alice, "today", Utc::now()).await?;
    let e2 = journal
        .entry_at(alice, "yesterday", local(yesterday, noon()))
        .await?;
    let _e3 = journal.entry_at(bob, "bob today", Utc::now()).await?;

    assert_eq!(journal.day_ids(&alice_token, "/entries/day").await?, vec![e1]);
    assert_eq!(
        journal.day_ids(&alice_token, &format!("/entries/day?day={}", yesterday)).await?,
        vec![e2]
    );
    assert_eq!(
        journal.day_ids(&alice_token, "/entries/day?day=garbage").await?,
        vec![e1]
    );
    assert_eq!(
        journal.day_ids(&alice_token, &format!("/entries/day?day={}", two_days_ago)).await?,
        Vec::<i64>::new()
    );
    assert_eq!(
        journal.day_ids(&alice_token, "/entries/get_day_entries").await?,
        vec![e1]
    );
    Ok(())
}

#[tokio::test]
async fn entry_posted_now_is_in_local_today() -> Result<()> {
    let journal = Journal::new(DayZone::Local);
    let (_, token) = journal.user("dave").await?;

    let id = journal.post_entry(&token, "just now").await?;

    assert_eq!(journal.day_ids(&token, "/entries/day").await?, vec![id]);
    Ok(())
}

#[tokio::test]
async fn explicit_day_uses_local_midnights() -> Result<()> {
    let journal = Journal::new(DayZone::Local);
    let (owner, token) = journal.user("erin").await?;

    let day = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
    let next = day.succ_opt().unwrap();
    let start = local(day, NaiveTime::MIN);
    let end = local(next, NaiveTime::MIN);

    let first = journal.entry_at(owner, "local midnight", start).await?;
    let middle = journal.entry_at(owner, "local noon", local(day, noon())).await?;
    let last = journal
        .entry_at(owner, "last local moment", end - Duration::microseconds(1))
        .await?;
    journal.entry_at(owner, "next local day", end).await?;
    journal
        .entry_at(owner, "local day before", start - Duration::microseconds(1))
        .await?;

    assert_eq!(
        journal.day_ids(&token, "/entries/day?day=2023-05-01").await?,
        vec![first, middle, last]
    );
    Ok(())
}

#[tokio::test]
async fn utc_zone_bounds_are_half_open() -> Result<()> {
    let journal = Journal::new(DayZone::Utc);
    let (owner, token) = journal.user("carol").await?;

    let day = NaiveDate::from_ymd_opt(2023, 5, 1).unwrap();
    let start = Utc.from_utc_datetime(&day.and_time(NaiveTime::MIN));

    let first = journal.entry_at(owner, "midnight", start).await?;
    let last = journal
        .entry_at(owner, "last moment", start + Duration::days(1) - Duration::microseconds(1))
        .await?;
    journal.entry_at(owner, "next day", start + Duration::days(1)).await?;
    journal.entry_at(owner, "day before", start - Duration::microseconds(1)).await?;

    assert_eq!(
        journal.day_ids(&token, "/entries/day?day=2023-05-01").await?,
        vec![first, last]
    );
    assert_eq!(
        journal.day_ids(&token, "/entries/day?day=2023-05-01T18:30:00Z").await?,
        vec![first, last]
    );
    Ok(())
}
