#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use bujo_api::config::AppConfig;
use bujo_api::database::{JournalStore, MemoryStore};
use bujo_api::{app, AppState};

/// An application instance served on an ephemeral local port, backed by its
/// own in-memory store.
pub struct TestServer {
    pub base_url: String,
    pub store: Arc<dyn JournalStore>,
    pub client: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Result<Self> {
        let store: Arc<dyn JournalStore> = Arc::new(MemoryStore::new());
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        let router = app(AppState::new(store.clone(), config));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind ephemeral port")?;
        let addr = listener.local_addr()?;

        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            store,
            client: reqwest::Client::new(),
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register a user and return `(user_id, token)`
    pub async fn register(&self, username: &str, password: &str) -> Result<(i64, String)> {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await?;
        anyhow::ensure!(res.status() == StatusCode::OK, "register failed: {}", res.status());

        let body: Value = res.json().await?;
        let id = body["user"]["id"].as_i64().context("missing user id")?;
        let token = body["token"].as_str().context("missing token")?.to_string();
        Ok((id, token))
    }

    /// Register a fresh user and hand back a client view authenticated as them
    pub async fn user(&self) -> Result<UserClient<'_>> {
        let username = unique_username();
        let (id, token) = self.register(&username, "correct horse").await?;
        Ok(UserClient {
            server: self,
            id,
            username,
            token,
        })
    }
}

/// Requests made on behalf of one registered user
pub struct UserClient<'a> {
    pub server: &'a TestServer,
    pub id: i64,
    pub username: String,
    pub token: String,
}

impl UserClient<'_> {
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.server.client.get(self.server.url(path)).bearer_auth(&self.token)
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.server.client.post(self.server.url(path)).bearer_auth(&self.token)
    }

    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.server.client.put(self.server.url(path)).bearer_auth(&self.token)
    }

    pub fn patch(&self, path: &str) -> reqwest::RequestBuilder {
        self.server.client.patch(self.server.url(path)).bearer_auth(&self.token)
    }

    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.server.client.delete(self.server.url(path)).bearer_auth(&self.token)
    }

    /// Create an entry and return its representation
    pub async fn create_entry(&self, body: Value) -> Result<Value> {
        let res = self.post("/entries").json(&body).send().await?;
        anyhow::ensure!(res.status() == StatusCode::CREATED, "create failed: {}", res.status());
        Ok(res.json().await?)
    }
}

pub fn unique_username() -> String {
    format!("user_{}", uuid::Uuid::new_v4().simple())
}

pub async fn ensure_server() -> Result<TestServer> {
    let server = TestServer::spawn().await?;
    server.wait_ready(Duration::from_secs(5)).await?;
    Ok(server)
}
