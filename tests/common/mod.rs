#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

use services_api::auth::{generate_jwt, Claims, SERVICES_READ, SERVICES_WRITE};
use services_api::config::AppConfig;
use services_api::database::ServiceRepository;
use services_api::routes::{app, AppState};
use services_api::testing::MemoryServiceStore;

pub struct TestServer {
    pub base_url: String,
    pub store: Arc<MemoryServiceStore>,
    secret: String,
}

impl TestServer {
    /// Serve the API on an unused port, backed by an in-memory store
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(MemoryServiceStore::new(), Duration::from_secs(3)).await
    }

    pub async fn spawn_with(store: MemoryServiceStore, timeout: Duration) -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let config = AppConfig::development();
        let secret = config.security.jwt_secret.clone();
        let store = Arc::new(store);
        let repository = ServiceRepository::new(store.clone(), timeout);
        let router = app(AppState::new(repository, config));

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        let server = Self { base_url, store, secret };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            let url = format!("{}/v1/healthcheck", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
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

    pub fn token(&self, activated: bool, permissions: &[&str]) -> String {
        self.token_with_ttl(activated, permissions, chrono::Duration::hours(1))
    }

    pub fn token_with_ttl(&self, activated: bool, permissions: &[&str], ttl: chrono::Duration) -> String {
        let claims = Claims::new(
            1,
            activated,
            permissions.iter().map(|p| p.to_string()).collect(),
            ttl,
        );
        generate_jwt(&claims, &self.secret).expect("sign test token")
    }

    /// Token for an activated user with read and write access
    pub fn full_access_token(&self) -> String {
        self.token(true, &[SERVICES_READ, SERVICES_WRITE])
    }

    /// POST a service and return the created record
    pub async fn create_service(&self, token: &str, title: &str, description: &str) -> Result<Value> {
        let res = reqwest::Client::new()
            .post(self.url("/v1/services"))
            .bearer_auth(token)
            .json(&json!({ "title": title, "description": description }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED, "unexpected status: {}", res.status());
        let payload = res.json::<Value>().await?;
        Ok(payload["data"]["service"].clone())
    }
}
