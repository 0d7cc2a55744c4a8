//! Integration tests for the Fairweather API.
//!
//! Each [`TestContext`] serves the real router on an ephemeral port, backed
//! by its own migrated in-memory database, and talks to it with a
//! cookie-carrying `reqwest` client so sessions behave as in a browser.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p fairweather-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;

use reqwest::{Client, Response};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::SqlitePool;

use fairweather_server::{AppState, ServerConfig, build_router, db};

/// A running server plus a handle on its database.
pub struct TestContext {
    pub base_url: String,
    pub pool: SqlitePool,
}

impl TestContext {
    /// Start a server on `127.0.0.1:0` with a fresh database.
    pub async fn new() -> Self {
        let pool = db::create_pool(&SecretString::from("sqlite::memory:"), 1)
            .await
            .expect("Failed to create in-memory pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no address");

        let state = AppState::new(ServerConfig::default(), pool.clone());
        let app = build_router(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server error");
        });

        Self {
            base_url: format!("http://{addr}"),
            pool,
        }
    }

    /// A new browser-like client with its own cookie jar.
    pub fn client(&self) -> ApiClient {
        ApiClient {
            http: Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: self.base_url.clone(),
        }
    }
}

/// Thin JSON wrapper over one cookie jar.
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.http
            .get(self.url(path))
            .send()
            .await
            .expect("GET request failed")
    }

    pub async fn post(&self, path: &str, body: &Value) -> Response {
        self.http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("POST request failed")
    }

    pub async fn put(&self, path: &str, body: &Value) -> Response {
        self.http
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("PUT request failed")
    }

    pub async fn delete(&self, path: &str) -> Response {
        self.http
            .delete(self.url(path))
            .send()
            .await
            .expect("DELETE request failed")
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Response {
        self.post(
            "/api/register",
            &json!({ "username": username, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> Response {
        self.post(
            "/api/login",
            &json!({ "username": username, "password": password }),
        )
        .await
    }
}

/// Status code and parsed JSON body of a response.
pub async fn status_and_json(response: Response) -> (u16, Value) {
    let status = response.status().as_u16();
    let body = response.json().await.expect("Response body is not JSON");
    (status, body)
}
