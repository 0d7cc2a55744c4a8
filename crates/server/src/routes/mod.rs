//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! POST   /api/register        - Create an account and log in
//! POST   /api/login           - Log in with username and password
//! POST   /api/logout          - End the session (always succeeds)
//! GET    /api/check-auth      - Report whether the session is logged in
//!
//! # Account (requires auth)
//! GET    /api/user            - Current account
//! PUT    /api/settings        - Update temperature unit
//!
//! # Favorites (requires auth)
//! GET    /api/favorites       - List bookmarked cities
//! POST   /api/favorites       - Bookmark a city
//! DELETE /api/favorites/{id}  - Remove a bookmark
//! ```

pub mod account;
pub mod auth;
pub mod favorites;
pub mod views;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the JSON API router (mounted under `/api`).
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/check-auth", get(auth::check_auth))
        .route("/user", get(account::current_user))
        .route("/settings", put(account::update_settings))
        .route("/favorites", get(favorites::list).post(favorites::add))
        .route("/favorites/{id}", delete(favorites::remove))
}

/// Create all routes.
pub fn routes() -> Router<AppState> {
    Router::new().nest("/api", api_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use sqlx::SqlitePool;
    use tower::ServiceExt;

    use crate::app::build_router;
    use crate::config::ServerConfig;
    use crate::db::test_support::memory_pool;
    use crate::middleware::session::SESSION_COOKIE_NAME;
    use crate::state::AppState;

    /// Drives the router one request at a time, carrying the session cookie.
    struct TestClient {
        app: Router,
        pool: SqlitePool,
        cookie: Option<String>,
    }

    impl TestClient {
        async fn new() -> Self {
            let pool = memory_pool().await;
            let state = AppState::new(ServerConfig::default(), pool.clone());
            Self {
                app: build_router(state),
                pool,
                cookie: None,
            }
        }

        async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
            let mut builder = Request::builder().method(method).uri(uri);
            if let Some(cookie) = &self.cookie {
                builder = builder.header(header::COOKIE, cookie);
            }
            let request = match body {
                Some(json) => builder
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(json.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };

            let response = self.app.clone().oneshot(request).await.unwrap();

            if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
                let pair = set_cookie
                    .to_str()
                    .unwrap()
                    .split(';')
                    .next()
                    .unwrap()
                    .to_string();
                let removed = pair == format!("{SESSION_COOKIE_NAME}=");
                self.cookie = (!removed).then_some(pair);
            }

            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap()
            };
            (status, value)
        }

        async fn register(&mut self, username: &str, email: &str) -> (StatusCode, Value) {
            self.send(
                Method::POST,
                "/api/register",
                Some(json!({ "username": username, "email": email, "password": "pw1" })),
            )
            .await
        }
    }

    #[tokio::test]
    async fn test_protected_routes_require_session() {
        let mut client = TestClient::new().await;

        for (method, uri) in [
            (Method::GET, "/api/user"),
            (Method::GET, "/api/favorites"),
            (Method::DELETE, "/api/favorites/1"),
        ] {
            let (status, body) = client.send(method, uri, None).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
            assert_eq!(body, json!({ "error": "Not authenticated" }));
        }

        let (status, _) = client
            .send(Method::PUT, "/api/settings", Some(json!({ "temperature_unit": "celsius" })))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_check_auth_anonymous() {
        let mut client = TestClient::new().await;
        let (status, body) = client.send(Method::GET, "/api/check-auth", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "authenticated": false }));
    }

    #[tokio::test]
    async fn test_register_logs_in() {
        let mut client = TestClient::new().await;

        let (status, body) = client.register("alice", "a@x.com").await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "User registered successfully");
        assert_eq!(body["user"]["username"], "alice");
        assert_eq!(body["user"]["temperature_unit"], "celsius");
        assert!(body["user"].get("password_hash").is_none());

        let (status, body) = client.send(Method::GET, "/api/check-auth", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["user"]["email"], "a@x.com");
    }

    #[tokio::test]
    async fn test_register_missing_fields() {
        let mut client = TestClient::new().await;
        let (status, body) = client
            .send(Method::POST, "/api/register", Some(json!({ "username": "alice" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing required fields" }));
    }

    #[tokio::test]
    async fn test_login_missing_fields() {
        let mut client = TestClient::new().await;
        let (status, body) = client
            .send(Method::POST, "/api/login", Some(json!({ "username": "alice" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Missing username or password" }));
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let client = TestClient::new().await;
        let request = Request::post("/api/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"username\": "))
            .unwrap();

        let response = client.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_logout_without_session() {
        let mut client = TestClient::new().await;
        let (status, body) = client.send(Method::POST, "/api/logout", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "message": "Logout successful" }));
    }

    #[tokio::test]
    async fn test_settings_rejects_unknown_unit() {
        let mut client = TestClient::new().await;
        client.register("alice", "a@x.com").await;

        let (status, body) = client
            .send(Method::PUT, "/api/settings", Some(json!({ "temperature_unit": "kelvin" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("kelvin"));
    }

    #[tokio::test]
    async fn test_settings_without_unit_keeps_current() {
        let mut client = TestClient::new().await;
        client.register("alice", "a@x.com").await;

        let (status, body) = client
            .send(Method::PUT, "/api/settings", Some(json!({})))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "message": "Settings updated successfully", "temperature_unit": "celsius" })
        );
    }

    #[tokio::test]
    async fn test_favorite_requires_city_name() {
        let mut client = TestClient::new().await;
        client.register("alice", "a@x.com").await;

        let (status, body) = client
            .send(Method::POST, "/api/favorites", Some(json!({ "latitude": 1.0 })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "City name is required" }));
    }

    #[tokio::test]
    async fn test_delete_favorite_with_bad_id_is_404() {
        let mut client = TestClient::new().await;
        client.register("alice", "a@x.com").await;

        let (status, body) = client
            .send(Method::DELETE, "/api/favorites/not-a-number", None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Favorite not found" }));

        let (status, _) = client.send(Method::DELETE, "/api/favorites/999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_session_store_failure_is_500() {
        let mut client = TestClient::new().await;
        client.register("alice", "a@x.com").await;

        sqlx::query("DROP TABLE tower_sessions")
            .execute(&client.pool)
            .await
            .unwrap();

        for uri in ["/api/user", "/api/check-auth"] {
            let (status, body) = client.send(Method::GET, uri, None).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(body, json!({ "error": "Internal server error" }));
        }
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let mut client = TestClient::new().await;
        let request = Request::get("/health").body(Body::empty()).unwrap();
        let response = client.app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let (status, _) = client.send(Method::GET, "/health/ready", None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
