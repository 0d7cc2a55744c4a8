//! Operator account deletion while a client still holds a session.

use fairweather_core::Username;
use fairweather_integration_tests::{TestContext, status_and_json};
use fairweather_server::db::UserRepository;
use serde_json::json;

#[tokio::test]
async fn test_deleted_user_loses_session_and_favorites() {
    let ctx = TestContext::new().await;
    let client = ctx.client();
    client.register("alice", "a@x.com", "pw1").await;
    for city in ["Paris", "Oslo"] {
        client
            .post("/api/favorites", &json!({ "city_name": city }))
            .await;
    }

    let users = UserRepository::new(&ctx.pool);
    let alice = users
        .get_by_username(&Username::parse("alice").expect("valid username"))
        .await
        .expect("lookup failed")
        .expect("alice exists");
    let removed = users.delete(alice.id).await.expect("delete failed");
    assert_eq!(removed, 2);

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorite_cities")
        .fetch_one(&ctx.pool)
        .await
        .expect("count failed");
    assert_eq!(remaining, 0);

    let (status, body) = status_and_json(client.get("/api/user").await).await;
    assert_eq!(status, 401);
    assert_eq!(body, json!({ "error": "Not authenticated" }));

    let (status, body) = status_and_json(client.get("/api/check-auth").await).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({ "authenticated": false }));
}

#[tokio::test]
async fn test_username_is_free_after_deletion() {
    let ctx = TestContext::new().await;
    let client = ctx.client();
    client.register("alice", "a@x.com", "pw1").await;

    let users = UserRepository::new(&ctx.pool);
    let alice = users
        .get_by_username(&Username::parse("alice").expect("valid username"))
        .await
        .expect("lookup failed")
        .expect("alice exists");
    users.delete(alice.id).await.expect("delete failed");

    let fresh = ctx.client();
    let response = fresh.register("alice", "a@x.com", "pw2").await;
    assert_eq!(response.status().as_u16(), 201);
}
