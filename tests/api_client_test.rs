use anyhow::Result;
use httpmock::prelude::*;
use httpmock::Method::PATCH;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tomato_admin::core::{SessionStore, StoredSession};
use tomato_admin::domain::model::{Role, User};
use tomato_admin::{AdminError, ApiClient, MemorySessionStore};

fn admin_session(token: &str) -> StoredSession {
    StoredSession {
        access_token: token.to_string(),
        user: User {
            id: "admin-1".to_string(),
            email: "admin@tomato.test".to_string(),
            role: Some(Role::Admin),
            ..Default::default()
        },
    }
}

fn client(server: &MockServer, store: Arc<MemorySessionStore>) -> ApiClient {
    ApiClient::new(&server.url("/api"), Duration::from_secs(5), store).unwrap()
}

/// 已登入時每個請求都帶 Bearer token
#[tokio::test]
async fn test_bearer_token_is_attached() -> Result<()> {
    let server = MockServer::start();
    let store = Arc::new(MemorySessionStore::with_session(admin_session("tok-abc")));

    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/api/diseases")
            .header("authorization", "Bearer tok-abc");
        then.status(200).json_body(json!([]));
    });

    let body = client(&server, store).get("diseases").await?;

    assert_eq!(body, json!([]));
    mock.assert();
    Ok(())
}

/// 沒登入就不帶 Authorization header
#[tokio::test]
async fn test_anonymous_request_has_no_token() -> Result<()> {
    let server = MockServer::start();
    let store = Arc::new(MemorySessionStore::default());

    let with_token = server.mock(|when, then| {
        when.method(POST)
            .path("/api/auth/login")
            .header_exists("authorization");
        then.status(500);
    });
    let anonymous = server.mock(|when, then| {
        when.method(POST).path("/api/auth/login");
        then.status(200).json_body(json!({ "ok": true }));
    });

    client(&server, store)
        .post("auth/login", &json!({ "email": "a@b.c", "password": "x" }))
        .await?;

    with_token.assert_hits(0);
    anonymous.assert();
    Ok(())
}

/// 401 會清掉本機 session，後續請求不再帶 token
#[tokio::test]
async fn test_unauthorized_clears_session() -> Result<()> {
    let server = MockServer::start();
    let store = Arc::new(MemorySessionStore::with_session(admin_session("expired")));
    let api = client(&server, store.clone());

    let mock = server.mock(|when, then| {
        when.method(GET).path("/api/auth/me");
        then.status(401)
            .json_body(json!({ "message": "Unauthorized", "statusCode": 401 }));
    });

    let result = api.get("auth/me").await;

    assert!(matches!(result, Err(AdminError::Unauthorized)));
    assert!(store.load()?.is_none());
    mock.assert();
    Ok(())
}

#[tokio::test]
async fn test_error_message_from_body() -> Result<()> {
    let server = MockServer::start();
    let api = client(&server, Arc::new(MemorySessionStore::default()));

    server.mock(|when, then| {
        when.method(POST).path("/api/diseases");
        then.status(400)
            .json_body(json!({ "message": ["name must be a string", "name should not be empty"] }));
    });
    server.mock(|when, then| {
        when.method(DELETE).path("/api/medecines/m-9");
        then.status(403)
            .json_body(json!({ "message": "Forbidden resource" }));
    });

    match api.post("diseases", &json!({})).await {
        Err(AdminError::ApiError { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "name must be a string; name should not be empty");
        }
        other => panic!("expected ApiError, got {:?}", other),
    }

    let err = api.delete("medecines/m-9").await.unwrap_err();
    assert_eq!(err.user_friendly_message(), "Forbidden resource");
    Ok(())
}

/// 204 之類的空回應轉成 null
#[tokio::test]
async fn test_empty_body_is_null() -> Result<()> {
    let server = MockServer::start();
    let api = client(&server, Arc::new(MemorySessionStore::default()));

    server.mock(|when, then| {
        when.method(PATCH).path("/api/notifications/mark-all-read");
        then.status(204);
    });

    let body = api.patch_empty("notifications/mark-all-read").await?;
    assert!(body.is_null());
    Ok(())
}
