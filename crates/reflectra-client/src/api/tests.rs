use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;

use super::*;
use crate::backend::SocialBackend;
use crate::testing::{api_client, serve};
use reflectra_shared::types::UserId;
use reflectra_store::{CredentialStore, MemoryStore, StoreError, StoredSession};

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn test_bearer_attached_to_protected_calls() {
    let router = Router::new().route(
        "/api/posts/",
        get(|headers: HeaderMap| async move {
            if bearer(&headers).as_deref() == Some("Bearer tok-1") {
                (
                    StatusCode::OK,
                    Json(json!([{
                        "id": 1,
                        "user_id": 2,
                        "username": "bob",
                        "content_text": "morning run",
                        "timestamp": "2025-03-01T08:00:00Z"
                    }])),
                )
            } else {
                (StatusCode::UNAUTHORIZED, Json(json!({"detail": "no token"})))
            }
        }),
    );
    let origin = serve(router).await;
    let (api, _) = api_client(&origin, Some("tok-1"));

    let posts = api.posts().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].username, "bob");
}

#[tokio::test]
async fn test_unauthorized_protected_call_expires_session() {
    let router = Router::new().route(
        "/api/posts/",
        get(|| async {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"detail": "Given token not valid for any token type"})),
            )
        }),
    );
    let origin = serve(router).await;
    let (api, expired) = api_client(&origin, Some("stale"));

    let err = api.posts().await.unwrap_err();
    assert_eq!(err, ReflectraError::Unauthenticated);
    assert!(!api.session().is_signed_in());
    assert_eq!(api.session().display_name(), None);
    assert_eq!(expired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_missing_credential_places_no_call() {
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = hits.clone();
    let router = Router::new().route(
        "/api/following/",
        get(move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Json(json!({"following": []}))
            }
        }),
    );
    let origin = serve(router).await;
    let (api, expired) = api_client(&origin, None);

    assert_eq!(api.following().await, Err(ReflectraError::Unauthenticated));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_status_classification() {
    let router = Router::new()
        .route(
            "/api/follow/:id/",
            post(|| async {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({"error": "User not found"})),
                )
            }),
        )
        .route(
            "/api/unfollow/:id/",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "You are not following this user"})),
                )
            }),
        )
        .route(
            "/api/inbox/",
            get(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
        )
        .route(
            "/api/moodlogs/",
            get(|| async { (StatusCode::FORBIDDEN, Json(json!({"detail": "nope"}))) }),
        );
    let origin = serve(router).await;
    let (api, expired) = api_client(&origin, Some("tok"));

    assert_eq!(
        api.follow(UserId(99)).await,
        Err(ReflectraError::NotFound("User not found".into()))
    );
    assert_eq!(
        api.unfollow(UserId(2)).await,
        Err(ReflectraError::ValidationFailed(ValidationError::Server(
            "You are not following this user".into()
        )))
    );
    let err = api.inbox().await.unwrap_err();
    assert!(matches!(err, ReflectraError::Transient(_)));
    assert!(err.is_retryable());
    assert_eq!(
        api.mood_logs().await,
        Err(ReflectraError::Rejected {
            status: 403,
            message: "nope".into()
        })
    );

    // None of these touch the session.
    assert!(api.session().is_signed_in());
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_unreachable_backend() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let (api, _) = api_client(&format!("http://{addr}"), Some("tok"));
    let err = api.posts().await.unwrap_err();
    assert!(matches!(err, ReflectraError::Unreachable(_)));
    assert_eq!(err.user_message(), "Server error. Please try again.");
}

#[tokio::test]
async fn test_search_sends_query_and_decodes_users() {
    let router = Router::new().route(
        "/api/find_users/",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let q = params.get("q").cloned().unwrap_or_default();
            Json(json!([{"id": 3, "username": q, "email": null, "bio": "hi", "mood_preference": ""}]))
        }),
    );
    let origin = serve(router).await;
    let (api, _) = api_client(&origin, Some("tok"));

    let users = api.search_users("carol").await.unwrap();
    assert_eq!(users[0].username, "carol");
    assert_eq!(users[0].email, "");
    assert_eq!(users[0].mood_preference, None);
}

#[tokio::test]
async fn test_conversation_and_send_decode_messages() {
    let router = Router::new()
        .route(
            "/api/messages/:username/",
            get(|| async {
                Json(json!([{
                    "id": 1,
                    "sender": 1,
                    "receiver": 2,
                    "sender_username": "alice",
                    "receiver_username": "bob",
                    "content": "hey",
                    "timestamp": "2025-03-01T08:00:00Z",
                    "is_read": true
                }]))
            }),
        )
        .route(
            "/api/messages/send/",
            post(|Json(body): Json<serde_json::Value>| async move {
                (
                    StatusCode::CREATED,
                    Json(json!({
                        "id": 2,
                        "sender": "alice",
                        "receiver": body["receiver"],
                        "content": body["content"],
                        "timestamp": "2025-03-01T08:01:00Z",
                        "is_read": false
                    })),
                )
            }),
        );
    let origin = serve(router).await;
    let (api, _) = api_client(&origin, Some("tok"));

    let history = api.conversation("bob").await.unwrap();
    assert_eq!(history[0].sender, "alice");
    assert_eq!(history[0].receiver, "bob");

    let sent = api
        .send_message(&reflectra_shared::protocol::NewMessage {
            receiver: "bob".into(),
            content: "still there?".into(),
        })
        .await
        .unwrap();
    assert_eq!(sent.receiver, "bob");
    assert_eq!(sent.content, "still there?");
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let router = Router::new().route("/api/me/", get(|| async { "not json" }));
    let origin = serve(router).await;
    let (api, _) = api_client(&origin, Some("tok"));

    assert!(matches!(
        api.current_user().await,
        Err(ReflectraError::Decode(_))
    ));
}

#[tokio::test]
async fn test_delete_account_signs_out() {
    let router = Router::new().route(
        "/api/delete_account/",
        delete(|| async { Json(json!({"message": "Account deleted"})) }),
    );
    let origin = serve(router).await;
    let (api, expired) = api_client(&origin, Some("tok"));

    api.delete_account().await.unwrap();
    assert!(!api.session().is_signed_in());
    assert_eq!(expired.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_followers_decode_refs() {
    let router = Router::new().route(
        "/api/followers/:id/",
        get(|Path(id): Path<u64>| async move {
            if id == 7 {
                (
                    StatusCode::OK,
                    Json(json!([{"id": 2, "username": "bob"}, {"id": 3, "username": "carol"}])),
                )
            } else {
                (StatusCode::NOT_FOUND, Json(json!({"error": "User not found"})))
            }
        }),
    );
    let origin = serve(router).await;
    let (api, _) = api_client(&origin, Some("tok"));

    let followers = api.followers(UserId(7)).await.unwrap();
    let names: Vec<_> = followers.iter().map(|f| f.username.as_str()).collect();
    assert_eq!(names, vec!["bob", "carol"]);
    assert_eq!(followers[0].id, UserId(2));

    assert_eq!(
        api.followers(UserId(8)).await,
        Err(ReflectraError::NotFound("User not found".into()))
    );
}

#[tokio::test]
async fn test_profile_rename_updates_display_name() {
    let router = Router::new().route(
        "/api/update_user_info/",
        put(|Json(body): Json<serde_json::Value>| async move {
            assert_eq!(body["name"], "alice2");
            Json(json!({"message": "User info updated successfully"}))
        }),
    );
    let origin = serve(router).await;
    let (api, _) = api_client(&origin, Some("tok"));

    api.update_profile(&reflectra_shared::protocol::ProfileUpdate {
        name: "alice2".into(),
        email: "alice@example.com".into(),
        bio: String::new(),
        mood: None,
    })
    .await
    .unwrap();

    assert_eq!(api.session().display_name().as_deref(), Some("alice2"));
    assert_eq!(api.session().current_credential().as_deref(), Some("tok"));
}

/// Holds a session but cannot forget it.
struct StuckStore(MemoryStore);

impl CredentialStore for StuckStore {
    fn get(&self, key: &str) -> std::result::Result<Option<String>, StoreError> {
        self.0.get(key)
    }

    fn save(&self, session: &StoredSession) -> std::result::Result<(), StoreError> {
        self.0.save(session)
    }

    fn clear(&self) -> std::result::Result<(), StoreError> {
        Err(StoreError::NoDataDir)
    }
}

#[tokio::test]
async fn test_delete_account_succeeds_when_local_clear_fails() {
    let hits = Arc::new(AtomicUsize::new(0));
    let seen = hits.clone();
    let router = Router::new().route(
        "/api/delete_account/",
        delete(move || {
            let seen = seen.clone();
            async move {
                seen.fetch_add(1, Ordering::SeqCst);
                Json(json!({"message": "Account deleted"}))
            }
        }),
    );
    let origin = serve(router).await;
    let store = StuckStore(MemoryStore::signed_in(
        &StoredSession {
            access_token: "tok".into(),
            refresh_token: "refresh".into(),
            username: "alice".into(),
        },
    ));
    let session = Arc::new(Session::new(
        crate::session::SessionConfig::new(origin),
        Arc::new(store),
    ));
    let api = ApiClient::new(session, std::time::Duration::from_secs(5)).unwrap();

    assert_eq!(api.delete_account().await, Ok(()));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}
