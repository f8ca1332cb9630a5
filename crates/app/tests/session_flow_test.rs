//! End-to-end session flows over the gateway, auth service and stores.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use std::sync::Arc;
use std::time::Duration;

use bankline_application::{GatewayError, TokenStore};
use bankline_domain::{ApiRequest, RequestBody, UserRole};
use bankline_infrastructure::{FileTokenStore, MemoryTokenStore, SessionState};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use common::{PASSWORD, ScriptedBank, echoed_token, harness};

#[tokio::test]
async fn test_expired_token_is_refreshed_and_request_replayed() {
    let store = Arc::new(MemoryTokenStore::new());
    let h = harness(ScriptedBank::new(), store.clone());

    let role = h.auth.login("ana@bank.test", PASSWORD).await.unwrap();
    assert_eq!(role, Some(UserRole::User));
    assert_eq!(store.access_token().as_deref(), Some("access-1"));

    h.bank.expire_access_token();

    let response = h.gateway.send(ApiRequest::get("/accounts")).await.unwrap();

    assert_eq!(echoed_token(&response), "access-2");
    assert_eq!(h.bank.refresh_calls(), 1);
    assert_eq!(store.access_token().as_deref(), Some("access-2"));
    assert_eq!(store.refresh_token().as_deref(), Some("refresh-2"));
    assert_eq!(h.auth.current_role(), Some(UserRole::User));
    assert_eq!(h.signal.state(), SessionState::Active);

    let refresh = &h.bank.requests_to("/auth/refresh")[0];
    assert_eq!(refresh.bearer_token(), None);
    match &refresh.body {
        RequestBody::Json(body) => assert_eq!(body["refreshToken"], "refresh-1"),
        other => panic!("expected JSON body, got {other:?}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_burst_of_unauthorized_requests_refreshes_once() {
    let store = Arc::new(MemoryTokenStore::new());
    let h = harness(
        ScriptedBank::new().with_refresh_delay(Duration::from_millis(200)),
        store.clone(),
    );
    h.auth.login("ana@bank.test", PASSWORD).await.unwrap();
    h.bank.expire_access_token();

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let gateway = h.gateway.clone();
            tokio::spawn(async move { gateway.send(ApiRequest::get(format!("/cards/{i}"))).await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().expect("request should recover");
        assert_eq!(echoed_token(&response), "access-2");
    }

    assert_eq!(h.bank.refresh_calls(), 1);
    assert_eq!(store.access_token().as_deref(), Some("access-2"));
    assert!(!h.gateway.is_refreshing());
}

#[tokio::test]
async fn test_failed_refresh_ends_session_for_every_request() {
    let store = Arc::new(MemoryTokenStore::new());
    let h = harness(ScriptedBank::new().failing_refresh(), store.clone());
    h.auth.login("ana@bank.test", PASSWORD).await.unwrap();
    h.bank.expire_access_token();
    let mut session = h.signal.subscribe();

    let (a, b, c) = tokio::join!(
        h.gateway.send(ApiRequest::get("/accounts")),
        h.gateway.send(ApiRequest::get("/cards")),
        h.gateway.send(ApiRequest::get("/loans")),
    );

    for result in [a, b, c] {
        match result {
            Err(GatewayError::RefreshFailed { reason }) => {
                assert_eq!(reason, "Refresh token revoked");
            }
            other => panic!("expected refresh failure, got {other:?}"),
        }
    }
    assert_eq!(h.bank.refresh_calls(), 1);
    assert_eq!(store.credentials().unwrap(), None);
    assert!(!h.auth.is_authenticated());

    assert!(session.has_changed().unwrap());
    assert_eq!(
        *session.borrow_and_update(),
        SessionState::LoginRequired {
            location: "/login".to_string()
        }
    );
}

#[tokio::test]
async fn test_wrong_password_does_not_touch_store() {
    let store = Arc::new(MemoryTokenStore::new());
    let h = harness(ScriptedBank::new(), store.clone());

    let error = h
        .auth
        .login("ana@bank.test", "guess")
        .await
        .expect_err("bad password");

    assert_eq!(error.status(), Some(401));
    assert!(store.is_empty());
    assert_eq!(h.bank.refresh_calls(), 0);
    assert_eq!(h.signal.state(), SessionState::Active);
}

#[tokio::test]
async fn test_logout_revokes_refresh_token_and_signals_login() {
    let store = Arc::new(MemoryTokenStore::new());
    let h = harness(ScriptedBank::new(), store.clone());
    h.auth.login("ana@bank.test", PASSWORD).await.unwrap();

    h.auth.logout().await.unwrap();

    let logout = &h.bank.requests_to("/auth/logout")[0];
    assert_eq!(logout.bearer_token(), Some("access-1"));
    match &logout.body {
        RequestBody::Json(body) => assert_eq!(body["refreshToken"], "refresh-1"),
        other => panic!("expected JSON body, got {other:?}"),
    }
    assert!(store.is_empty());
    assert!(h.signal.login_required());
}

#[tokio::test]
async fn test_file_store_session_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(".bankline").join("session.json");

    {
        let store = Arc::new(FileTokenStore::open(&path).unwrap());
        let h = harness(ScriptedBank::new(), store);
        h.auth.login("ana@bank.test", PASSWORD).await.unwrap();
    }

    let reopened = Arc::new(FileTokenStore::open(&path).unwrap());
    assert_eq!(reopened.access_token().as_deref(), Some("access-1"));
    assert_eq!(reopened.user_role(), Some(UserRole::User));

    // A fresh process talks to a server that no longer accepts access-1.
    let h = harness(ScriptedBank::new().with_issued(1), reopened);
    let response = h.gateway.send(ApiRequest::get("/accounts")).await.unwrap();
    assert_eq!(echoed_token(&response), "access-2");
    assert_eq!(h.bank.refresh_calls(), 1);

    let on_disk = FileTokenStore::open(&path).unwrap();
    assert_eq!(on_disk.access_token().as_deref(), Some("access-2"));
    assert_eq!(on_disk.refresh_token().as_deref(), Some("refresh-2"));
}
