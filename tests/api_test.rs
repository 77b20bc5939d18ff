//! HTTP-level tests over in-memory stores.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::json;

use common::TestApp;

// =============================================================================
// Root & Health
// =============================================================================

#[tokio::test]
async fn test_root_returns_welcome() {
    let app = TestApp::new();
    let (status, body) = app.json("GET", "/", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().starts_with("Welcome to"));
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_is_static() {
    let app = TestApp::new();
    let (status, body) = app.json("GET", "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

// =============================================================================
// Registration & Login
// =============================================================================

#[tokio::test]
async fn test_register_login_and_me() {
    let app = TestApp::new();

    let (status, body) = app.register("a@x.com", "alice", "pw12345678").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["is_active"], true);
    assert_eq!(body["is_superuser"], false);
    assert_eq!(body["role"], "user");
    assert!(body.get("password_hash").is_none());

    let (status, body) = app.login("a@x.com", "pw12345678").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 30 * 60);
    let token = body["access_token"].as_str().unwrap();

    let (status, body) = app.json("GET", "/api/v1/auth/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["username"], "alice");
}

#[tokio::test]
async fn test_me_without_token_challenges_bearer() {
    let app = TestApp::new();
    let request = Request::get("/api/v1/auth/me").body(Body::empty()).unwrap();

    let (status, headers, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(headers.get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
}

#[tokio::test]
async fn test_me_with_garbage_token() {
    let app = TestApp::new();
    let (status, body) = app
        .json("GET", "/api/v1/auth/me", Some("not.a.token"), None)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::new();
    app.register("a@x.com", "alice", "pw12345678").await;

    let (status, body) = app.register("a@x.com", "other", "pw12345678").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "User already exists");

    let (status, body) = app.register("b@x.com", "alice", "pw12345678").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Username already exists");
}

#[tokio::test]
async fn test_register_validation() {
    let app = TestApp::new();

    let (status, _) = app.register("not-an-email", "alice", "pw12345678").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.register("a@x.com", "al", "pw12345678").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app.register("a@x.com", "alice", "short").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("a@x.com", "alice", "pw12345678").await;

    let (wrong_status, wrong_body) = app.login("a@x.com", "wrong-password").await;
    let (unknown_status, unknown_body) = app.login("nobody@x.com", "pw12345678").await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_status, unknown_status);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["error"]["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_inactive_account_cannot_login() {
    let app = TestApp::new();
    app.register("a@x.com", "alice", "pw12345678").await;
    app.deactivate("a@x.com").await;

    let (status, body) = app.login("a@x.com", "pw12345678").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "User account is inactive");
}

#[tokio::test]
async fn test_deactivated_token_holder_is_rejected() {
    let app = TestApp::new();
    let token = app.signup("a@x.com", "alice").await;
    app.deactivate("a@x.com").await;

    let (status, body) = app.json("GET", "/api/v1/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Inactive user");
}

#[tokio::test]
async fn test_update_profile() {
    let app = TestApp::new();
    let token = app.signup("a@x.com", "alice").await;
    app.signup("b@x.com", "bob").await;

    let (status, body) = app
        .json(
            "PATCH",
            "/api/v1/auth/me",
            Some(&token),
            Some(json!({ "username": "bob" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Username already exists");

    let (status, body) = app
        .json(
            "PATCH",
            "/api/v1/auth/me",
            Some(&token),
            Some(json!({ "username": "alice_b" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice_b");
    assert_eq!(body["email"], "a@x.com");
}

// =============================================================================
// Account Administration
// =============================================================================

#[tokio::test]
async fn test_account_admin_requires_superuser() {
    let app = TestApp::new();
    let token = app.signup("a@x.com", "alice").await;

    let (status, body) = app.json("GET", "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_PERMISSIONS");
}

#[tokio::test]
async fn test_superuser_lists_and_updates_accounts() {
    let app = TestApp::new();
    let admin = app.signup("root@x.com", "root").await;
    app.promote("root@x.com").await;
    app.signup("a@x.com", "alice").await;

    let (status, body) = app
        .json("GET", "/api/v1/users?page=1&page_size=1", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let alice = app.login("a@x.com", "pw12345678").await;
    assert_eq!(alice.0, StatusCode::OK);
    let (_, me) = app
        .json(
            "GET",
            "/api/v1/auth/me",
            alice.1["access_token"].as_str(),
            None,
        )
        .await;
    let alice_id = me["id"].as_str().unwrap();

    let (status, body) = app
        .json(
            "PATCH",
            &format!("/api/v1/users/{}", alice_id),
            Some(&admin),
            Some(json!({ "role": "moderator", "is_active": false })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "moderator");
    assert_eq!(body["is_active"], false);

    let (status, _) = app.login("a@x.com", "pw12345678").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_unknown_account() {
    let app = TestApp::new();
    let admin = app.signup("root@x.com", "root").await;
    app.promote("root@x.com").await;

    let (status, body) = app
        .json(
            "GET",
            "/api/v1/users/00000000-0000-0000-0000-000000000000",
            Some(&admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "User not found");
}

// =============================================================================
// Posts
// =============================================================================

#[tokio::test]
async fn test_post_lifecycle_and_ownership() {
    let app = TestApp::new();
    let alice = app.signup("a@x.com", "alice").await;
    let bob = app.signup("b@x.com", "bob").await;

    let (status, post) = app
        .json(
            "POST",
            "/api/v1/posts",
            Some(&alice),
            Some(json!({ "title": "Hello", "content": "World" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["status"], "draft");
    assert_eq!(post["is_published"], false);
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().unwrap());

    let (status, body) = app
        .json("PUT", &uri, Some(&bob), Some(json!({ "title": "Mine now" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["error"]["message"],
        "You don't have permission to access this post"
    );

    let (status, body) = app
        .json("PUT", &uri, Some(&alice), Some(json!({ "status": "published" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_published"], true);
    assert_eq!(body["title"], "Hello");

    let (status, _) = app.json("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.json("DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.json("GET", &uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_superuser_edits_any_post() {
    let app = TestApp::new();
    let alice = app.signup("a@x.com", "alice").await;
    let admin = app.signup("root@x.com", "root").await;
    app.promote("root@x.com").await;

    let (_, post) = app
        .json(
            "POST",
            "/api/v1/posts",
            Some(&alice),
            Some(json!({ "title": "Hello", "content": "World" })),
        )
        .await;
    let uri = format!("/api/v1/posts/{}", post["id"].as_str().unwrap());

    let (status, body) = app
        .json("PUT", &uri, Some(&admin), Some(json!({ "status": "archived" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "archived");
}

#[tokio::test]
async fn test_public_listing_shows_published_only() {
    let app = TestApp::new();
    let alice = app.signup("a@x.com", "alice").await;

    for (title, status) in [("one", "published"), ("two", "draft"), ("three", "published")] {
        let (code, _) = app
            .json(
                "POST",
                "/api/v1/posts",
                Some(&alice),
                Some(json!({ "title": title, "content": "body", "status": status })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED);
    }

    let (status, body) = app.json("GET", "/api/v1/posts", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["page_size"], 10);

    let (status, body) = app.json("GET", "/api/v1/posts/me", Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 3);
}

#[tokio::test]
async fn test_post_listing_rejects_bad_pagination() {
    let app = TestApp::new();

    let (status, _) = app.json("GET", "/api/v1/posts?page=0", None, None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .json("GET", "/api/v1/posts?page_size=101", None, None)
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_post_listing_rejects_overflowing_page() {
    let app = TestApp::new();

    let (status, body) = app
        .json(
            "GET",
            "/api/v1/posts?page=18446744073709551615&page_size=100",
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_create_post_requires_token() {
    let app = TestApp::new();
    let (status, _) = app
        .json(
            "POST",
            "/api/v1/posts",
            None,
            Some(json!({ "title": "Hello", "content": "World" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Uploads
// =============================================================================

const BOUNDARY: &str = "XBLOGBOUNDARY";

fn multipart_request(token: &str, filename: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::post("/api/v1/uploads")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_download_delete() {
    let app = TestApp::new();
    let alice = app.signup("a@x.com", "alice").await;
    let bob = app.signup("b@x.com", "bob").await;

    let (status, _, body) = app
        .send(multipart_request(&alice, "my photo.png", "image/png", b"\x89PNG data"))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uploaded: serde_json::Value = serde_json::from_slice(&body).unwrap();
    let key = uploaded["file_key"].as_str().unwrap().to_string();
    assert!(key.starts_with("uploads/"));
    assert!(key.ends_with("_my_photo.png"));
    assert!(uploaded["file_url"].as_str().unwrap().ends_with(&key));

    let uri = format!("/api/v1/uploads/{}", key);
    let request = Request::get(&uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", bob))
        .body(Body::empty())
        .unwrap();
    let (status, headers, bytes) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert_eq!(bytes, b"\x89PNG data");

    let (status, _) = app.json("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.json("DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.json("GET", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "File not found");
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type() {
    let app = TestApp::new();
    let alice = app.signup("a@x.com", "alice").await;

    let (status, _, body) = app
        .send(multipart_request(&alice, "script.sh", "text/x-shellscript", b"echo hi"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_upload_requires_token() {
    let app = TestApp::new();
    let request = Request::post("/api/v1/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::empty())
        .unwrap();

    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
