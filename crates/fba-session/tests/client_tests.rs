use fba_access::{Principal, Role, RoleDecision};
use fba_session::prelude::*;
use fba_session::{FeedbackFilter, RegisterRequest, Sentiment};
use fba_test_utils::{admin, pending_admin, token_json, user_json, StubResponse, StubServer};
use pretty_assertions::assert_eq;
use serde_json::json;

async fn backend() -> (StubServer, ApiClient) {
    let server = StubServer::start().await;
    let client = ApiClient::new(server.base_url()).unwrap();
    (server, client)
}

#[tokio::test]
async fn login_exchanges_form_then_fetches_profile() {
    let (server, client) = backend().await;
    let principal = admin();
    server
        .on("POST", "/auth/login", StubResponse::ok(&token_json("abc")))
        .on("GET", "/users/me", StubResponse::ok(&user_json(&principal)));

    let mut session = SessionContext::new();
    let signed_in = session
        .login(&client, "ada@example.com", "s3cret-pass")
        .await
        .unwrap()
        .clone();

    assert_eq!(signed_in, principal);
    assert_eq!(session.token().unwrap().as_str(), "abc");
    assert_eq!(session.refresh_token(), Some("refresh-abc"));

    let login = &server.requests_to("/auth/login")[0];
    assert_eq!(
        login.header("content-type"),
        Some("application/x-www-form-urlencoded")
    );
    assert!(login.body.contains("username=ada%40example.com"));
    assert!(login.body.contains("password=s3cret-pass"));

    let me = &server.requests_to("/users/me")[0];
    assert_eq!(me.header("authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn failed_login_leaves_session_empty() {
    let (server, client) = backend().await;
    server.on(
        "POST",
        "/auth/login",
        StubResponse::detail(401, "Incorrect email or password"),
    );

    let mut session = SessionContext::new();
    let err = session
        .login(&client, "nobody@example.com", "wrong")
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message(), "Incorrect email or password");
    assert!(!session.is_authenticated());
    assert!(server.requests_to("/users/me").is_empty());
}

async fn signed_in(server: &StubServer, client: &ApiClient, principal: &Principal) -> SessionContext {
    server
        .on("POST", "/auth/login", StubResponse::ok(&token_json("abc")))
        .on("GET", "/users/me", StubResponse::ok(&user_json(principal)));
    let mut session = SessionContext::new();
    session.login(client, "ada@example.com", "pw").await.unwrap();
    session
}

#[tokio::test]
async fn refresh_rotates_tokens_and_keeps_principal() {
    let (server, client) = backend().await;
    let principal = admin();
    let mut session = signed_in(&server, &client, &principal).await;
    server.on("POST", "/auth/refresh", StubResponse::ok(&token_json("def")));

    session.refresh(&client).await.unwrap();

    assert_eq!(session.token().unwrap().as_str(), "def");
    assert_eq!(session.refresh_token(), Some("refresh-def"));
    assert_eq!(session.principal(), Some(&principal));

    let refresh = &server.requests_to("/auth/refresh")[0];
    assert_eq!(refresh.query.as_deref(), Some("refresh_token=refresh-abc"));
    assert_eq!(refresh.header("authorization"), None);
}

#[tokio::test]
async fn rejected_refresh_ends_session() {
    let (server, client) = backend().await;
    let principal = admin();
    let mut session = signed_in(&server, &client, &principal).await;
    server.on(
        "POST",
        "/auth/refresh",
        StubResponse::detail(401, "Could not validate credentials"),
    );

    let err = session.refresh(&client).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!session.is_authenticated());
    assert!(session.token().is_none());
}

#[tokio::test]
async fn refresh_outage_keeps_session() {
    let (server, client) = backend().await;
    let principal = admin();
    let mut session = signed_in(&server, &client, &principal).await;
    server.on(
        "POST",
        "/auth/refresh",
        StubResponse::detail(500, "database unavailable"),
    );

    let err = session.refresh(&client).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(session.is_authenticated());
    assert_eq!(session.token().unwrap().as_str(), "abc");
}

#[tokio::test]
async fn refresh_when_signed_out_makes_no_call() {
    let (server, client) = backend().await;
    let mut session = SessionContext::new();

    let err = session.refresh(&client).await.unwrap_err();

    assert!(matches!(err, ApiError::Unauthenticated));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn failed_profile_fetch_does_not_start_session() {
    let (server, client) = backend().await;
    server
        .on("POST", "/auth/login", StubResponse::ok(&token_json("abc")))
        .on("GET", "/users/me", StubResponse::detail(404, "User not found"));

    let mut session = SessionContext::new();
    let err = session.login(&client, "a@example.com", "x").await.unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(session.token().is_none());
}

#[tokio::test]
async fn pending_admin_signs_in_as_viewer() {
    let (server, client) = backend().await;
    server
        .on("POST", "/auth/login", StubResponse::ok(&token_json("p")))
        .on("GET", "/users/me", StubResponse::ok(&user_json(&pending_admin())));

    let mut session = SessionContext::new();
    session.login(&client, "dana@example.com", "pw").await.unwrap();

    assert_eq!(session.effective_role(), Some(Role::Viewer));
}

#[tokio::test]
async fn register_sends_requested_role() {
    let (server, client) = backend().await;
    server.on(
        "POST",
        "/auth/register",
        StubResponse::json(201, &user_json(&pending_admin())),
    );

    let request = RegisterRequest::new("dana@example.com", "dana", "password123")
        .with_role(Role::Admin);
    let principal = client.register(&request).await.unwrap();

    assert!(principal.has_pending_request());
    let sent = server.requests_to("/auth/register")[0].json_body();
    assert_eq!(sent["role"], "admin");
    assert_eq!(sent["email"], "dana@example.com");
}

#[tokio::test]
async fn admin_calls_carry_bearer_and_parse() {
    let (server, client) = backend().await;
    let pending = pending_admin();
    server
        .on(
            "GET",
            "/admin/pending-requests",
            StubResponse::ok(&json!([user_json(&pending)])),
        )
        .on(
            "POST",
            "/admin/approve-role",
            StubResponse::ok(&json!({
                "success": true,
                "message": "User dana has been granted admin role",
                "user": {"id": pending.id, "username": "dana", "role": "admin", "role_approved": true}
            })),
        )
        .on(
            "PATCH",
            &format!("/admin/users/{}/status", pending.id),
            StubResponse::ok(&json!({
                "success": true,
                "message": "User dana has been deactivated",
                "user": {"id": pending.id, "username": "dana", "is_active": false}
            })),
        );
    let client = client.with_token(AccessToken::new("admin-token"));

    let requests = client.pending_role_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].principal.requested_role, Some(Role::Admin));
    assert!(requests[0].created_at().is_some());

    let outcome = client
        .approve_role(pending.id, RoleDecision::Approve)
        .await
        .unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.user.role, Role::Admin);
    let sent = server.requests_to("/admin/approve-role")[0].json_body();
    assert_eq!(sent["approved"], true);
    assert_eq!(sent["user_id"], pending.id.to_string());

    let status = client.set_user_status(pending.id, false).await.unwrap();
    assert!(!status.user.is_active);
    let patch = &server.requests_to(&format!("/admin/users/{}/status", pending.id))[0];
    assert_eq!(patch.query.as_deref(), Some("is_active=false"));
    assert_eq!(patch.header("authorization"), Some("Bearer admin-token"));
}

#[tokio::test]
async fn forbidden_listing_surfaces_detail() {
    let (server, client) = backend().await;
    server.on(
        "GET",
        "/admin/users",
        StubResponse::detail(403, "Only admins can view all users"),
    );

    let err = client
        .with_token(AccessToken::new("viewer-token"))
        .list_users()
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Backend { status: 403, .. }));
    assert_eq!(err.user_message(), "Only admins can view all users");
}

#[tokio::test]
async fn feedback_filter_becomes_query() {
    let (server, client) = backend().await;
    server.on("GET", "/feedback/", StubResponse::ok(&json!([])));

    let items = client
        .with_token(AccessToken::new("t"))
        .list_feedback(&FeedbackFilter::new().with_sentiment(Sentiment::Negative))
        .await
        .unwrap();

    assert!(items.is_empty());
    assert_eq!(
        server.requests_to("/feedback/")[0].query.as_deref(),
        Some("skip=0&limit=50&sentiment=negative")
    );
}

#[tokio::test]
async fn dashboard_and_clustering_decode() {
    let (server, client) = backend().await;
    server
        .on(
            "GET",
            "/analytics/dashboard",
            StubResponse::ok(&json!({
                "total_feedback": 12,
                "avg_sentiment": 0.25,
                "sentiment_distribution": {"positive": 6, "negative": 4, "neutral": 2},
                "urgency_distribution": {"high": 3},
                "top_topics": [{"topic": "billing", "count": 5, "percentage": 41.7, "avg_sentiment": -0.2}],
                "sentiment_trend": [{"date": "2024-01-15", "positive": 2, "negative": 1, "neutral": 0, "avg_score": 0.3}],
                "feature_requests": 2,
                "bug_reports": 1
            })),
        )
        .on(
            "GET",
            "/clustering/info",
            StubResponse::ok(&json!({
                "total_feedback": 12,
                "clustered_feedback": 9,
                "clusters": {"cluster_0": 5, "cluster_1": 4}
            })),
        );
    let client = client.with_token(AccessToken::new("t"));

    let stats = client.dashboard_stats(7).await.unwrap();
    assert_eq!(stats.total_feedback, 12);
    assert_eq!(stats.top_topics[0].topic, "billing");
    assert_eq!(stats.sentiment_distribution["positive"], 6);
    assert_eq!(
        server.requests_to("/analytics/dashboard")[0].query.as_deref(),
        Some("days=7")
    );

    let info = client.clustering_info().await.unwrap();
    assert_eq!(info.clusters.len(), 2);
    assert_eq!(info.clustered_feedback, 9);
}

#[tokio::test]
async fn malformed_success_body_is_decode_error() {
    let (server, client) = backend().await;
    server.on("GET", "/clustering/info", StubResponse::raw(200, "not json"));

    let err = client
        .with_token(AccessToken::new("t"))
        .clustering_info()
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}
