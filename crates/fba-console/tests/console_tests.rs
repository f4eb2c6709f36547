use async_trait::async_trait;
use fba_access::{DenialReason, NavigationDecision, Principal, RoleDecision};
use fba_console::prelude::*;
use fba_console::Notifications;
use fba_integrations::{
    FileStorage, IntegrationConfig, IntegrationStatus, KeyValueStorage, MemoryStorage,
};
use fba_session::{
    AccessToken, ApiError, ApiResult, AuthGateway, LoginResponse, RegisterRequest, TokenResponse,
    UserRecord,
};
use fba_test_utils::{admin, analyst, pending_admin, token_json, user_json, viewer, StubResponse, StubServer};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use uuid::Uuid;

struct FakeGateway {
    principal: Option<Principal>,
}

impl FakeGateway {
    fn signing_in(principal: Principal) -> Self {
        Self {
            principal: Some(principal),
        }
    }

    fn rejecting() -> Self {
        Self { principal: None }
    }
}

#[async_trait]
impl AuthGateway for FakeGateway {
    async fn login(&self, _identifier: &str, _secret: &str) -> ApiResult<LoginResponse> {
        match &self.principal {
            Some(principal) => Ok(LoginResponse {
                token: AccessToken::new("fake-token"),
                refresh_token: Some("fake-refresh".to_string()),
                principal: principal.clone(),
            }),
            None => Err(ApiError::from_response(
                401,
                r#"{"detail":"Incorrect email or password"}"#,
            )),
        }
    }

    async fn refresh(&self, _refresh_token: &str) -> ApiResult<TokenResponse> {
        Err(ApiError::from_response(
            401,
            r#"{"detail":"Could not validate credentials"}"#,
        ))
    }

    async fn register(&self, _request: &RegisterRequest) -> ApiResult<Principal> {
        Err(ApiError::Unauthenticated)
    }
}

#[derive(Default)]
struct FakeAdmin {
    fail_pending: bool,
    fail_resolve: bool,
    calls: AtomicUsize,
}

fn record(principal: Principal) -> UserRecord {
    UserRecord {
        principal,
        created_at: None,
    }
}

#[async_trait]
impl AdminDataSource for FakeAdmin {
    async fn users(&self) -> ApiResult<Vec<UserRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![record(admin()), record(viewer())])
    }

    async fn pending_requests(&self) -> ApiResult<Vec<UserRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_pending {
            Err(ApiError::from_response(500, r#"{"detail":"database unavailable"}"#))
        } else {
            Ok(vec![record(pending_admin())])
        }
    }

    async fn resolve_request(&self, _user_id: Uuid, decision: RoleDecision) -> ApiResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_resolve {
            return Err(ApiError::from_response(404, r#"{"detail":"User not found"}"#));
        }
        Ok(match decision {
            RoleDecision::Approve => "User dana has been granted admin role".to_string(),
            RoleDecision::Reject => "User dana's admin request has been rejected".to_string(),
        })
    }

    async fn set_active(&self, _user_id: Uuid, is_active: bool) -> ApiResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("User dana has been {}", if is_active { "activated" } else { "deactivated" }))
    }
}

fn console() -> Console<MemoryStorage> {
    Console::new(ConsoleConfig::default(), MemoryStorage::new()).unwrap()
}

async fn signed_in(principal: Principal) -> Console<MemoryStorage> {
    let mut console = console();
    console
        .login(&FakeGateway::signing_in(principal), "user@example.com", "pw")
        .await
        .unwrap();
    console.drain_notifications();
    console
}

fn menu_routes<S: KeyValueStorage>(console: &Console<S>) -> Vec<String> {
    console.menu().into_iter().map(|e| e.route.clone()).collect()
}

#[tokio::test]
async fn login_lands_on_default_route() {
    let mut console = console();
    let decision = console
        .login(&FakeGateway::signing_in(analyst()), "ana@example.com", "pw")
        .await
        .unwrap();

    assert!(decision.is_allowed());
    assert_eq!(console.current_route(), "/dashboard");
    assert!(menu_routes(&console).contains(&"/integrations".to_string()));
    assert!(!menu_routes(&console).contains(&"/admin".to_string()));
}

#[tokio::test]
async fn rejected_refresh_signs_out() {
    let mut console = console();
    let gateway = FakeGateway::signing_in(analyst());
    console.login(&gateway, "ana@example.com", "pw").await.unwrap();
    console.drain_notifications();

    let err = console.refresh_session(&gateway).await.unwrap_err();

    assert!(matches!(err, ConsoleError::Api(_)));
    assert!(!console.session().is_authenticated());
    assert_eq!(console.current_route(), "/login");
    assert!(console.menu().is_empty());
    assert_eq!(
        console.drain_notifications(),
        vec![Notification::error("Could not validate credentials")]
    );
}

#[tokio::test]
async fn failed_login_notifies_and_stays_on_login() {
    let mut console = console();
    let err = console
        .login(&FakeGateway::rejecting(), "nobody@example.com", "bad")
        .await
        .unwrap_err();

    assert!(matches!(err, ConsoleError::Api(_)));
    assert_eq!(console.current_route(), "/login");
    assert!(!console.session().is_authenticated());
    let notes = console.drain_notifications();
    assert_eq!(notes, vec![Notification::error("Incorrect email or password")]);
}

#[tokio::test]
async fn denied_navigation_redirects_silently() {
    let mut console = signed_in(viewer()).await;

    let decision = console.navigate("/integrations");
    assert_eq!(
        decision,
        NavigationDecision::Redirect {
            to: "/dashboard".to_string(),
            reason: DenialReason::AuthorizationDenied,
        }
    );
    assert_eq!(console.current_route(), "/dashboard");
    assert!(console.notifications().is_empty());
}

#[tokio::test]
async fn pending_admin_gets_viewer_menu() {
    let mut console = signed_in(pending_admin()).await;

    assert_eq!(menu_routes(&console), vec!["/dashboard", "/feedback", "/settings"]);
    assert_eq!(console.navigate("/admin").target(), "/dashboard");
}

#[tokio::test]
async fn logout_returns_to_login() {
    let mut console = signed_in(admin()).await;
    console.navigate("/admin");
    assert_eq!(console.current_route(), "/admin");

    console.logout();
    assert_eq!(console.current_route(), "/login");
    assert!(console.menu().is_empty());
    assert_eq!(console.navigate("/dashboard").target(), "/login");
}

#[tokio::test]
async fn viewer_cannot_change_integrations() {
    let mut console = signed_in(viewer()).await;

    let err = console.toggle_integration("slack").unwrap_err();
    assert!(matches!(err, ConsoleError::Forbidden(_)));
    assert!(!console.integrations().get("slack").unwrap().enabled);

    let err = console
        .configure_integration("slack", IntegrationConfig::new())
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Forbidden(_)));
    assert_eq!(
        console.integrations().get("slack").unwrap().status,
        IntegrationStatus::Disconnected
    );
}

#[tokio::test]
async fn analyst_toggle_persists_and_notifies() {
    let storage = MemoryStorage::new();
    let mut console = Console::new(ConsoleConfig::default(), storage.clone()).unwrap();
    console
        .login(&FakeGateway::signing_in(analyst()), "ana@example.com", "pw")
        .await
        .unwrap();

    let state = console.toggle_integration("slack").unwrap();
    assert!(state.enabled);
    assert_eq!(
        console.notifications().latest(),
        Some(&Notification::success("Slack enabled"))
    );

    let reopened = Console::new(ConsoleConfig::default(), storage).unwrap();
    assert!(reopened.integrations().get("slack").unwrap().enabled);
}

#[tokio::test]
async fn configure_connects_integration() {
    let mut console = signed_in(analyst()).await;
    let values: IntegrationConfig = [(
        "webhookUrl".to_string(),
        "https://hooks.slack.com/services/T000/B000/XXX".to_string(),
    )]
    .into_iter()
    .collect();

    let state = console.configure_integration("slack", values.clone()).unwrap();
    assert_eq!(state.status, IntegrationStatus::Connected);
    assert!(state.enabled);
    assert_eq!(state.config, values);
    assert_eq!(
        console.notifications().latest(),
        Some(&Notification::success("Slack configured successfully!"))
    );
}

#[tokio::test]
async fn unknown_integration_is_reported() {
    let mut console = signed_in(admin()).await;

    let err = console.toggle_integration("nonexistent-id").unwrap_err();
    assert!(matches!(err, ConsoleError::Integration(_)));
    assert_eq!(
        console.notifications().latest(),
        Some(&Notification::error("Unknown integration 'nonexistent-id'"))
    );
}

#[tokio::test(start_paused = true)]
async fn connection_test_waits_configured_delay() {
    let config = ConsoleConfig::default().with_connection_test_delay(Duration::from_millis(1500));
    let mut console = Console::new(config, MemoryStorage::new()).unwrap();
    console
        .login(&FakeGateway::signing_in(analyst()), "ana@example.com", "pw")
        .await
        .unwrap();

    let before = console.integrations().get("slack").unwrap().status;
    let started = tokio::time::Instant::now();
    let result = console.test_integration("slack").await.unwrap();

    assert!(result.success);
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert_eq!(
        console.notifications().latest().unwrap().level,
        NotificationLevel::Success
    );
    assert_eq!(console.integrations().get("slack").unwrap().status, before);
}

#[tokio::test]
async fn admin_view_loads_both_lists() {
    let mut console = signed_in(admin()).await;
    let source = FakeAdmin::default();
    let mut view = AdminView::new();

    console.load_admin_view(&source, &mut view).await.unwrap();

    assert_eq!(view.users.data().map(Vec::len), Some(2));
    assert_eq!(view.pending.data().map(Vec::len), Some(1));
    assert!(!view.is_loading());
    assert!(console.notifications().is_empty());
}

#[tokio::test]
async fn admin_view_failure_keeps_other_list() {
    let mut console = signed_in(admin()).await;
    let source = FakeAdmin {
        fail_pending: true,
        ..FakeAdmin::default()
    };
    let mut view = AdminView::new();

    console.load_admin_view(&source, &mut view).await.unwrap();

    assert_eq!(view.users.data().map(Vec::len), Some(2));
    assert!(view.pending.data().is_none());
    assert_eq!(view.pending.error(), Some("database unavailable"));
    assert!(!view.is_loading());
    assert_eq!(
        console.drain_notifications(),
        vec![Notification::error("database unavailable")]
    );
}

#[tokio::test]
async fn non_admin_never_reaches_admin_backend() {
    let mut console = signed_in(analyst()).await;
    let source = FakeAdmin::default();
    let mut view = AdminView::new();

    let err = console.load_admin_view(&source, &mut view).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Forbidden(_)));

    let err = console
        .resolve_role_request(&source, Uuid::new_v4(), RoleDecision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Forbidden(_)));
    assert_eq!(source.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn role_decisions_notify_backend_message() {
    let mut console = signed_in(admin()).await;
    let source = FakeAdmin::default();
    let user_id = pending_admin().id;

    console
        .resolve_role_request(&source, user_id, RoleDecision::Approve)
        .await
        .unwrap();
    console.set_user_active(&source, user_id, false).await.unwrap();

    let messages: Vec<_> = console
        .drain_notifications()
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(
        messages,
        vec![
            "User dana has been granted admin role",
            "User dana has been deactivated"
        ]
    );

    let failing = FakeAdmin {
        fail_resolve: true,
        ..FakeAdmin::default()
    };
    let err = console
        .resolve_role_request(&failing, user_id, RoleDecision::Reject)
        .await
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Api(_)));
    assert_eq!(
        console.notifications().latest(),
        Some(&Notification::error("User not found"))
    );
}

#[tokio::test]
async fn backend_round_trip_through_api_client() {
    let server = StubServer::start().await;
    let principal = admin();
    server
        .on("POST", "/auth/login", StubResponse::ok(&token_json("adm")))
        .on("GET", "/users/me", StubResponse::ok(&user_json(&principal)))
        .on(
            "GET",
            "/admin/users",
            StubResponse::ok(&json!([user_json(&principal), user_json(&viewer())])),
        )
        .on(
            "GET",
            "/admin/pending-requests",
            StubResponse::detail(403, "Only admins can view pending requests"),
        );

    let config = ConsoleConfig::default().with_api_base_url(server.base_url());
    let mut console = Console::new(config, MemoryStorage::new()).unwrap();
    let gateway = console.api_client().unwrap();
    console
        .login(&gateway, "ada@example.com", "pw")
        .await
        .unwrap();

    let client = console.api_client().unwrap();
    assert!(client.has_token());
    let mut view = AdminView::new();
    console.load_admin_view(&client, &mut view).await.unwrap();

    assert_eq!(view.users.data().map(Vec::len), Some(2));
    assert_eq!(view.pending.error(), Some("Only admins can view pending requests"));
    let listing = &server.requests_to("/admin/users")[0];
    assert_eq!(listing.header("authorization"), Some("Bearer adm"));
}

#[tokio::test]
async fn refreshed_token_is_used_for_later_calls() {
    let server = StubServer::start().await;
    let principal = admin();
    server
        .on("POST", "/auth/login", StubResponse::ok(&token_json("adm")))
        .on("POST", "/auth/refresh", StubResponse::ok(&token_json("adm2")))
        .on("GET", "/users/me", StubResponse::ok(&user_json(&principal)))
        .on("GET", "/admin/users", StubResponse::ok(&json!([])))
        .on("GET", "/admin/pending-requests", StubResponse::ok(&json!([])));

    let config = ConsoleConfig::default().with_api_base_url(server.base_url());
    let mut console = Console::new(config, MemoryStorage::new()).unwrap();
    let gateway = console.api_client().unwrap();
    console.login(&gateway, "ada@example.com", "pw").await.unwrap();
    console.refresh_session(&gateway).await.unwrap();

    assert_eq!(console.session().principal(), Some(&principal));
    let client = console.api_client().unwrap();
    let mut view = AdminView::new();
    console.load_admin_view(&client, &mut view).await.unwrap();

    let listing = &server.requests_to("/admin/users")[0];
    assert_eq!(listing.header("authorization"), Some("Bearer adm2"));
}

#[tokio::test]
async fn file_config_and_storage_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("fba.toml");
    std::fs::write(
        &config_path,
        format!(
            "storage_dir = {:?}\nstorage_key = \"team_integrations\"\nrefresh_interval_secs = 15\n",
            dir.path().join("state")
        ),
    )
    .unwrap();

    let config = ConsoleConfig::from_file(&config_path).unwrap();
    assert_eq!(config.refresh_interval(), Duration::from_secs(15));

    let mut console = Console::new(config.clone(), FileStorage::new(&config.storage_dir)).unwrap();
    console
        .login(&FakeGateway::signing_in(analyst()), "ana@example.com", "pw")
        .await
        .unwrap();
    console.toggle_integration("teams").unwrap();
    assert!(dir.path().join("state").join("team_integrations.json").exists());

    let reopened = Console::new(config.clone(), FileStorage::new(&config.storage_dir)).unwrap();
    assert!(reopened.integrations().get("teams").unwrap().enabled);
}

#[tokio::test(start_paused = true)]
async fn auto_refresh_reloads_view() {
    use std::sync::Arc;
    use tokio::sync::Mutex;

    let view = Arc::new(Mutex::new(ViewState::<usize>::new()));
    let source = Arc::new(FakeAdmin::default());
    let (task_view, task_source) = (Arc::clone(&view), Arc::clone(&source));

    let refresh = AutoRefresh::spawn(Duration::from_secs(30), move || {
        let (view, source) = (Arc::clone(&task_view), Arc::clone(&task_source));
        async move {
            let mut notes = Notifications::default();
            let fetch = async { source.users().await.map(|u| u.len()) };
            view.lock().await.load(fetch, &mut notes).await;
        }
    });

    tokio::time::sleep(Duration::from_secs(61)).await;
    assert_eq!(view.lock().await.data(), Some(&2));
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);

    drop(refresh);
    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}
