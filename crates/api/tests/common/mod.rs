//! Shared harness for HTTP-level integration tests.
//!
//! Requests go through the production router (same middleware stack) via
//! `tower::ServiceExt::oneshot`, without a TCP listener.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use coursework_api::auth::jwt::{generate_access_token, JwtConfig};
use coursework_api::cache::MemoryCache;
use coursework_api::config::{GitConfig, ServerConfig};
use coursework_api::router::build_app_router;
use coursework_api::state::AppState;
use coursework_core::git::{CommandOutput, CommandRunner, GitClient, GitError};
use coursework_core::types::DbId;
use coursework_db::models::course_member::CreateCourseMember;
use coursework_db::models::user::CreateUser;
use coursework_db::repositories::{CourseMemberRepo, UserRepo};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

pub const TEST_JWT_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";

pub fn jwt_config() -> JwtConfig {
    JwtConfig {
        secret: TEST_JWT_SECRET.to_string(),
        access_token_expiry_mins: 15,
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(repos_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: jwt_config(),
        git: GitConfig {
            repos_root,
            user: None,
            token: Some("test-token".to_string()),
            default_branch: "main".to_string(),
        },
        cache_ttl: Duration::from_secs(60),
    }
}

/// Records git invocations instead of running them.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<Vec<String>>>>,
    envs: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl RecordingRunner {
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Extra environment passed with each call, in call order.
    pub fn envs(&self) -> Vec<Vec<(String, String)>> {
        self.envs.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(
        &self,
        args: &[String],
        _cwd: Option<&Path>,
        env: &[(String, String)],
    ) -> Result<CommandOutput, GitError> {
        self.calls.lock().unwrap().push(args.to_vec());
        self.envs.lock().unwrap().push(env.to_vec());
        Ok(CommandOutput::default())
    }
}

/// Router over `pool` with a recording git runner rooted at `repos_root`.
pub fn build_test_app_with(pool: PgPool, runner: RecordingRunner, repos_root: PathBuf) -> Router {
    let config = test_config(repos_root);
    let runner: Arc<dyn CommandRunner> = Arc::new(runner);
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        cache: Arc::new(MemoryCache::new()),
        registry: Arc::new(coursework_db::models::entity_registry()),
        git: Arc::new(GitClient::new(runner)),
    };
    build_app_router(state, &config)
}

pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(
        pool,
        RecordingRunner::default(),
        std::env::temp_dir().join("coursework-test-repos"),
    )
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert a user and return `(id, bearer token)`.
pub async fn user_with_token(pool: &PgPool, username: &str, role: &str) -> (DbId, String) {
    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: None,
            given_name: None,
            family_name: None,
            role: Some(role.to_string()),
        },
    )
    .await
    .unwrap();
    (user.id, token_for(user.id, role))
}

pub fn token_for(user_id: DbId, role: &str) -> String {
    generate_access_token(user_id, role, &jwt_config()).unwrap()
}

/// Insert a membership directly and return its id.
pub async fn add_member(pool: &PgPool, course_id: DbId, user_id: DbId, role: &str) -> DbId {
    CourseMemberRepo::create(
        pool,
        course_id,
        &CreateCourseMember {
            user_id,
            role: role.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
}

pub async fn get(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, authed("GET", uri, token).body(Body::empty()).unwrap()).await
}

pub async fn delete(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, authed("DELETE", uri, token).body(Body::empty()).unwrap()).await
}

async fn with_json(
    app: Router,
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = authed(method, uri, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn post_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    with_json(app, "POST", uri, token, body).await
}

pub async fn put_json(
    app: Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response<Body> {
    with_json(app, "PUT", uri, token, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn total_count(response: &Response<Body>) -> i64 {
    response
        .headers()
        .get("x-total-count")
        .expect("x-total-count header")
        .to_str()
        .unwrap()
        .parse()
        .unwrap()
}

/// POST and return the `data` of a 201 response.
pub async fn create(app: Router, uri: &str, token: &str, body: serde_json::Value) -> serde_json::Value {
    let response = post_json(app, uri, token, body).await;
    let status = response.status();
    let json = body_json(response).await;
    assert_eq!(status, 201, "POST {uri} failed: {json}");
    json["data"].clone()
}

/// Create an organization and a course through the API as `admin_token`.
pub async fn course(app: Router, admin_token: &str, path: &str) -> serde_json::Value {
    let org = create(
        app.clone(),
        "/api/v1/organizations",
        admin_token,
        serde_json::json!({ "path": format!("org-{path}"), "title": "Org" }),
    )
    .await;
    create(
        app,
        "/api/v1/courses",
        admin_token,
        serde_json::json!({
            "organization_id": org["id"],
            "path": path,
            "title": "Course",
            "repository_url": "git@git.example.com:org/course.git",
        }),
    )
    .await
}
