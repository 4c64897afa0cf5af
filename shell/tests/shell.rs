extern crate instafeed_frontend;
extern crate instafeed_shell;
extern crate tokio;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clap::Parser;
use reqwest::Url;
use serde_json::{json, Value};

use instafeed_frontend::error::ClientError;
use instafeed_frontend::model::Identity;
use instafeed_frontend::session::{MemoryStorage, SessionContext, Storage};
use instafeed_frontend::transport::{ApiRequest, ApiResponse, Transport};
use instafeed_frontend::ApiClient;
use instafeed_shell::cli::{Cli, Command};
use instafeed_shell::{Shell, ShellError, LOGOUT_STORAGE_NOTICE};

const BASE: &str = "http://127.0.0.1:8000";

/// Same answer for a (method, url) every time; unknown routes fail.
#[derive(Default)]
struct FixedTransport {
    answers: HashMap<(String, String), (u16, Value)>,
    seen: Mutex<Vec<String>>,
}

impl FixedTransport {
    fn with(mut self, method: &str, path: &str, status: u16, body: Value) -> Self {
        self.answers
            .insert((method.into(), format!("{BASE}{path}")), (status, body));
        self
    }
}

#[async_trait]
impl Transport for FixedTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ClientError> {
        let key = (request.method.to_string(), request.url.to_string());
        self.seen.lock().unwrap().push(format!("{} {}", key.0, key.1));

        match self.answers.get(&key) {
            Some((status, body)) => Ok(ApiResponse {
                status: *status,
                body: serde_json::to_vec(body).unwrap(),
            }),
            None => Err(ClientError::Transport("Network Error".into())),
        }
    }
}

fn feed() -> Value {
    json!([{
        "id": 42,
        "user": {"id": 2, "username": "maria"},
        "content": "sunset at the pier",
        "likes_count": 10,
        "is_liked": false,
        "created_at": "2024-03-05T14:07:00Z"
    }])
}

fn shell(transport: FixedTransport) -> (Shell, Arc<FixedTransport>) {
    let transport = Arc::new(transport);
    let api = ApiClient::new(transport.clone(), Url::parse(BASE).unwrap());
    let session = SessionContext::from_storage(Arc::new(MemoryStorage::new()));
    (Shell::new(api, session), transport)
}

#[test]
fn parses_subcommands() {
    let cli = Cli::parse_from(["instafeed", "--api-base", "http://localhost:9000", "like", "42"]);
    assert_eq!(cli.api_base.as_deref(), Some("http://localhost:9000"));
    assert_eq!(cli.command, Command::Like { post: 42 });

    let cli = Cli::parse_from(["instafeed", "comment", "7", "nice shot"]);
    assert_eq!(
        cli.command,
        Command::Comment {
            post: 7,
            text: "nice shot".into()
        }
    );

    let cli = Cli::parse_from(["instafeed", "register", "--demo"]);
    assert!(matches!(cli.command, Command::Register { demo: true, .. }));
}

#[test]
fn register_needs_fields_without_demo() {
    assert!(Cli::try_parse_from(["instafeed", "register"]).is_err());
}

#[tokio::test]
async fn feed_renders_posts() {
    let (shell, _) = shell(FixedTransport::default().with("GET", "/api/posts/", 200, feed()));

    let out = shell.run(Command::Feed).await.unwrap();

    assert!(out.contains("Instagram | Home | Login"));
    assert!(out.contains("[M] maria"));
    assert!(out.contains("♡ 10 likes"));
    assert!(out.contains("(No Image)"));
}

#[tokio::test]
async fn feed_failure_offers_retry() {
    let (shell, _) = shell(FixedTransport::default());

    let out = shell.run(Command::Feed).await.unwrap();

    assert!(out.contains("Error loading feed"));
    assert!(out.contains("Network Error"));
}

#[tokio::test]
async fn like_shows_optimistic_count_on_failure() {
    let (shell, transport) = shell(FixedTransport::default().with("GET", "/api/posts/", 200, feed()));

    let out = shell.run(Command::Like { post: 42 }).await.unwrap();

    assert!(out.contains("♥ 11 likes"));
    assert!(transport
        .seen
        .lock()
        .unwrap()
        .contains(&format!("POST {BASE}/api/posts/42/like/")));
}

#[tokio::test]
async fn unknown_post_is_an_error() {
    let (shell, _) = shell(FixedTransport::default().with("GET", "/api/posts/", 200, feed()));

    let err = shell.run(Command::Like { post: 1 }).await.unwrap_err();
    assert!(matches!(err, ShellError::PostNotFound(1)));
}

#[tokio::test]
async fn comment_auth_failure_routes_to_login() {
    let (shell, _) = shell(
        FixedTransport::default()
            .with("GET", "/api/posts/", 200, feed())
            .with("GET", "/api/posts/42/comments/", 200, json!([]))
            .with("POST", "/api/posts/42/comments/", 403, json!({})),
    );
    shell
        .session()
        .set(Identity {
            id: 9,
            username: "demo_user".into(),
            email: None,
        })
        .unwrap();

    let out = shell
        .run(Command::Comment {
            post: 42,
            text: "hello".into(),
        })
        .await
        .unwrap();

    assert!(out.contains("Please login to comment."));
    assert!(out.contains("instafeed login"));
    assert!(!shell.session().is_authenticated());
}

#[tokio::test]
async fn profile_route_is_a_placeholder() {
    let (shell, transport) = shell(FixedTransport::default());

    let out = shell
        .run(Command::Open {
            path: "/profile/3".into(),
        })
        .await
        .unwrap();

    assert!(out.contains("User ID: 3"));
    assert!(transport.seen.lock().unwrap().is_empty());
}

/// Reads and writes work; removing the saved session always fails.
struct StuckStorage(MemoryStorage);

impl Storage for StuckStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, ClientError> {
        self.0.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), ClientError> {
        self.0.set_item(key, value)
    }

    fn remove_item(&self, _key: &str) -> Result<(), ClientError> {
        Err(ClientError::Storage("read-only file system".into()))
    }
}

#[tokio::test]
async fn logout_warns_when_saved_session_survives() {
    let transport = Arc::new(
        FixedTransport::default()
            .with("POST", "/api/auth/logout/", 200, json!({}))
            .with("GET", "/api/posts/", 200, feed()),
    );
    let api = ApiClient::new(transport.clone(), Url::parse(BASE).unwrap());
    let session = SessionContext::from_storage(Arc::new(StuckStorage(MemoryStorage::new())));
    session
        .set(Identity {
            id: 9,
            username: "demo_user".into(),
            email: None,
        })
        .unwrap();
    let shell = Shell::new(api, session);

    let out = shell.run(Command::Logout).await.unwrap();

    assert!(out.contains(LOGOUT_STORAGE_NOTICE));
    assert!(out.contains("read-only file system"));
    assert!(out.contains("sunset at the pier"));
    assert!(!shell.session().is_authenticated());
}

#[tokio::test]
async fn logout_failure_on_server_is_quiet() {
    let (shell, _) = shell(FixedTransport::default().with("GET", "/api/posts/", 200, feed()));

    let out = shell.run(Command::Logout).await.unwrap();

    assert!(!out.contains(LOGOUT_STORAGE_NOTICE));
    assert!(out.contains("sunset at the pier"));
}
