//! End-to-end cloud backup against a fake gist API.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use notepin_core::sync::GistError;
use notepin_core::{AppConfig, Error, MemoryStorage, NotesApp};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const GOOD_TOKEN: &str = "ghp_good";

#[derive(Clone, Default)]
struct FakeGists {
    gists: Arc<Mutex<HashMap<String, Value>>>,
    patches: Arc<Mutex<usize>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    let expected = format!("Bearer {GOOD_TOKEN}");
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        == Some(expected.as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Bad credentials" })),
    )
        .into_response()
}

async fn user(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({ "login": "notepin-tester", "name": "Tester" })).into_response()
}

async fn create_gist(
    State(state): State<FakeGists>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut gists = state.gists.lock().unwrap();
    let id = format!("gist-{}", gists.len() + 1);
    gists.insert(id.clone(), body["files"].clone());
    (
        StatusCode::CREATED,
        Json(json!({ "id": id, "files": body["files"] })),
    )
        .into_response()
}

async fn update_gist(
    State(state): State<FakeGists>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let mut gists = state.gists.lock().unwrap();
    let Some(files) = gists.get_mut(&id) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response();
    };
    *files = body["files"].clone();
    *state.patches.lock().unwrap() += 1;
    Json(json!({ "id": id, "files": files.clone() })).into_response()
}

async fn fetch_gist(
    State(state): State<FakeGists>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let gists = state.gists.lock().unwrap();
    match gists.get(&id) {
        Some(files) => {
            let mut files = files.clone();
            for file in files.as_object_mut().into_iter().flat_map(|map| map.values_mut()) {
                file["truncated"] = json!(false);
            }
            Json(json!({ "id": id, "files": files })).into_response()
        }
        None => (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" }))).into_response(),
    }
}

async fn spawn_fake_api() -> (SocketAddr, FakeGists) {
    let state = FakeGists::default();
    let router = Router::new()
        .route("/user", get(user))
        .route("/gists", post(create_gist))
        .route("/gists/{id}", get(fetch_gist).patch(update_gist))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, state)
}

fn config_for(addr: SocketAddr) -> AppConfig {
    let mut config = AppConfig::default();
    config.cloud.api_base_url = format!("http://{addr}");
    config
}

async fn create(app: &mut NotesApp<MemoryStorage>, title: &str, content: &str) {
    app.open_new();
    app.set_title(title).unwrap();
    app.set_content(content).unwrap();
    app.save_current().await.unwrap();
}

#[tokio::test]
async fn login_rejects_invalid_token_without_storing_it() {
    let (addr, _state) = spawn_fake_api().await;
    let mut app = NotesApp::load(MemoryStorage::default(), config_for(addr)).await;

    let err = app.cloud_login("ghp_wrong").await.unwrap_err();
    assert!(matches!(err, Error::Cloud(GistError::Unauthorized(_))));
    assert!(!app.cloud_status().await.unwrap().logged_in);
}

#[tokio::test]
async fn backup_creates_then_updates_and_restore_replaces_collection() {
    let (addr, state) = spawn_fake_api().await;
    let mut app = NotesApp::load(MemoryStorage::default(), config_for(addr)).await;

    let user = app.cloud_login(GOOD_TOKEN).await.unwrap();
    assert_eq!(user.login, "notepin-tester");

    create(&mut app, "first", "one").await;
    let gist_id = app.backup_to_cloud().await.unwrap();
    assert_eq!(gist_id, "gist-1");
    assert_eq!(
        app.cloud_status().await.unwrap().gist_id.as_deref(),
        Some("gist-1")
    );

    create(&mut app, "second", "two").await;
    assert_eq!(app.backup_to_cloud().await.unwrap(), "gist-1");
    assert_eq!(*state.patches.lock().unwrap(), 1);
    assert_eq!(state.gists.lock().unwrap().len(), 1);

    let backed_up = app.notes().to_vec();
    app.clear_all(true).await.unwrap();

    assert!(matches!(
        app.restore_from_cloud(false).await,
        Err(Error::ConfirmationRequired(_))
    ));
    assert!(app.notes().is_empty());

    assert_eq!(app.restore_from_cloud(true).await.unwrap(), 2);
    assert_eq!(app.notes(), backed_up.as_slice());
}

#[tokio::test]
async fn backup_file_carries_payload_metadata() {
    let (addr, state) = spawn_fake_api().await;
    let mut app = NotesApp::load(MemoryStorage::default(), config_for(addr)).await;
    app.cloud_login(GOOD_TOKEN).await.unwrap();
    create(&mut app, "only", "note").await;

    let gist_id = app.backup_to_cloud().await.unwrap();
    let gists = state.gists.lock().unwrap();
    let content = gists[&gist_id]["notes-backup.json"]["content"]
        .as_str()
        .unwrap()
        .to_string();
    let payload: Value = serde_json::from_str(&content).unwrap();

    assert_eq!(payload["version"], "1.0");
    assert_eq!(payload["totalNotes"], 1);
    assert!(payload["lastUpdated"].is_string());
    assert_eq!(payload["notes"][0]["title"], "only");
}

#[tokio::test]
async fn logout_forgets_credential_and_document() {
    let (addr, _state) = spawn_fake_api().await;
    let mut app = NotesApp::load(MemoryStorage::default(), config_for(addr)).await;
    app.cloud_login(GOOD_TOKEN).await.unwrap();
    create(&mut app, "note", "body").await;
    app.backup_to_cloud().await.unwrap();

    app.cloud_logout().await.unwrap();
    let status = app.cloud_status().await.unwrap();
    assert!(!status.logged_in);
    assert!(status.gist_id.is_none());
    assert!(matches!(
        app.backup_to_cloud().await,
        Err(Error::Cloud(GistError::NotConfigured))
    ));
}
