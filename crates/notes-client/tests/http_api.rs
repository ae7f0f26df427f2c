//! End-to-end tests for the HTTP transport.
//!
//! Runs a small axum note service on a random local port and drives
//! `HttpNotesApi` and `NotesApp` against it.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::{TimeZone, Utc};
use notes_client::{Config, HttpNotesApi, NotesApp};
use notes_core::{
    AlertKind, ApiError, Category, DeleteOutcome, FieldLimits, Note, NoteDraft, NoteId, NotesApi,
    SyncError,
};
use serde_json::Value;
use tokio::net::TcpListener;
use url::Url;

#[derive(Default)]
struct ServerState {
    notes: Vec<Note>,
    queries: Vec<Option<String>>,
    update_bodies: Vec<Value>,
}

type Shared = Arc<Mutex<ServerState>>;

async fn list_notes(State(state): State<Shared>, RawQuery(query): RawQuery) -> Json<Vec<Note>> {
    let mut state = state.lock().unwrap();
    state.queries.push(query);
    Json(state.notes.clone())
}

async fn create_note(
    State(state): State<Shared>,
    Json(mut body): Json<Value>,
) -> (StatusCode, Json<Note>) {
    if body.get("id").is_none() {
        body["id"] = Value::String(NoteId::generate().to_string());
    }
    let note: Note = serde_json::from_value(body).unwrap();
    state.lock().unwrap().notes.push(note.clone());
    (StatusCode::CREATED, Json(note))
}

async fn update_note(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Result<Json<Note>, StatusCode> {
    let mut state = state.lock().unwrap();
    state.update_bodies.push(body.clone());

    let Some(slot) = state.notes.iter_mut().find(|n| n.id.as_str() == id) else {
        return Err(StatusCode::NOT_FOUND);
    };
    body["id"] = Value::String(id);
    let note: Note = serde_json::from_value(body).map_err(|_| StatusCode::BAD_REQUEST)?;
    *slot = note.clone();
    Ok(Json(note))
}

async fn delete_note(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    if id == "broken" {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    let mut state = state.lock().unwrap();
    let before = state.notes.len();
    state.notes.retain(|n| n.id.as_str() != id);
    if state.notes.len() == before {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    }
}

/// Start the test service, returning its address and shared state.
async fn start_server(notes: Vec<Note>) -> (SocketAddr, Shared) {
    let state: Shared = Arc::new(Mutex::new(ServerState {
        notes,
        ..Default::default()
    }));
    let app = Router::new()
        .route("/api/notes", get(list_notes).post(create_note))
        .route("/api/notes/{id}", put(update_note).delete(delete_note))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, state)
}

fn api_for(addr: SocketAddr) -> HttpNotesApi {
    let base = Url::parse(&format!("http://{}/api", addr)).unwrap();
    HttpNotesApi::new(base, Duration::from_secs(5)).unwrap()
}

fn sample(id: &str, title: &str, category: Category) -> Note {
    Note {
        id: id.into(),
        title: title.into(),
        description: format!("{} details", title),
        category,
        date: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_list_sends_query_and_decodes_notes() {
    let (addr, state) = start_server(vec![
        sample("a", "Groceries", Category::New),
        sample("b", "Taxes", Category::InProgress),
    ])
    .await;
    let api = api_for(addr);

    let notes = api
        .list("q=a%26b+c&category=In+progress&_sort=date&_order=desc")
        .await
        .unwrap();

    assert_eq!(notes.len(), 2);
    assert_eq!(notes[1].category, Category::InProgress);
    assert_eq!(
        state.lock().unwrap().queries,
        vec![Some(
            "q=a%26b+c&category=In+progress&_sort=date&_order=desc".to_string()
        )]
    );
}

#[tokio::test]
async fn test_list_with_empty_query() {
    let (addr, state) = start_server(vec![]).await;
    let api = api_for(addr);

    assert!(api.list("").await.unwrap().is_empty());
    assert_eq!(state.lock().unwrap().queries, vec![None]);
}

#[tokio::test]
async fn test_create_returns_server_note() {
    let (addr, state) = start_server(vec![]).await;
    let api = api_for(addr);

    let draft = NoteDraft::new("Call plumber", "kitchen sink", Category::New);
    let created = api.create(&draft).await.unwrap();

    assert_eq!(Some(&created.id), draft.id.as_ref());
    assert_eq!(created.title, "Call plumber");
    assert_eq!(state.lock().unwrap().notes, vec![created]);
}

#[tokio::test]
async fn test_update_sends_fields_without_id() {
    let (addr, state) = start_server(vec![sample("a", "Groceries", Category::New)]).await;
    let api = api_for(addr);

    let mut note = sample("a", "Groceries", Category::New);
    note.category = Category::Completed;
    let updated = api.update(&note).await.unwrap();

    assert_eq!(updated, note);
    let state = state.lock().unwrap();
    let body = &state.update_bodies[0];
    assert!(body.get("id").is_none());
    assert_eq!(body["category"], "Completed");
}

#[tokio::test]
async fn test_update_missing_note_is_status_error() {
    let (addr, _state) = start_server(vec![]).await;
    let api = api_for(addr);

    let err = api
        .update(&sample("ghost", "Ghost", Category::New))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(404));
    assert!(matches!(err, ApiError::Status { ref method, .. } if method == "PUT"));
}

#[tokio::test]
async fn test_delete_and_server_failure() {
    let (addr, state) = start_server(vec![sample("a", "Groceries", Category::New)]).await;
    let api = api_for(addr);

    api.delete(&NoteId::from("a")).await.unwrap();
    assert!(state.lock().unwrap().notes.is_empty());

    let err = api.delete(&NoteId::from("broken")).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Grab a free port, then close it again.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = api_for(addr).list("").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_app_round_trip_over_http() {
    let (addr, state) = start_server(vec![
        sample("a", "Groceries", Category::New),
        sample("b", "Taxes", Category::InProgress),
    ])
    .await;
    let config = Config::new(&format!("http://{}/api", addr)).unwrap();
    let app = NotesApp::connect(&config).unwrap();
    assert_eq!(config.limits, FieldLimits::default());

    app.refresh().await.unwrap();
    assert_eq!(app.store().len(), 2);

    // Add
    app.select_add();
    {
        let mut session = app.sync().session();
        let editor = session.editor_mut().unwrap();
        editor.set_title("Call plumber");
        editor.set_description("kitchen sink");
    }
    let created = app.save_editor().await.unwrap().unwrap();
    assert_eq!(app.store().len(), 3);
    assert_eq!(state.lock().unwrap().notes.len(), 3);

    // Delete, declined then confirmed
    let declined = app.delete(&created, |_| false).await.unwrap();
    assert_eq!(declined, DeleteOutcome::Declined);
    assert_eq!(app.store().len(), 3);

    let deleted = app
        .delete(&created, |n| n.delete_prompt() == "Delete note Call plumber?")
        .await
        .unwrap();
    assert_eq!(deleted, DeleteOutcome::Deleted);
    assert_eq!(app.store().len(), 2);
    assert_eq!(app.alerts().current().map(|a| a.kind), Some(AlertKind::Info));

    // Failed delete leaves the store alone and raises an error alert
    let broken = sample("broken", "Broken", Category::New);
    app.store().append(broken.clone());
    let err = app.delete(&broken, |_| true).await.unwrap_err();
    assert!(matches!(err, SyncError::Api(ref e) if e.status() == Some(500)));
    assert!(app.store().contains(&broken.id));
    assert_eq!(app.alerts().current().map(|a| a.kind), Some(AlertKind::Error));
}

#[tokio::test]
async fn test_app_search_is_debounced_over_http() {
    let (addr, state) = start_server(vec![sample("a", "Groceries", Category::New)]).await;
    let config = Config::new(&format!("http://{}/api", addr)).unwrap();
    let app = NotesApp::connect(&config).unwrap();

    app.on_search_text("g");
    app.on_search_text("gr");
    app.on_search_text("gro");
    tokio::time::sleep(Duration::from_millis(900)).await;

    assert_eq!(
        state.lock().unwrap().queries,
        vec![Some("q=gro&_sort=date&_order=desc".to_string())]
    );
    assert_eq!(app.store().filter().search, "gro");
    assert_eq!(app.store().len(), 1);
}
