//! Radarr/Sonarr clients against an in-process stub server.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use darrlink_core::arr::{
    AcquisitionClient, ArrError, LookupClient, MovieRegistration, QueueInspector, QueueStatus,
    SeriesRegistration,
};
use darrlink_core::config::{DispatchMode, RadarrConfig, SonarrConfig};
use darrlink_core::testing::fixtures;
use darrlink_core::{RadarrClient, SonarrClient, TitleQuery};

const API_KEY: &str = "stub-key";

#[derive(Default)]
struct Stub {
    terms: Mutex<Vec<String>>,
    posted: Mutex<Vec<(String, Value)>>,
}

type Shared = State<Arc<Stub>>;

fn authorized(headers: &HeaderMap) -> bool {
    headers.get("x-api-key").and_then(|v| v.to_str().ok()) == Some(API_KEY)
}

async fn movie_lookup(
    State(stub): Shared,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let term = params.get("term").cloned().unwrap_or_default();
    stub.terms.lock().unwrap().push(term.clone());

    if term.starts_with("Nothing") {
        return Json(json!([])).into_response();
    }
    Json(json!([{
        "id": 0,
        "title": "Amélie",
        "year": 2001,
        "tmdbId": 194,
        "imdbId": "tt0211915",
        "folder": "Amélie (2001)",
        "isAvailable": true,
        "hasFile": false,
        "ratings": {"imdb": {"value": 8.3}},
        "alternateTitles": [{"title": "Le Fabuleux Destin d'Amélie Poulain"}]
    }]))
    .into_response()
}

async fn queue_details(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("movieId").map(String::as_str) {
        Some("7") => Json(json!([{"status": "Downloading", "title": "x"}])).into_response(),
        Some("8") => (StatusCode::INTERNAL_SERVER_ERROR, "queue exploded").into_response(),
        _ => Json(json!([])).into_response(),
    }
}

async fn create_movie(State(stub): Shared, Json(body): Json<Value>) -> Response {
    stub.posted
        .lock()
        .unwrap()
        .push(("movie".to_string(), body.clone()));
    if body["title"] == "Bad" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!([{"errorMessage": "This movie has already been added"}])),
        )
            .into_response();
    }
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn command(State(stub): Shared, Json(body): Json<Value>) -> Response {
    stub.posted
        .lock()
        .unwrap()
        .push(("command".to_string(), body));
    (StatusCode::CREATED, Json(json!({"id": 1, "status": "queued"}))).into_response()
}

async fn series_lookup(Query(params): Query<HashMap<String, String>>) -> Response {
    let term = params.get("term").cloned().unwrap_or_default();
    if term.starts_with("Broken") {
        return (StatusCode::INTERNAL_SERVER_ERROR, "lookup unavailable").into_response();
    }
    Json(json!([{"id": 12, "title": "The Wire", "year": 2002, "tvdbId": 79126}])).into_response()
}

async fn create_series() -> Response {
    (StatusCode::CONFLICT, "plain text conflict").into_response()
}

async fn system_status(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"appName": "Radarr", "version": "5.2.6.8376"})).into_response()
}

async fn spawn_stub() -> (String, Arc<Stub>) {
    let stub = Arc::new(Stub::default());
    let app = Router::new()
        .route("/api/v3/movie/lookup", get(movie_lookup))
        .route("/api/v3/queue/details", get(queue_details))
        .route("/api/v3/movie", post(create_movie))
        .route("/api/v3/command", post(command))
        .route("/api/v3/series/lookup", get(series_lookup))
        .route("/api/v3/series", post(create_series))
        .route("/api/v3/system/status", get(system_status))
        .with_state(Arc::clone(&stub));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), stub)
}

fn radarr(url: &str, api_key: &str) -> RadarrClient {
    RadarrClient::new(&RadarrConfig {
        url: url.to_string(),
        api_key: api_key.to_string(),
        quality_profile_id: 1,
        root_folder: PathBuf::from("/data/movies"),
        force_search_on_existing: true,
        dispatch: DispatchMode::Sequential,
        timeout_secs: 5,
    })
    .unwrap()
}

fn sonarr(url: &str) -> SonarrClient {
    SonarrClient::new(&SonarrConfig {
        url: url.to_string(),
        api_key: API_KEY.to_string(),
        quality_profile_id: 1,
        language_profile_id: 1,
        root_folder: PathBuf::from("/data/tv"),
        dispatch: DispatchMode::Sequential,
        timeout_secs: 5,
    })
    .unwrap()
}

#[tokio::test]
async fn lookup_encodes_term_and_decodes_typed_matches() {
    let (url, stub) = spawn_stub().await;
    let client = radarr(&url, API_KEY);

    let matches = client
        .lookup(&TitleQuery::new("Amélie & Co", Some("2001")))
        .await
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].title, "Amélie");
    assert_eq!(matches[0].tmdb_id, Some(194));
    assert!(matches[0].is_available);
    assert_eq!(stub.terms.lock().unwrap()[0], "Amélie & Co (2001)");
}

#[tokio::test]
async fn empty_lookup_is_not_an_error() {
    let (url, _stub) = spawn_stub().await;
    let matches = radarr(&url, API_KEY)
        .lookup(&TitleQuery::new("Nothing", None))
        .await
        .unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn wrong_key_maps_to_unauthorized() {
    let (url, _stub) = spawn_stub().await;
    let client = radarr(&url, "wrong");

    let err = client
        .lookup(&TitleQuery::new("Amélie", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ArrError::Unauthorized(_)));

    let err = client.system_status().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn system_status_reports_version() {
    let (url, _stub) = spawn_stub().await;
    let status = radarr(&format!("{}/", url), API_KEY)
        .system_status()
        .await
        .unwrap();
    assert_eq!(status.version, "5.2.6.8376");
}

#[tokio::test]
async fn queue_details_decode_and_errors() {
    let (url, _stub) = spawn_stub().await;
    let client = radarr(&url, API_KEY);

    let records = client.queue_details(7).await.unwrap();
    assert_eq!(QueueStatus::from_records(&records), QueueStatus::Downloading);

    assert!(client.queue_details(1).await.unwrap().is_empty());

    let err = client.queue_details(8).await.unwrap_err();
    assert_eq!(err.status(), Some(500));
}

#[tokio::test]
async fn create_returns_any_status_with_body() {
    let (url, stub) = spawn_stub().await;
    let client = radarr(&url, API_KEY);
    let policy = fixtures::movie_policy();

    let good = MovieRegistration::from_match(&fixtures::movie_match("Heat", 1995), &policy);
    let response = client.create(&good).await.unwrap();
    assert!(response.is_created());
    assert_eq!(response.body["minimumAvailability"], "released");

    let bad = MovieRegistration::from_match(&fixtures::movie_match("Bad", 2000), &policy);
    let response = client.create(&bad).await.unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(
        response.body[0]["errorMessage"],
        "This movie has already been added"
    );

    let posted = stub.posted.lock().unwrap();
    assert_eq!(posted[0].1["path"], "/data/movies/Heat (1995)");
    assert!(posted[0].1.get("ratings").is_none());
}

#[tokio::test]
async fn search_commands_use_domain_payloads() {
    let (url, stub) = spawn_stub().await;

    let response = radarr(&url, API_KEY).trigger_search(42).await.unwrap();
    assert!(response.is_created());
    sonarr(&url).trigger_search(9).await.unwrap();

    let posted = stub.posted.lock().unwrap();
    assert_eq!(posted[0].1, json!({"name": "MoviesSearch", "movieIds": [42]}));
    assert_eq!(posted[1].1, json!({"name": "SeriesSearch", "seriesId": 9}));
}

#[tokio::test]
async fn series_lookup_and_plain_text_errors() {
    let (url, _stub) = spawn_stub().await;
    let client = sonarr(&url);

    let matches = client
        .lookup(&TitleQuery::new("The Wire", Some("2002")))
        .await
        .unwrap();
    assert_eq!(matches[0].tvdb_id, Some(79126));

    let err = client
        .lookup(&TitleQuery::new("Broken", None))
        .await
        .unwrap_err();
    match err {
        ArrError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "lookup unavailable");
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let registration =
        SeriesRegistration::from_match(&matches[0], &fixtures::series_policy());
    let response = client.create(&registration).await.unwrap();
    assert_eq!(response.status, 409);
    assert_eq!(response.body, json!("plain text conflict"));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = radarr(&format!("http://{}", addr), API_KEY)
        .lookup(&TitleQuery::new("Heat", None))
        .await
        .unwrap_err();
    assert!(matches!(err, ArrError::Http(_)));
    assert_eq!(err.status(), None);
}
