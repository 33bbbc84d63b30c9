//! Catalog client against a local mock API.
//!
//! Spins up an axum server on an ephemeral port serving `/`, `/id/:id` and
//! `/genre/:id`, then exercises the client end to end: decoding, id
//! normalization, genre fan-out, error mapping and request supersession.
//!
//! Run with: cargo test -p podshelf-core --test catalog_api

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use podshelf_core::api::CatalogClient;
use podshelf_core::config::ApiConfig;
use podshelf_core::error::PodError;
use podshelf_core::model::{GenreRef, Seasons};
use podshelf_core::slot::RequestSlot;

#[derive(Clone, Default)]
struct MockState {
    genre_hits: Arc<AtomicUsize>,
}

async fn catalog() -> Json<Value> {
    Json(json!([
        {"id": "10716", "title": "Something Was Wrong", "description": "", "image": "",
         "seasons": 14, "genres": [1, 2], "updated": "2022-11-03T07:00:00.000Z"},
        {"id": 5675, "title": "This Is Actually Happening", "description": "", "image": "",
         "seasons": 12, "genres": [2], "updated": "2022-11-01T00:00:00.000Z"}
    ]))
}

async fn show(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "missing" => StatusCode::NOT_FOUND.into_response(),
        "garbled" => (StatusCode::OK, "<html>not json</html>").into_response(),
        _ => {
            if id == "slow" {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            Json(json!({
                "id": id,
                "title": format!("Show {id}"),
                "description": "",
                "image": "",
                "updated": "2023-01-01T00:00:00.000Z",
                "genres": ["Featured", " History ", "All"],
                "seasons": [
                    {"season": 1, "title": "One", "image": "s1.jpg", "episodes": [
                        {"title": "Pilot", "description": "", "episode": 1, "file": "https://cdn/1.mp3"},
                        {"title": "Two", "description": "", "episode": 2, "file": "https://cdn/2.mp3"}
                    ]}
                ]
            }))
            .into_response()
        }
    }
}

async fn genre(State(state): State<MockState>, Path(id): Path<u32>) -> Response {
    state.genre_hits.fetch_add(1, Ordering::SeqCst);
    match id {
        1 => Json(json!({"id": 1, "title": "Personal Growth", "shows": []})).into_response(),
        2 => Json(json!({"id": 2, "title": "Featured", "shows": []})).into_response(),
        3 => Json(json!({"id": 3, "title": "History", "shows": []})).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn spawn_server() -> (CatalogClient, MockState) {
    let state = MockState::default();
    let app = Router::new()
        .route("/", get(catalog))
        .route("/id/:id", get(show))
        .route("/genre/:id", get(genre))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = ApiConfig {
        base_url: format!("http://{addr}/"),
        timeout_secs: 5,
    };
    (CatalogClient::new(&config).unwrap(), state)
}

#[tokio::test]
async fn fetches_catalog_with_mixed_id_types() {
    let (client, _) = spawn_server().await;
    let shows = client.fetch_catalog().await.unwrap();
    assert_eq!(shows.len(), 2);
    assert_eq!(shows[0].id, "10716");
    assert_eq!(shows[1].id, "5675");
    assert_eq!(shows[0].seasons, Seasons::Count(14));
    assert_eq!(shows[0].genres, vec![GenreRef::Id(1), GenreRef::Id(2)]);
}

#[tokio::test]
async fn fetches_show_detail_and_fills_episode_ids() {
    let (client, _) = spawn_server().await;
    let show = client.fetch_show("42").await.unwrap();
    let seasons = show.season_list();
    assert_eq!(seasons.len(), 1);
    assert_eq!(seasons[0].episodes[0].id, "42-s1-e1");
    assert_eq!(seasons[0].episodes[1].id, "42-s1-e2");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let (client, _) = spawn_server().await;
    match client.fetch_show("missing").await {
        Err(PodError::Status { status, url }) => {
            assert_eq!(status, 404);
            assert!(url.ends_with("/id/missing"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_a_decode_error() {
    let (client, _) = spawn_server().await;
    let err = client.fetch_show("garbled").await.unwrap_err();
    assert!(matches!(err, PodError::Decode { .. }));
    assert!(err.is_network());
}

#[tokio::test]
async fn genre_titles_fan_out_once_per_unique_id() {
    let (client, state) = spawn_server().await;
    let titles = client.fetch_genre_titles(&[1, 3, 1, 3, 1]).await.unwrap();
    assert_eq!(titles, vec!["Personal Growth", "History"]);
    assert_eq!(state.genre_hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn genre_titles_are_all_or_nothing() {
    let (client, _) = spawn_server().await;
    assert!(client.fetch_genre_titles(&[1, 99]).await.is_err());
    assert!(client.fetch_genre_titles(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn resolves_named_and_numeric_genres_without_hidden_values() {
    let (client, state) = spawn_server().await;

    let named = client.fetch_show("7").await.unwrap();
    let titles = client.resolve_genre_titles(&named).await.unwrap();
    assert_eq!(titles, vec!["History"]);
    assert_eq!(state.genre_hits.load(Ordering::SeqCst), 0);

    let catalog = client.fetch_catalog().await.unwrap();
    let titles = client.resolve_genre_titles(&catalog[0]).await.unwrap();
    assert_eq!(titles, vec!["Personal Growth"]);
}

#[tokio::test]
async fn superseded_detail_fetch_is_discarded() {
    let (client, _) = spawn_server().await;
    let slot = RequestSlot::new();

    let slow_ticket = slot.begin("slow");
    let slow_client = client.clone();
    let slow = tokio::spawn(async move { (slow_ticket, slow_client.fetch_show("slow").await) });

    let fast_ticket = slot.begin("fast");
    let fast = client.fetch_show("fast").await.unwrap();
    assert!(slot.accepts(&fast_ticket));
    assert_eq!(fast.id, "fast");

    let (ticket, result) = slow.await.unwrap();
    assert!(result.is_ok());
    assert!(!slot.accepts(&ticket));
}
