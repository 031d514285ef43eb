use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod clock;
mod config;
mod dto;
mod error;
mod handlers;
mod models;
mod services;
mod storage;

use clock::{Clock, SystemClock};
use config::{Config, StorageBackend};
use services::actions::ActionSlot;
use services::claude::ClaudeClient;
use services::entry_store::EntryStore;
use services::gateway::{Gateway, JournalingPrompt, MovieRecommendation};
use services::settings_store::SettingsStore;
use storage::{FileStore, KeyValueStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub clock: Arc<dyn Clock>,
    pub entries: Arc<EntryStore>,
    pub settings: Arc<SettingsStore>,
    pub gateway: Arc<Gateway>,
    pub journal_prompt: ActionSlot<JournalingPrompt>,
    pub movie_recommendation: ActionSlot<MovieRecommendation>,
}

impl AppState {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        gateway: Gateway,
    ) -> Self {
        Self {
            entries: Arc::new(EntryStore::open(storage.clone(), clock.clone())),
            settings: Arc::new(SettingsStore::new(storage)),
            clock,
            gateway: Arc::new(gateway),
            journal_prompt: ActionSlot::new(),
            movie_recommendation: ActionSlot::new(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        // Catalog
        .route("/api/moods", get(handlers::moods::list_moods))
        // Entries
        .route(
            "/api/entries",
            get(handlers::entries::list_entries).post(handlers::entries::create_entry),
        )
        .route("/api/entries/today", get(handlers::entries::today_entry))
        // Stats
        .route("/api/stats/mood-counts", get(handlers::stats::mood_counts))
        .route("/api/stats/daily-average", get(handlers::stats::daily_average))
        // AI actions
        .route(
            "/api/ai/journal-prompt",
            get(handlers::ai::journal_prompt_status).post(handlers::ai::generate_journal_prompt),
        )
        .route(
            "/api/ai/movie-recommendation",
            get(handlers::ai::movie_recommendation_status).post(handlers::ai::recommend_movie),
        )
        // Settings
        .route(
            "/api/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let mut origins: Vec<axum::http::HeaderValue> = Vec::new();
    match config.frontend_url.parse() {
        Ok(origin) => origins.push(origin),
        Err(_) => tracing::warn!(url = %config.frontend_url, "Ignoring invalid FRONTEND_URL"),
    }
    if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
        for o in extra.split(',') {
            if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                origins.push(hv);
            }
        }
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "reflectflow_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    let storage: Arc<dyn KeyValueStore> = match config.storage_backend {
        StorageBackend::File => {
            let store = FileStore::new(config.data_dir.clone());
            tracing::info!(data_dir = %store.root().display(), "Using file storage");
            Arc::new(store)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, history will not survive a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let generator = ClaudeClient::from_config(&config).expect("Failed to build Claude client");
    if config.claude_api_key.is_empty() {
        tracing::warn!("CLAUDE_API_KEY not set, AI actions will return errors");
    }

    let state = AppState::new(
        storage,
        Arc::new(SystemClock),
        Gateway::new(Arc::new(generator)),
    );

    let app = build_router(state)
        .layer(cors_layer(&config))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app).await.expect("Server error");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use chrono::Duration;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use crate::clock::FixedClock;
    use crate::services::gateway::tests::ScriptedGenerator;
    use crate::services::gateway::GenerationError;
    use tower::ServiceExt;

    fn test_state(generator: Arc<ScriptedGenerator>) -> (AppState, Arc<FixedClock>) {
        let clock = Arc::new(FixedClock::noon());
        let state = AppState::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            Gateway::new(generator),
        );
        (state, clock)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(v) => builder
                .header("content-type", "application/json")
                .body(Body::from(v.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let (state, _) = test_state(ScriptedGenerator::replying(vec![]));
        let app = build_router(state);

        let (status, body) = send(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "reflectflow-api");

        let (status, body) = send(&app, "GET", "/readyz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["storage"], "ok");
    }

    #[tokio::test]
    async fn test_catalog_lists_eleven_moods() {
        let (state, _) = test_state(ScriptedGenerator::replying(vec![]));
        let (_, body) = send(&build_router(state), "GET", "/api/moods", None).await;
        let moods = body.as_array().unwrap();
        assert_eq!(moods.len(), 11);
        assert_eq!(moods[0], json!({"mood": "Happy", "emoji": "😊", "value": 5}));
    }

    #[tokio::test]
    async fn test_create_and_list_entries() {
        let (state, clock) = test_state(ScriptedGenerator::replying(vec![]));
        let app = build_router(state);

        let (status, created) =
            send(&app, "POST", "/api/entries", Some(json!({"mood": "Sad", "journal": "meh"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["emoji"], "😢");
        assert_eq!(created["value"], 2);
        assert_eq!(created["id"], created["date"]);

        clock.advance(Duration::minutes(1));
        send(&app, "POST", "/api/entries", Some(json!({"mood": "Happy"}))).await;

        let (_, all) = send(&app, "GET", "/api/entries", None).await;
        let moods: Vec<&str> = all
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["mood"].as_str().unwrap())
            .collect();
        assert_eq!(moods, vec!["Happy", "Sad"]);

        let (_, limited) = send(&app, "GET", "/api/entries?limit=1", None).await;
        assert_eq!(limited.as_array().unwrap().len(), 1);

        let (_, today) = send(&app, "GET", "/api/entries/today", None).await;
        assert_eq!(today["mood"], "Happy");
    }

    #[tokio::test]
    async fn test_today_is_null_without_entries() {
        let (state, _) = test_state(ScriptedGenerator::replying(vec![]));
        let (status, body) = send(&build_router(state), "GET", "/api/entries/today", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::Null);
    }

    #[tokio::test]
    async fn test_create_entry_rejects_bad_value() {
        let (state, _) = test_state(ScriptedGenerator::replying(vec![]));
        let (status, body) = send(
            &build_router(state),
            "POST",
            "/api/entries",
            Some(json!({"mood": "Calm", "value": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], 422);
    }

    #[tokio::test]
    async fn test_stats_endpoints() {
        let (state, clock) = test_state(ScriptedGenerator::replying(vec![]));
        let app = build_router(state);

        for mood in ["Sad", "Sad", "Happy"] {
            send(&app, "POST", "/api/entries", Some(json!({"mood": mood}))).await;
            clock.advance(Duration::minutes(1));
        }

        let (_, counts) = send(&app, "GET", "/api/stats/mood-counts?n=7", None).await;
        assert_eq!(
            counts,
            json!([{"mood": "Happy", "count": 1}, {"mood": "Sad", "count": 2}])
        );

        let (_, avg) = send(&app, "GET", "/api/stats/daily-average", None).await;
        // (5 + 2 + 2) / 3 = 3
        assert_eq!(
            avg,
            json!([{"day": "Oct 19", "date": "2026-10-19", "avgValue": 3}])
        );

        let (status, _) = send(&app, "GET", "/api/stats/daily-average?window_days=0", None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_journal_prompt_seeded_for_empty_history() {
        let (state, _) = test_state(ScriptedGenerator::replying(vec![]));
        let (status, body) =
            send(&build_router(state), "POST", "/api/ai/journal-prompt", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"prompt": "What's on your mind today?"}));
    }

    #[tokio::test]
    async fn test_journal_prompt_from_history() {
        let generator = ScriptedGenerator::ok(r#"{"prompt":"What felt heavy today?"}"#);
        let (state, _) = test_state(generator.clone());
        let app = build_router(state);

        send(&app, "POST", "/api/entries", Some(json!({"mood": "Sad"}))).await;
        let (_, body) = send(&app, "POST", "/api/ai/journal-prompt", None).await;

        assert_eq!(body, json!({"prompt": "What felt heavy today?"}));
        assert!(generator.seen.lock()[0].contains("1 day(s) feeling Sad."));

        let (_, status) = send(&app, "GET", "/api/ai/journal-prompt", None).await;
        assert_eq!(status["state"], "succeeded");
        assert_eq!(status["data"]["prompt"], "What felt heavy today?");
    }

    #[tokio::test]
    async fn test_journal_prompt_failure_is_a_typed_error() {
        let generator = ScriptedGenerator::replying(vec![Err(GenerationError::Status {
            status: 500,
            body: "down".into(),
        })]);
        let (state, _) = test_state(generator);
        let app = build_router(state);

        send(&app, "POST", "/api/entries", Some(json!({"mood": "Sad"}))).await;
        let (status, body) = send(&app, "POST", "/api/ai/journal-prompt", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"error": "An unexpected error occurred while generating the prompt."})
        );
        let (_, entries) = send(&app, "GET", "/api/entries", None).await;
        assert_eq!(entries.as_array().unwrap().len(), 1, "store must be untouched");
    }

    #[tokio::test]
    async fn test_pending_action_rejects_duplicate() {
        let (state, _) = test_state(ScriptedGenerator::replying(vec![]));
        let _pending = state.journal_prompt.begin().unwrap();
        let (status, body) =
            send(&build_router(state), "POST", "/api/ai/journal-prompt", None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], 409);
    }

    #[tokio::test]
    async fn test_movie_recommendation() {
        let generator = ScriptedGenerator::replying(vec![
            Ok(r#"{"title":"Sing Street","imdbId":"tt3544112","reason":"Joyful and loud."}"#.into()),
            Ok(r#"{"title":"Sing Street"}"#.into()),
        ]);
        let (state, _) = test_state(generator);
        let app = build_router(state);

        let (_, body) = send(
            &app,
            "POST",
            "/api/ai/movie-recommendation",
            Some(json!({"mood": "Happy"})),
        )
        .await;
        assert_eq!(
            body,
            json!({"title": "Sing Street", "reason": "Joyful and loud.", "imdbId": "tt3544112"})
        );

        let (status, body) = send(
            &app,
            "POST",
            "/api/ai/movie-recommendation",
            Some(json!({"mood": "Happy"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({"error": "Could not generate a recommendation. Please try again."})
        );

        let (_, status) = send(&app, "GET", "/api/ai/movie-recommendation", None).await;
        assert_eq!(status["state"], "failed");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_file_backed_writes_persist() {
        let dir = tempfile::tempdir().unwrap();
        let clock = Arc::new(FixedClock::noon());
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(dir.path()));
        let app = build_router(AppState::new(
            storage.clone(),
            clock.clone(),
            Gateway::new(ScriptedGenerator::replying(vec![])),
        ));

        let (status, _) =
            send(&app, "POST", "/api/entries", Some(json!({"mood": "Grateful"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let update = json!({"remindersEnabled": true, "reminderTime": "21:15"});
        let (status, _) = send(&app, "PUT", "/api/settings", Some(update.clone())).await;
        assert_eq!(status, StatusCode::OK);

        let reopened = build_router(AppState::new(
            storage,
            clock,
            Gateway::new(ScriptedGenerator::replying(vec![])),
        ));
        let (_, all) = send(&reopened, "GET", "/api/entries", None).await;
        assert_eq!(all[0]["mood"], "Grateful");
        let (_, settings) = send(&reopened, "GET", "/api/settings", None).await;
        assert_eq!(settings, update);
    }

    #[tokio::test]
    async fn test_settings_round_trip() {
        let (state, _) = test_state(ScriptedGenerator::replying(vec![]));
        let app = build_router(state);

        let (_, defaults) = send(&app, "GET", "/api/settings", None).await;
        assert_eq!(defaults, json!({"remindersEnabled": false, "reminderTime": "19:00"}));

        let update = json!({"remindersEnabled": true, "reminderTime": "09:00"});
        let (status, _) = send(&app, "PUT", "/api/settings", Some(update.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (_, stored) = send(&app, "GET", "/api/settings", None).await;
        assert_eq!(stored, update);

        let (status, _) = send(
            &app,
            "PUT",
            "/api/settings",
            Some(json!({"remindersEnabled": true, "reminderTime": "9am"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
