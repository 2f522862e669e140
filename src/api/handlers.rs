//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use crate::state::{AppState, BoardError, RingStatus, TimerId, TimerSnapshot};
use super::responses::{BoardResponse, ErrorResponse, HealthResponse, SetTimeRequest, StatusResponse};

type Rejection = (StatusCode, Json<ErrorResponse>);

fn rejected(e: BoardError) -> Rejection {
    warn!("Rejected board control: {}", e);
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(e.to_string())))
}

/// Handle GET /timers - Every clock and the preset selection
pub async fn board_handler(State(state): State<Arc<AppState>>) -> Json<BoardResponse> {
    Json(BoardResponse {
        timers: state.snapshots(),
        presets: state.presets.clone(),
        active_preset: state.active_preset(),
    })
}

/// Handle GET /timers/:id - One clock
pub async fn timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Json<TimerSnapshot> {
    Json(state.snapshot(id))
}

/// Handle POST /timers/:id/start
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Json<TimerSnapshot> {
    info!("Start requested for {} timer", id);
    Json(state.start(id))
}

/// Handle POST /timers/:id/pause
pub async fn pause_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Json<TimerSnapshot> {
    info!("Pause requested for {} timer", id);
    Json(state.pause(id))
}

/// Handle POST /timers/:id/toggle - Start/pause button
pub async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Json<TimerSnapshot> {
    let snapshot = state.toggle(id);
    info!(
        "Toggled {} timer, now {}",
        id,
        if snapshot.running { "running" } else { "stopped" }
    );
    Json(snapshot)
}

/// Handle POST /timers/:id/reset
pub async fn reset_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
) -> Json<TimerSnapshot> {
    info!("Reset requested for {} timer", id);
    Json(state.reset(id))
}

/// Handle POST /timers/:id/time - Retarget a clock to a new duration
pub async fn set_time_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<TimerId>,
    Json(request): Json<SetTimeRequest>,
) -> Result<Json<TimerSnapshot>, Rejection> {
    info!("Setting {} timer to {}s", id, request.seconds);
    state.set_time(id, request.seconds).map(Json).map_err(rejected)
}

/// Handle POST /presets/:seconds - Select a main speech length
pub async fn preset_handler(
    State(state): State<Arc<AppState>>,
    Path(seconds): Path<i64>,
) -> Result<Json<TimerSnapshot>, Rejection> {
    state.select_preset(seconds).map(Json).map_err(rejected)
}

/// Handle GET /ring - Progress ring geometry and fill
pub async fn ring_handler(State(state): State<Arc<AppState>>) -> Json<RingStatus> {
    Json(state.ring_status())
}

/// Handle GET /events - Stream clock updates and flashes as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("Event stream subscriber connected");
    let rx = state.subscribe();

    let events = stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let payload = match serde_json::to_string(&event) {
                        Ok(payload) => payload,
                        Err(e) => {
                            warn!("Failed to encode board event: {}", e);
                            continue;
                        }
                    };
                    let sse = Event::default().event(event.kind()).data(payload);
                    return Some((Ok(sse), rx));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event stream fell behind, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Service status with every clock
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timers: state.snapshots(),
        active_preset: state.active_preset(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use futures::StreamExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::{
        api::create_router,
        state::{AppState, BoardConfig, TimerId},
    };

    fn app() -> Router {
        app_with_state().0
    }

    fn app_with_state() -> (Router, Arc<AppState>) {
        let state = AppState::new(20554, "127.0.0.1".to_string(), BoardConfig::default()).unwrap();
        let state = Arc::new(state);
        (create_router(Arc::clone(&state)), state)
    }

    async fn next_frame(body: &mut axum::body::BodyDataStream) -> String {
        let chunk = body.next().await.unwrap().unwrap();
        String::from_utf8(chunk.to_vec()).unwrap()
    }

    fn frame_data(frame: &str) -> Value {
        let data = frame
            .lines()
            .find_map(|line| line.strip_prefix("data: "))
            .unwrap();
        serde_json::from_str(data).unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or(Value::Null)
        };
        (status, value)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post(uri: &str) -> Request<Body> {
        Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn lists_three_timers() {
        let app = app();
        let (status, body) = send(&app, get("/timers")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["timers"].as_array().unwrap().len(), 3);
        assert_eq!(body["timers"][0]["id"], "aff");
        assert_eq!(body["timers"][2]["display"], "4:00");
        assert_eq!(body["active_preset"], 240);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_then_pause() {
        let app = app();

        let (status, body) = send(&app, post("/timers/neg/toggle")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["running"], true);
        assert_eq!(body["button"], json!({ "kind": "icon", "value": "pause" }));

        let (_, body) = send(&app, post("/timers/neg/pause")).await;
        assert_eq!(body["running"], false);
        assert_eq!(body["phase"], "idle");
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_timer_is_client_error() {
        let app = app();
        let (status, _) = send(&app, post("/timers/judge/start")).await;
        assert!(status.is_client_error());
    }

    #[tokio::test(start_paused = true)]
    async fn set_time_validates_duration() {
        let app = app();

        let (status, body) = send(&app, post_json("/timers/aff/time", json!({ "seconds": 90 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["display"], "1:30");
        assert_eq!(body["initial_seconds"], 90);

        let (status, body) = send(&app, post_json("/timers/aff/time", json!({ "seconds": -3 }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");

        let (_, body) = send(&app, get("/timers/aff")).await;
        assert_eq!(body["remaining_seconds"], 90);
    }

    #[tokio::test(start_paused = true)]
    async fn presets_select_main_length() {
        let app = app();

        let (status, body) = send(&app, post("/presets/480")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "main");
        assert_eq!(body["display"], "8:00");
        assert_eq!(body["button"], json!({ "kind": "label", "value": "Start" }));

        let (status, _) = send(&app, post("/presets/100")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test(start_paused = true)]
    async fn ring_and_status() {
        let app = app();

        let (status, body) = send(&app, get("/ring")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["consumed_marks"], 0);
        assert_eq!(body["total_marks"], 60);
        assert_eq!(body["marks"].as_array().unwrap().len(), 60);

        send(&app, post("/timers/main/reset")).await;
        let (status, body) = send(&app, get("/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_action"], "main-reset");
        assert_eq!(body["port"], 20554);
    }

    #[tokio::test(start_paused = true)]
    async fn events_are_server_sent() {
        let app = app();
        let response = app.oneshot(get("/events")).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
        assert!(content_type.starts_with("text/event-stream"));
    }

    #[tokio::test(start_paused = true)]
    async fn event_stream_carries_updates() {
        let (app, _state) = app_with_state();
        let response = app.clone().oneshot(get("/events")).await.unwrap();
        let mut body = response.into_body().into_data_stream();

        send(&app, post("/timers/aff/reset")).await;

        let frame = next_frame(&mut body).await;
        assert!(frame.starts_with("event: update\n"), "{}", frame);
        let data = frame_data(&frame);
        assert_eq!(data["type"], "update");
        assert_eq!(data["timer"], "aff");
        assert_eq!(data["display"], "3:00");
        assert_eq!(data["remaining_seconds"], 180);
    }

    #[tokio::test(start_paused = true)]
    async fn event_stream_carries_main_flash() {
        let (app, state) = app_with_state();
        let response = app.oneshot(get("/events")).await.unwrap();
        let mut body = response.into_body().into_data_stream();

        state.set_time(TimerId::Main, 1).unwrap();
        state.start(TimerId::Main);

        let mut kinds = Vec::new();
        while kinds.last().map(String::as_str) != Some("flash") && kinds.len() < 5 {
            let frame = next_frame(&mut body).await;
            let data = frame_data(&frame);
            assert_eq!(data["timer"], "main");
            kinds.push(data["type"].as_str().unwrap().to_string());
            assert!(frame.starts_with(&format!("event: {}\n", kinds.last().unwrap())), "{}", frame);
        }

        assert_eq!(kinds, vec!["update", "update", "flash"]);
    }

    #[tokio::test(start_paused = true)]
    async fn health_reports_version() {
        let (status, body) = send(&app(), get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
