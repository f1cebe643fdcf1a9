//! Common test utilities: a scripted stand-in for the settlement authority
//! served over real HTTP, and a presenter that records what it was told.
#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use shared::{Credential, GameKind};
use wager_controller::balance_store::SessionSnapshot;
use wager_controller::config::ControllerConfig;
use wager_controller::controller::{self, ControllerEvent, WagerController};
use wager_controller::domain::{Notification, WagerOutcome};
use wager_controller::presenter::Presenter;
use wager_controller::settlement_client::HttpSettlementClient;

pub const INIT_DATA: &str = "query_id=AAE&user=%7B%22id%22%3A1%7D&hash=abc123";

/// One canned HTTP reply
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn raw(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn session(balance: f64) -> Self {
        Self::json(
            200,
            json!({
                "success": true,
                "balance": balance,
                "username": "user_1",
                "stats": { "games": 0, "total_bet": 0.0, "total_win": 0.0 }
            }),
        )
    }

    pub fn slots_win(win_amount: f64, new_balance: f64) -> Self {
        Self::json(
            200,
            json!({
                "success": true,
                "result": {
                    "reels": ["🍒", "🍒", "🍋"],
                    "multiplier": 1.5,
                    "win_amount": win_amount,
                    "is_win": true
                },
                "new_balance": new_balance
            }),
        )
    }
}

#[derive(Default)]
pub struct StubState {
    init_replies: Mutex<VecDeque<Reply>>,
    play_replies: Mutex<VecDeque<Reply>>,
    pub init_requests: Mutex<Vec<Value>>,
    pub play_requests: Mutex<Vec<Value>>,
}

impl StubState {
    pub fn play_requests(&self) -> Vec<Value> {
        self.play_requests.lock().unwrap().clone()
    }

    pub fn init_requests(&self) -> Vec<Value> {
        self.init_requests.lock().unwrap().clone()
    }
}

pub struct StubAuthority {
    pub base_url: String,
    pub state: Arc<StubState>,
}

impl StubAuthority {
    pub async fn start(init: Vec<Reply>, play: Vec<Reply>) -> Self {
        let state = Arc::new(StubState {
            init_replies: Mutex::new(init.into()),
            play_replies: Mutex::new(play.into()),
            ..Default::default()
        });

        let app = Router::new()
            .route("/api/webapp/init", post(init_handler))
            .route("/api/game/play", post(play_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub authority");
        let addr = listener.local_addr().expect("Failed to read stub address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Stub authority crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn client(&self, timeout: Duration) -> HttpSettlementClient {
        HttpSettlementClient::new(self.base_url.clone(), timeout).expect("Failed to build client")
    }
}

async fn init_handler(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.init_requests.lock().unwrap().push(body);
    let reply = state.init_replies.lock().unwrap().pop_front();
    respond(reply).await
}

async fn play_handler(State(state): State<Arc<StubState>>, Json(body): Json<Value>) -> Response {
    state.play_requests.lock().unwrap().push(body);
    let reply = state.play_replies.lock().unwrap().pop_front();
    respond(reply).await
}

async fn respond(reply: Option<Reply>) -> Response {
    let reply = reply.unwrap_or_else(|| Reply::json(500, json!({ "error": "no scripted reply" })));
    tokio::time::sleep(reply.delay).await;
    let status = StatusCode::from_u16(reply.status).expect("Invalid scripted status");
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiCall {
    Session(SessionSnapshot),
    SpinEnabled(bool),
    Reels(GameKind),
    Outcome(WagerOutcome),
    ReelsStopped,
    Notification(Notification),
    NotificationCleared,
}

#[derive(Clone, Default)]
pub struct RecordingPresenter {
    calls: Arc<Mutex<Vec<UiCall>>>,
}

impl RecordingPresenter {
    pub fn calls(&self) -> Vec<UiCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                UiCall::Notification(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: UiCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Presenter for RecordingPresenter {
    fn render_session(&mut self, snapshot: &SessionSnapshot) {
        self.push(UiCall::Session(snapshot.clone()));
    }

    fn set_spin_enabled(&mut self, enabled: bool) {
        self.push(UiCall::SpinEnabled(enabled));
    }

    fn start_reels(&mut self, game: GameKind) {
        self.push(UiCall::Reels(game));
    }

    fn show_outcome(&mut self, outcome: &WagerOutcome) {
        self.push(UiCall::Outcome(outcome.clone()));
    }

    fn stop_reels(&mut self) {
        self.push(UiCall::ReelsStopped);
    }

    fn show_notification(&mut self, notification: &Notification) {
        self.push(UiCall::Notification(notification.clone()));
    }

    fn clear_notification(&mut self) {
        self.push(UiCall::NotificationCleared);
    }
}

/// Short timings so real-time tests stay fast
pub fn fast_config() -> ControllerConfig {
    ControllerConfig {
        min_animation_ms: 150,
        settlement_timeout_ms: 1_000,
        notification_ms: 3_000,
        bootstrap_max_retries: 0,
        ..ControllerConfig::default()
    }
}

pub struct TestContext {
    pub stub: StubAuthority,
    pub ui: RecordingPresenter,
    pub controller: WagerController<RecordingPresenter>,
    pub events: mpsc::Receiver<ControllerEvent>,
}

impl TestContext {
    pub async fn new(init: Vec<Reply>, play: Vec<Reply>, config: ControllerConfig) -> Self {
        let stub = StubAuthority::start(init, play).await;
        let api = Arc::new(stub.client(Duration::from_secs(5)));
        let ui = RecordingPresenter::default();
        let (tx, events) = controller::channel();
        let controller = WagerController::new(
            api,
            ui.clone(),
            Some(Credential::new(INIT_DATA).expect("valid credential")),
            config,
            tx,
        );

        Self {
            stub,
            ui,
            controller,
            events,
        }
    }

    /// Process events until the in-flight wager has been resolved
    pub async fn settle(&mut self) {
        let wait = tokio::time::timeout(Duration::from_secs(10), async {
            while let Some(event) = self.events.recv().await {
                let done = matches!(event, ControllerEvent::WagerResolved { .. });
                self.controller.handle(event);
                if done {
                    break;
                }
            }
        });
        wait.await.expect("Wager never resolved");
    }
}
