//! Shared harness for the client tests
//!
//! Each test gets its own API server over the in-memory store, bound to an
//! ephemeral port, with a middleware that records every request it sees.

#![allow(dead_code)]

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use api::{repositories::memory::MemoryStore, revocation::RevocationList, state::AppState};
use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use common::models::ErrorBody;
use client::{ApiClient, App, ClientConfig, Prompter};
use tokio::net::TcpListener;

pub const ADMIN_PASSWORD: &str = "fantamatto2025";
const TOKEN_SECRET: &str = "client-test-secret-0123456789abcdef";

/// One request as the server saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    /// Path plus query string, if any
    pub uri: String,
    pub authorization: Option<String>,
}

impl Recorded {
    pub fn line(&self) -> String {
        format!("{} {}", self.method, self.uri)
    }

    pub fn has_bearer(&self) -> bool {
        self.authorization
            .as_deref()
            .is_some_and(|value| value.starts_with("Bearer ") && value.len() > "Bearer ".len())
    }
}

pub struct TestServer {
    pub config: ClientConfig,
    log: Arc<Mutex<Vec<Recorded>>>,
    failing: Arc<Mutex<HashSet<String>>>,
}

impl TestServer {
    pub async fn spawn() -> Self {
        let state = AppState {
            store: Arc::new(MemoryStore::new()),
            admin: api::admin_gate(ADMIN_PASSWORD, TOKEN_SECRET, 900, RevocationList::in_memory())
                .expect("admin gate"),
            max_photo_bytes: 64 * 1024,
        };

        let log = Arc::new(Mutex::new(Vec::new()));
        let failing = Arc::new(Mutex::new(HashSet::new()));
        let (recorder, faults) = (Arc::clone(&log), Arc::clone(&failing));
        let app = api::build_app(state).layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let (recorder, faults) = (Arc::clone(&recorder), Arc::clone(&faults));
                async move {
                    let recorded = Recorded {
                        method: req.method().to_string(),
                        uri: req
                            .uri()
                            .path_and_query()
                            .map(|pq| pq.as_str().to_string())
                            .unwrap_or_default(),
                        authorization: req
                            .headers()
                            .get(AUTHORIZATION)
                            .and_then(|value| value.to_str().ok())
                            .map(str::to_string),
                    };
                    let route = format!("{} {}", recorded.method, req.uri().path());
                    recorder.lock().unwrap().push(recorded);

                    if faults.lock().unwrap().contains(&route) {
                        let body = ErrorBody {
                            error: "down".to_string(),
                        };
                        let response: Response =
                            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response();
                        return response;
                    }
                    next.run(req).await
                }
            },
        ));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            config: ClientConfig::new(format!("http://{}", addr)),
            log,
            failing,
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.config)
    }

    pub fn app(&self) -> App<ScriptedPrompter> {
        App::new(&self.config, ScriptedPrompter::default())
    }

    /// Answer `route` (`"METHOD /path"`) with a 503 until [`Self::restore`]
    pub fn fail(&self, route: &str) {
        self.failing.lock().unwrap().insert(route.to_string());
    }

    pub fn restore(&self, route: &str) {
        self.failing.lock().unwrap().remove(route);
    }

    /// Every request served so far, as `"METHOD /path?query"`
    pub fn requests(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(Recorded::line).collect()
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.log.lock().unwrap().len()
    }

    /// Requests served after the first `since`
    pub fn requests_since(&self, since: usize) -> Vec<String> {
        self.log.lock().unwrap()[since..]
            .iter()
            .map(Recorded::line)
            .collect()
    }
}

/// Answers confirmations from a queue (`false` once it runs dry) and
/// remembers every question and notice
#[derive(Default)]
pub struct ScriptedPrompter {
    answers: Mutex<VecDeque<bool>>,
    questions: Mutex<Vec<String>>,
    alerts: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn answer(&self, answers: &[bool]) {
        self.answers.lock().unwrap().extend(answers);
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }

    pub fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&self, question: &str) -> bool {
        self.questions.lock().unwrap().push(question.to_string());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }

    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

/// Smallest JPEG header the server accepts as an image
pub fn jpeg() -> Vec<u8> {
    vec![0xff, 0xd8, 0xff, 0xe0, 0x00, 0x10]
}
