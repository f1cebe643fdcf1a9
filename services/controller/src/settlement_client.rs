//! HTTP client for the remote settlement authority
//!
//! Two endpoints: the session handshake and the play/settle call. Every
//! failure comes back as a categorized `ServiceError`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::errors::{Result, ServiceError};
use shared::{Credential, INIT_PATH, PLAY_PATH};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::domain::{InitRequest, InitResponse, PlayResponse, Session, WagerOutcome, WagerRequest};

/// Request/response contract of the settlement authority
#[async_trait]
pub trait SettlementApi: Send + Sync {
    /// Exchange the host credential for a fresh session snapshot
    async fn handshake(&self, credential: &Credential) -> Result<Session>;

    /// Submit one wager and wait for its authoritative outcome
    async fn play(&self, request: &WagerRequest) -> Result<WagerOutcome>;
}

#[derive(Clone)]
pub struct HttpSettlementClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpSettlementClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .build()
            .map_err(ServiceError::transport)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON body. `timeout` bounds the whole request; without one
    /// only the connect phase is bounded.
    async fn post_json<B, R>(&self, path: &str, body: &B, timeout: Option<Duration>) -> Result<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "POST to settlement authority");

        let mut request = self.http.post(&url).json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }
        let response = request.send().await.map_err(|e| self.classify(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;

        if status.is_server_error() {
            warn!(url = %url, status = status.as_u16(), "Settlement authority returned server error");
            return Err(ServiceError::http_status(status.as_u16())
                .with_context(String::from_utf8_lossy(&bytes).into_owned()));
        }

        // 4xx bodies are `{ "error": ... }` and parse as a non-success reply
        match serde_json::from_slice::<R>(&bytes) {
            Ok(parsed) => Ok(parsed),
            Err(e) if status.is_success() => Err(ServiceError::malformed_response(e)),
            Err(_) => Err(ServiceError::http_status(status.as_u16())),
        }
    }

    fn classify(&self, error: reqwest::Error) -> ServiceError {
        if error.is_timeout() {
            ServiceError::timeout(self.timeout)
        } else if error.is_decode() {
            ServiceError::malformed_response(error)
        } else {
            ServiceError::transport(error)
        }
    }
}

#[async_trait]
impl SettlementApi for HttpSettlementClient {
    async fn handshake(&self, credential: &Credential) -> Result<Session> {
        let response: InitResponse = self
            .post_json(INIT_PATH, &InitRequest { init_data: credential }, Some(self.timeout))
            .await?;

        response.into_session(credential.clone())
    }

    /// Bounded by the caller's settlement timeout, not the client timeout
    async fn play(&self, request: &WagerRequest) -> Result<WagerOutcome> {
        let started = Instant::now();
        let response: PlayResponse = self.post_json(PLAY_PATH, &request.to_wire(), None).await?;

        debug!(
            wager_id = %request.id,
            latency_ms = started.elapsed().as_millis() as u64,
            success = response.success,
            "Settlement response received"
        );

        response.into_outcome()
    }
}
