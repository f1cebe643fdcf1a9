use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::errors::ServiceError;
use shared::{Amount, Credential, GameKind, CURRENCY};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Wire format of the settlement authority
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct InitRequest<'a> {
    #[serde(rename = "initData")]
    pub init_data: &'a Credential,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatsPayload {
    #[serde(default)]
    pub games: u64,
    #[serde(default)]
    pub total_bet: Amount,
    #[serde(default)]
    pub total_win: Amount,
}

/// Body of `/api/webapp/init`. 4xx bodies carry only `error`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitResponse {
    #[serde(default)]
    pub success: bool,
    pub balance: Option<Amount>,
    pub username: Option<String>,
    pub stats: Option<StatsPayload>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlayRequest<'a> {
    #[serde(rename = "initData")]
    pub init_data: &'a Credential,
    #[serde(rename = "gameType")]
    pub game_type: GameKind,
    #[serde(rename = "betAmount")]
    pub bet_amount: Amount,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GameResultPayload {
    pub is_win: bool,
    pub win_amount: Amount,
    #[serde(default)]
    pub reels: Vec<String>,
    pub multiplier: Option<f64>,
    pub number: Option<u8>,
    pub color: Option<String>,
}

/// Body of `/api/game/play`. 4xx bodies carry only `error`.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayResponse {
    #[serde(default)]
    pub success: bool,
    pub result: Option<GameResultPayload>,
    pub new_balance: Option<Amount>,
    pub error: Option<String>,
}

impl InitResponse {
    /// Turn a handshake body into a session snapshot
    pub fn into_session(self, credential: Credential) -> Result<Session, ServiceError> {
        if !self.success {
            return Err(ServiceError::rejected(self.error));
        }
        let balance = self
            .balance
            .ok_or_else(|| ServiceError::malformed_response("handshake response without balance"))?;
        let stats = self.stats.unwrap_or_default();

        Ok(Session {
            credential,
            balance,
            username: self.username,
            stats: SessionStats {
                games_played: stats.games,
                total_bet: stats.total_bet,
                total_win: stats.total_win,
            },
            refreshed_at: Utc::now(),
        })
    }
}

impl PlayResponse {
    /// Turn a settlement body into an outcome; anything but a complete
    /// success is an error and must not touch the session.
    pub fn into_outcome(self) -> Result<WagerOutcome, ServiceError> {
        if !self.success {
            return Err(ServiceError::rejected(self.error));
        }
        let result = self
            .result
            .ok_or_else(|| ServiceError::malformed_response("settlement response without result"))?;
        let new_balance = self.new_balance.ok_or_else(|| {
            ServiceError::malformed_response("settlement response without new_balance")
        })?;

        Ok(WagerOutcome {
            is_win: result.is_win,
            win_amount: result.win_amount,
            reel_faces: result.reels,
            new_balance,
            multiplier: result.multiplier,
            roulette_number: result.number,
            roulette_color: result.color,
        })
    }
}

// ---------------------------------------------------------------------------
// Client-side domain
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionStats {
    pub games_played: u64,
    pub total_bet: Amount,
    pub total_win: Amount,
}

/// Last authoritative snapshot of the player's session
#[derive(Debug, Clone)]
pub struct Session {
    pub credential: Credential,
    pub balance: Amount,
    pub username: Option<String>,
    pub stats: SessionStats,
    pub refreshed_at: DateTime<Utc>,
}

/// One play, sent exactly once
#[derive(Debug, Clone)]
pub struct WagerRequest {
    /// Local correlation id, never sent on the wire
    pub id: Uuid,
    pub credential: Credential,
    pub game: GameKind,
    pub amount: Amount,
}

impl WagerRequest {
    pub fn new(credential: Credential, game: GameKind, amount: Amount) -> Self {
        Self {
            id: Uuid::new_v4(),
            credential,
            game,
            amount,
        }
    }

    pub fn to_wire(&self) -> PlayRequest<'_> {
        PlayRequest {
            init_data: &self.credential,
            game_type: self.game,
            bet_amount: self.amount,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WagerOutcome {
    pub is_win: bool,
    /// Gross payout for the wager (bet × multiplier)
    pub win_amount: Amount,
    pub reel_faces: Vec<String>,
    pub new_balance: Amount,
    pub multiplier: Option<f64>,
    pub roulette_number: Option<u8>,
    pub roulette_color: Option<String>,
}

impl WagerOutcome {
    /// Player-facing result line for a settled wager of `bet`. The sign
    /// follows the net amount; `is_win` only picks the severity.
    pub fn notification(&self, bet: Amount) -> Notification {
        let net = self.win_amount.delta(bet);
        let text = if net > 0.0 {
            format!("+{:.2} {}!", net, CURRENCY)
        } else {
            format!("-{:.2} {}", bet.delta(self.win_amount), CURRENCY)
        };
        if self.is_win {
            Notification::success(text)
        } else {
            Notification::error(text)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self { text: text.into(), severity: Severity::Info }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self { text: text.into(), severity: Severity::Success }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), severity: Severity::Error }
    }
}
