/// Type-safe wrappers for domain primitives
///
/// These types enforce validation at construction time so the controller
/// never carries a negative balance, an unknown game or an empty credential.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Amount must be a finite, non-negative number: {0}")]
    InvalidAmount(f64),

    #[error("Bet amount {amount} is not an offered denomination")]
    UnsupportedDenomination { amount: f64 },

    #[error("Unknown game type: {0}")]
    UnknownGame(String),

    #[error("Credential is empty")]
    EmptyCredential,
}

/// Monetary amount in the session currency
///
/// The authority speaks plain JSON numbers, so the value is an `f64`;
/// construction rejects NaN, infinities and negatives.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Amount(f64);

impl Amount {
    pub const ZERO: Amount = Amount(0.0);

    pub fn new(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidAmount(value));
        }
        Ok(Self(value))
    }

    /// Get the raw value
    pub fn as_f64(&self) -> f64 {
        self.0
    }

    /// Signed difference `self - other`, for profit/loss display only
    pub fn delta(&self, other: Amount) -> f64 {
        self.0 - other.0
    }

    /// Sum of two amounts; both operands are already non-negative
    pub fn saturating_add(&self, other: Amount) -> Self {
        let sum = self.0 + other.0;
        if sum.is_finite() {
            Self(sum)
        } else {
            Self(f64::MAX)
        }
    }

    /// Whether this amount is one of the offered bet denominations
    pub fn is_offered_bet(&self) -> bool {
        ALLOWED_BET_AMOUNTS
            .iter()
            .any(|allowed| (allowed - self.0).abs() < f64::EPSILON)
    }
}

impl TryFrom<f64> for Amount {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for f64 {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Game variants served by the same wager state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameKind {
    #[default]
    Slots,
    Roulette,
}

impl GameKind {
    /// Wire name sent as `gameType`
    pub fn as_str(&self) -> &'static str {
        match self {
            GameKind::Slots => "slots",
            GameKind::Roulette => "roulette",
        }
    }
}

impl std::str::FromStr for GameKind {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slots" => Ok(GameKind::Slots),
            "roulette" => Ok(GameKind::Roulette),
            other => Err(ValidationError::UnknownGame(other.to_string())),
        }
    }
}

impl std::fmt::Display for GameKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque per-session credential issued by the host platform (`initData`)
///
/// The contents are never inspected; `Debug` is redacted so the token does
/// not end up in logs.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::EmptyCredential);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential(<{} bytes>)", self.0.len())
    }
}
