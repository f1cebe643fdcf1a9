use anyhow::Context;
use serde::Deserialize;
use std::env;
use std::time::Duration;

use shared::{
    BOOTSTRAP_MAX_RETRIES, DEFAULT_BET_AMOUNT, HTTP_TIMEOUT_MS, MIN_ANIMATION_MS,
    NOTIFICATION_DISPLAY_MS, SETTLEMENT_TIMEOUT_MS,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub controller: ControllerConfig,
    pub host: HostConfig,
    pub metrics_port: Option<u16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub http_timeout_ms: u64,
}

/// Timing and policy knobs of the wager state machine
#[derive(Debug, Clone, Deserialize)]
pub struct ControllerConfig {
    pub min_animation_ms: u64,
    pub settlement_timeout_ms: u64,
    pub notification_ms: u64,
    pub bootstrap_max_retries: u32,
    pub default_bet: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    pub init_data: Option<String>,
}

impl ApiConfig {
    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }
}

impl ControllerConfig {
    pub fn min_animation(&self) -> Duration {
        Duration::from_millis(self.min_animation_ms)
    }

    pub fn settlement_timeout(&self) -> Duration {
        Duration::from_millis(self.settlement_timeout_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            min_animation_ms: MIN_ANIMATION_MS,
            settlement_timeout_ms: SETTLEMENT_TIMEOUT_MS,
            notification_ms: NOTIFICATION_DISPLAY_MS,
            bootstrap_max_retries: BOOTSTRAP_MAX_RETRIES,
            default_bet: DEFAULT_BET_AMOUNT,
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Config {
            api: ApiConfig {
                base_url: env::var("WAGER_API_URL").context("WAGER_API_URL must be set")?,
                http_timeout_ms: env::var("WAGER_HTTP_TIMEOUT_MS")
                    .unwrap_or_else(|_| HTTP_TIMEOUT_MS.to_string())
                    .parse()
                    .context("WAGER_HTTP_TIMEOUT_MS")?,
            },
            controller: ControllerConfig {
                min_animation_ms: env::var("WAGER_ANIMATION_MS")
                    .unwrap_or_else(|_| MIN_ANIMATION_MS.to_string())
                    .parse()
                    .context("WAGER_ANIMATION_MS")?,
                settlement_timeout_ms: env::var("WAGER_SETTLEMENT_TIMEOUT_MS")
                    .unwrap_or_else(|_| SETTLEMENT_TIMEOUT_MS.to_string())
                    .parse()
                    .context("WAGER_SETTLEMENT_TIMEOUT_MS")?,
                notification_ms: env::var("WAGER_NOTIFICATION_MS")
                    .unwrap_or_else(|_| NOTIFICATION_DISPLAY_MS.to_string())
                    .parse()
                    .context("WAGER_NOTIFICATION_MS")?,
                bootstrap_max_retries: env::var("WAGER_BOOTSTRAP_RETRIES")
                    .unwrap_or_else(|_| BOOTSTRAP_MAX_RETRIES.to_string())
                    .parse()
                    .context("WAGER_BOOTSTRAP_RETRIES")?,
                default_bet: env::var("WAGER_DEFAULT_BET")
                    .unwrap_or_else(|_| DEFAULT_BET_AMOUNT.to_string())
                    .parse()
                    .context("WAGER_DEFAULT_BET")?,
            },
            host: HostConfig {
                init_data: env::var("WAGER_INIT_DATA").ok(),
            },
            metrics_port: env::var("METRICS_PORT")
                .ok()
                .map(|port| port.parse())
                .transpose()
                .context("METRICS_PORT")?,
        })
    }
}
