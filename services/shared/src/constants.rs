/// Shared constants for the wager client
///
/// This module centralizes the magic numbers of the wager flow so the
/// controller, its configuration defaults and the tests agree on them.

/// Bet denominations offered to the player.
///
/// The authority accepts bets in 0.1..=100; the client only offers this
/// fixed set and never takes free-form amounts.
pub const ALLOWED_BET_AMOUNTS: [f64; 6] = [1.0, 5.0, 10.0, 25.0, 50.0, 100.0];

/// Bet selected when a session starts
pub const DEFAULT_BET_AMOUNT: f64 = 5.0;

/// Currency label used in balance and notification text
pub const CURRENCY: &str = "USDT";

/// Minimum reel animation window in milliseconds
///
/// A settlement response that arrives sooner is held until this window
/// has elapsed.
pub const MIN_ANIMATION_MS: u64 = 1_500;

/// Upper bound on waiting for a settlement response in milliseconds
pub const SETTLEMENT_TIMEOUT_MS: u64 = 15_000;

/// How long a notification stays visible unless replaced
pub const NOTIFICATION_DISPLAY_MS: u64 = 3_000;

/// Per-request HTTP timeout in milliseconds
pub const HTTP_TIMEOUT_MS: u64 = 10_000;

/// Retries for the (idempotent) session handshake
pub const BOOTSTRAP_MAX_RETRIES: u32 = 2;

/// Base backoff delay in milliseconds for handshake retries
pub const RETRY_BACKOFF_BASE_MS: u64 = 500;

/// Maximum backoff delay in milliseconds for handshake retries
pub const RETRY_BACKOFF_MAX_MS: u64 = 5_000;

/// Capacity of the controller's event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Handshake endpoint path
pub const INIT_PATH: &str = "/api/webapp/init";

/// Settlement endpoint path
pub const PLAY_PATH: &str = "/api/game/play";
