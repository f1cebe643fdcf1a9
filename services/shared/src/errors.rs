/// Shared error types for the wager client
///
/// Design Philosophy:
/// - Standardized error codes for consistent handling across the client
/// - Categorized by error domain (Precondition, Network, Application, ...)
/// - Each category knows its log level and whether a retry may help
/// - Includes context fields for debugging (code, message, context)
///
/// Usage:
/// - The settlement client reports every failure as a ServiceError
/// - Controller errors wrap ServiceError and surface `user_message()`
/// - Error codes follow pattern: <CATEGORY>_<SPECIFIC>
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Error categories that drive logging severity and retry decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// Local input validation failed (bad denomination, empty credential)
    Validation,

    /// A local precondition of the wager flow did not hold
    Precondition,

    /// Transport failure or a 5xx from the authority
    Network,

    /// The client stopped waiting for a response
    Timeout,

    /// The authority answered and refused the request
    Application,

    /// The authority answered with something we cannot interpret
    Protocol,
}

impl ErrorCategory {
    /// Map error category to log level
    pub fn log_level(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "warn",
            ErrorCategory::Precondition => "info",
            ErrorCategory::Network => "error",
            ErrorCategory::Timeout => "error",
            ErrorCategory::Application => "warn",
            ErrorCategory::Protocol => "error",
        }
    }

    /// Whether repeating an idempotent request may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, ErrorCategory::Network | ErrorCategory::Timeout)
    }
}

/// Standard error codes used across the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    // Validation errors
    pub const VALIDATION_INVALID_AMOUNT: ErrorCode = ErrorCode("VALIDATION_INVALID_AMOUNT");
    pub const VALIDATION_EMPTY_CREDENTIAL: ErrorCode = ErrorCode("VALIDATION_EMPTY_CREDENTIAL");

    // Precondition errors
    pub const PRECONDITION_INSUFFICIENT_FUNDS: ErrorCode =
        ErrorCode("PRECONDITION_INSUFFICIENT_FUNDS");
    pub const PRECONDITION_WAGER_IN_FLIGHT: ErrorCode = ErrorCode("PRECONDITION_WAGER_IN_FLIGHT");
    pub const PRECONDITION_NO_SESSION: ErrorCode = ErrorCode("PRECONDITION_NO_SESSION");

    // Network errors
    pub const NETWORK_TRANSPORT: ErrorCode = ErrorCode("NETWORK_TRANSPORT");
    pub const NETWORK_HTTP_STATUS: ErrorCode = ErrorCode("NETWORK_HTTP_STATUS");
    pub const NETWORK_TIMEOUT: ErrorCode = ErrorCode("NETWORK_TIMEOUT");

    // Application errors
    pub const APPLICATION_REJECTED: ErrorCode = ErrorCode("APPLICATION_REJECTED");

    // Protocol errors
    pub const PROTOCOL_MALFORMED_RESPONSE: ErrorCode = ErrorCode("PROTOCOL_MALFORMED_RESPONSE");

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Standardized error structure used across the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Error category (determines log level and retryability)
    pub category: ErrorCategory,

    /// Structured error code
    pub code: String,

    /// Human-readable error message, suitable for a notification
    pub message: String,

    /// Optional additional context (status codes, parser errors)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl ServiceError {
    /// Create a new ServiceError
    pub fn new(category: ErrorCategory, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            category,
            code: code.as_str().to_string(),
            message: message.into(),
            context: None,
        }
    }

    /// Add context to an error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    // Validation error constructors
    pub fn invalid_amount(reason: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::Validation,
            ErrorCode::VALIDATION_INVALID_AMOUNT,
            "Invalid bet amount",
        )
        .with_context(reason.to_string())
    }

    pub fn empty_credential() -> Self {
        Self::new(
            ErrorCategory::Validation,
            ErrorCode::VALIDATION_EMPTY_CREDENTIAL,
            "Missing session credential",
        )
    }

    // Precondition error constructors
    pub fn insufficient_funds(required: impl fmt::Display, available: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::Precondition,
            ErrorCode::PRECONDITION_INSUFFICIENT_FUNDS,
            "Insufficient funds",
        )
        .with_context(format!("required: {}, available: {}", required, available))
    }

    pub fn wager_in_flight() -> Self {
        Self::new(
            ErrorCategory::Precondition,
            ErrorCode::PRECONDITION_WAGER_IN_FLIGHT,
            "A wager is already in progress",
        )
    }

    pub fn no_session() -> Self {
        Self::new(
            ErrorCategory::Precondition,
            ErrorCode::PRECONDITION_NO_SESSION,
            "Session not initialized",
        )
    }

    // Network error constructors
    pub fn transport(error: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::Network,
            ErrorCode::NETWORK_TRANSPORT,
            "Connection error",
        )
        .with_context(error.to_string())
    }

    pub fn http_status(status: u16) -> Self {
        let category = if status >= 500 {
            ErrorCategory::Network
        } else {
            ErrorCategory::Application
        };
        Self::new(category, ErrorCode::NETWORK_HTTP_STATUS, "Server error")
            .with_context(format!("status: {}", status))
    }

    pub fn timeout(waited: Duration) -> Self {
        Self::new(
            ErrorCategory::Timeout,
            ErrorCode::NETWORK_TIMEOUT,
            "Server did not respond in time",
        )
        .with_context(format!("waited: {}ms", waited.as_millis()))
    }

    // Application error constructors
    pub fn rejected(reason: Option<String>) -> Self {
        let message = reason
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "Request was rejected".to_string());
        Self::new(
            ErrorCategory::Application,
            ErrorCode::APPLICATION_REJECTED,
            message,
        )
    }

    // Protocol error constructors
    pub fn malformed_response(error: impl fmt::Display) -> Self {
        Self::new(
            ErrorCategory::Protocol,
            ErrorCode::PROTOCOL_MALFORMED_RESPONSE,
            "Unexpected server response",
        )
        .with_context(error.to_string())
    }

    /// Text shown to the player
    pub fn user_message(&self) -> &str {
        &self.message
    }

    pub fn is_transient(&self) -> bool {
        self.category.is_transient()
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "[{}] {}: {}", self.code, self.message, context)
        } else {
            write!(f, "[{}] {}", self.code, self.message)
        }
    }
}

impl std::error::Error for ServiceError {}

// Convenience type alias
pub type Result<T> = std::result::Result<T, ServiceError>;
