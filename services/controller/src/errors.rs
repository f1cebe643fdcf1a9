use shared::errors::{ErrorCategory, ServiceError};
use shared::Amount;

/// Handshake failed; the session stays as it was
#[derive(Debug, Clone, thiserror::Error)]
#[error("Bootstrap failed: {reason}")]
pub struct BootstrapError {
    pub reason: ServiceError,
}

impl From<ServiceError> for BootstrapError {
    fn from(reason: ServiceError) -> Self {
        Self { reason }
    }
}

/// A wager was refused locally before anything was sent
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreconditionRejection {
    #[error("Wager already in flight")]
    InFlight,

    #[error("Insufficient funds: bet {required}, balance {available}")]
    InsufficientFunds { required: Amount, available: Amount },

    #[error("Session not initialized")]
    NoSession,
}

impl PreconditionRejection {
    pub fn to_service_error(&self) -> ServiceError {
        match self {
            PreconditionRejection::InFlight => ServiceError::wager_in_flight(),
            PreconditionRejection::InsufficientFunds { required, available } => {
                ServiceError::insufficient_funds(required, available)
            }
            PreconditionRejection::NoSession => ServiceError::no_session(),
        }
    }

    /// In-flight rejections are a silent no-op; the trigger should have
    /// been disabled.
    pub fn notifies_user(&self) -> bool {
        !matches!(self, PreconditionRejection::InFlight)
    }
}

/// A submitted wager did not settle
#[derive(Debug, Clone, thiserror::Error)]
pub enum SettlementError {
    #[error("Transport failure: {0}")]
    Transport(ServiceError),

    #[error("Rejected by server: {0}")]
    Rejected(ServiceError),

    #[error("Timed out: {0}")]
    Timeout(ServiceError),

    #[error("Malformed response: {0}")]
    Malformed(ServiceError),
}

impl SettlementError {
    pub fn service_error(&self) -> &ServiceError {
        match self {
            SettlementError::Transport(e)
            | SettlementError::Rejected(e)
            | SettlementError::Timeout(e)
            | SettlementError::Malformed(e) => e,
        }
    }
}

impl From<ServiceError> for SettlementError {
    fn from(error: ServiceError) -> Self {
        match error.category {
            ErrorCategory::Timeout => SettlementError::Timeout(error),
            ErrorCategory::Network => SettlementError::Transport(error),
            ErrorCategory::Protocol => SettlementError::Malformed(error),
            ErrorCategory::Application
            | ErrorCategory::Validation
            | ErrorCategory::Precondition => SettlementError::Rejected(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_settlement_error_classification() {
        assert!(matches!(
            SettlementError::from(ServiceError::timeout(Duration::from_secs(1))),
            SettlementError::Timeout(_)
        ));
        assert!(matches!(
            SettlementError::from(ServiceError::transport("connection refused")),
            SettlementError::Transport(_)
        ));
        assert!(matches!(
            SettlementError::from(ServiceError::rejected(None)),
            SettlementError::Rejected(_)
        ));
        assert!(matches!(
            SettlementError::from(ServiceError::malformed_response("eof")),
            SettlementError::Malformed(_)
        ));
    }

    #[test]
    fn test_in_flight_is_silent() {
        assert!(!PreconditionRejection::InFlight.notifies_user());
        assert!(PreconditionRejection::NoSession.notifies_user());
        let rejection = PreconditionRejection::InsufficientFunds {
            required: Amount::new(5.0).unwrap(),
            available: Amount::new(3.0).unwrap(),
        };
        assert_eq!(rejection.to_service_error().user_message(), "Insufficient funds");
    }
}
