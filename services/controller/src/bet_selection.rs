use shared::errors::ServiceError;
use shared::{Amount, GameKind, ValidationError, ALLOWED_BET_AMOUNTS, DEFAULT_BET_AMOUNT};

/// Bet amount and game picked by the player, read at spin time.
///
/// Only membership in the offered denominations is checked here;
/// affordability is the controller's concern.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetSelection {
    amount: Amount,
    game: GameKind,
}

impl Default for BetSelection {
    fn default() -> Self {
        Self {
            amount: Amount::new(DEFAULT_BET_AMOUNT).unwrap_or(Amount::ZERO),
            game: GameKind::default(),
        }
    }
}

impl BetSelection {
    /// Start from a configured default bet, falling back to the built-in
    /// one when it is not an offered denomination.
    pub fn with_default_amount(amount: f64) -> Self {
        let mut selection = Self::default();
        if selection.select(amount).is_err() {
            tracing::warn!(amount, "Configured default bet is not offered, using built-in default");
        }
        selection
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn game(&self) -> GameKind {
        self.game
    }

    pub fn offered_amounts() -> &'static [f64] {
        &ALLOWED_BET_AMOUNTS
    }

    pub fn select(&mut self, amount: f64) -> Result<Amount, ServiceError> {
        let amount = Amount::new(amount).map_err(ServiceError::invalid_amount)?;
        if !amount.is_offered_bet() {
            return Err(ServiceError::invalid_amount(ValidationError::UnsupportedDenomination {
                amount: amount.as_f64(),
            }));
        }
        self.amount = amount;
        Ok(amount)
    }

    pub fn select_game(&mut self, game: GameKind) {
        self.game = game;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let selection = BetSelection::default();
        assert_eq!(selection.amount().as_f64(), 5.0);
        assert_eq!(selection.game(), GameKind::Slots);
    }

    #[test]
    fn test_select_offered_amount() {
        let mut selection = BetSelection::default();
        for amount in BetSelection::offered_amounts() {
            assert_eq!(selection.select(*amount).unwrap().as_f64(), *amount);
        }
    }

    #[test]
    fn test_select_rejects_unknown_denomination() {
        let mut selection = BetSelection::default();
        let error = selection.select(7.0).unwrap_err();
        assert_eq!(error.code, "VALIDATION_INVALID_AMOUNT");
        assert!(selection.select(-5.0).is_err());
        assert!(selection.select(f64::NAN).is_err());
        assert_eq!(selection.amount().as_f64(), 5.0);
    }

    #[test]
    fn test_configured_default() {
        assert_eq!(BetSelection::with_default_amount(10.0).amount().as_f64(), 10.0);
        assert_eq!(BetSelection::with_default_amount(3.0).amount().as_f64(), 5.0);
    }

    #[test]
    fn test_select_game() {
        let mut selection = BetSelection::default();
        selection.select_game(GameKind::Roulette);
        assert_eq!(selection.game(), GameKind::Roulette);
    }
}
