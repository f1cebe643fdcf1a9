//! Balance Store
//!
//! Holds the last authoritative session snapshot. The balance is only ever
//! replaced with a value the authority returned; it is never derived from
//! the bet and the payout.

use chrono::Utc;
use shared::Amount;

use crate::domain::{Session, SessionStats, WagerOutcome, WagerRequest};

/// Read-only view handed to the presenter
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub balance: Amount,
    pub stats: SessionStats,
    pub username: Option<String>,
}

#[derive(Debug, Default)]
pub struct BalanceStore {
    session: Option<Session>,
}

impl BalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn balance(&self) -> Option<Amount> {
        self.session.as_ref().map(|s| s.balance)
    }

    pub fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(|s| SessionSnapshot {
            balance: s.balance,
            stats: s.stats,
            username: s.username.clone(),
        })
    }

    /// Replace the whole session with a fresh handshake snapshot
    pub fn replace(&mut self, session: Session) {
        self.session = Some(session);
    }

    /// Commit a settled wager. Returns false when there is no session to
    /// update.
    pub fn apply_settlement(&mut self, request: &WagerRequest, outcome: &WagerOutcome) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };

        session.balance = outcome.new_balance;
        session.stats.games_played += 1;
        session.stats.total_bet = session.stats.total_bet.saturating_add(request.amount);
        session.stats.total_win = session.stats.total_win.saturating_add(outcome.win_amount);
        session.refreshed_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Credential, GameKind};

    fn session(balance: f64) -> Session {
        Session {
            credential: Credential::new("token").unwrap(),
            balance: Amount::new(balance).unwrap(),
            username: None,
            stats: SessionStats::default(),
            refreshed_at: Utc::now(),
        }
    }

    fn outcome(win: f64, new_balance: f64) -> WagerOutcome {
        WagerOutcome {
            is_win: win > 0.0,
            win_amount: Amount::new(win).unwrap(),
            reel_faces: vec!["7".into(), "7".into(), "7".into()],
            new_balance: Amount::new(new_balance).unwrap(),
            multiplier: None,
            roulette_number: None,
            roulette_color: None,
        }
    }

    #[test]
    fn test_empty_store() {
        let store = BalanceStore::new();
        assert!(!store.is_ready());
        assert_eq!(store.balance(), None);
        assert_eq!(store.snapshot(), None);
    }

    #[test]
    fn test_settlement_uses_server_balance_verbatim() {
        let mut store = BalanceStore::new();
        store.replace(session(10.0));
        let request = WagerRequest::new(
            Credential::new("token").unwrap(),
            GameKind::Slots,
            Amount::new(5.0).unwrap(),
        );

        // 10 - 5 + 8 would be 13; the server says 42 and wins
        assert!(store.apply_settlement(&request, &outcome(8.0, 42.0)));
        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.balance.as_f64(), 42.0);
        assert_eq!(snapshot.stats.games_played, 1);
        assert_eq!(snapshot.stats.total_bet.as_f64(), 5.0);
        assert_eq!(snapshot.stats.total_win.as_f64(), 8.0);
    }

    #[test]
    fn test_settlement_without_session_is_ignored() {
        let mut store = BalanceStore::new();
        let request = WagerRequest::new(
            Credential::new("token").unwrap(),
            GameKind::Roulette,
            Amount::new(1.0).unwrap(),
        );
        assert!(!store.apply_settlement(&request, &outcome(0.0, 0.0)));
        assert!(!store.is_ready());
    }

    #[test]
    fn test_replace_is_last_write_wins() {
        let mut store = BalanceStore::new();
        store.replace(session(10.0));
        store.replace(session(3.5));
        assert_eq!(store.balance().unwrap().as_f64(), 3.5);
    }
}
