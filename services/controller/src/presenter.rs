//! Presentation seam
//!
//! The controller pushes renderable state out through `Presenter`; it never
//! reads anything back from the view.

use shared::{GameKind, CURRENCY};
use tracing::info;

use crate::balance_store::SessionSnapshot;
use crate::domain::{Notification, Severity, WagerOutcome};

pub trait Presenter: Send {
    /// Balance and statistics fields
    fn render_session(&mut self, snapshot: &SessionSnapshot);

    /// Enable or disable the spin trigger
    fn set_spin_enabled(&mut self, enabled: bool);

    /// Start the reel animation for a submitted wager
    fn start_reels(&mut self, game: GameKind);

    /// Land the reels on the settled outcome
    fn show_outcome(&mut self, outcome: &WagerOutcome);

    /// Abort the animation after a failed wager
    fn stop_reels(&mut self);

    fn show_notification(&mut self, notification: &Notification);

    fn clear_notification(&mut self);
}

/// Renders state as log lines; used by the terminal driver
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn render_session(&mut self, snapshot: &SessionSnapshot) {
        info!(
            balance = %snapshot.balance,
            currency = CURRENCY,
            games = snapshot.stats.games_played,
            total_bet = %snapshot.stats.total_bet,
            total_win = %snapshot.stats.total_win,
            username = snapshot.username.as_deref().unwrap_or("-"),
            "Balance"
        );
    }

    fn set_spin_enabled(&mut self, enabled: bool) {
        info!(enabled, "Spin button");
    }

    fn start_reels(&mut self, game: GameKind) {
        info!(game = %game, "Reels spinning");
    }

    fn show_outcome(&mut self, outcome: &WagerOutcome) {
        match outcome.roulette_number {
            Some(number) => info!(
                number,
                color = outcome.roulette_color.as_deref().unwrap_or("-"),
                win = %outcome.win_amount,
                "Wheel stopped"
            ),
            None => info!(
                reels = %outcome.reel_faces.join(" | "),
                win = %outcome.win_amount,
                "Reels stopped"
            ),
        }
    }

    fn stop_reels(&mut self) {
        info!("Reels stopped without result");
    }

    fn show_notification(&mut self, notification: &Notification) {
        match notification.severity {
            Severity::Error => tracing::warn!(text = %notification.text, "Notification"),
            Severity::Info | Severity::Success => {
                info!(text = %notification.text, "Notification")
            }
        }
    }

    fn clear_notification(&mut self) {
        tracing::debug!("Notification dismissed");
    }
}
