//! Wager Session Controller
//!
//! The state machine that sequences a play:
//!
//! ```text
//! Idle -> Submitting -> Animating -> Settling -> Idle
//!                  \          \
//!                   +----------+-> Failed -> Idle
//! ```
//!
//! All mutable state is owned by the controller and only touched from its
//! event loop. Pending work (the settlement call joined with the minimum
//! animation delay, notification timers, refreshes) runs in spawned tasks
//! that post their results back as `ControllerEvent`s.

use std::sync::Arc;
use std::time::Duration;

use shared::errors::{ErrorCategory, ServiceError};
use shared::{Amount, Credential, GameKind, EVENT_CHANNEL_CAPACITY};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::balance_store::{BalanceStore, SessionSnapshot};
use crate::bet_selection::BetSelection;
use crate::bootstrap::bootstrap;
use crate::config::ControllerConfig;
use crate::domain::{Notification, Session, WagerOutcome, WagerRequest};
use crate::errors::{BootstrapError, PreconditionRejection, SettlementError};
use crate::notifications::NotificationQueue;
use crate::presenter::Presenter;
use crate::retry_strategy::RetryStrategy;
use crate::settlement_client::SettlementApi;

/// Everything the controller reacts to, user input and completions alike
#[derive(Debug)]
pub enum ControllerEvent {
    SelectBet(f64),
    SelectGame(GameKind),
    Spin,
    Refresh,
    WagerResolved {
        wager_id: Uuid,
        result: Result<WagerOutcome, SettlementError>,
    },
    SessionLoaded {
        /// Session epoch when the refresh was dispatched
        epoch: u64,
        result: Result<Session, BootstrapError>,
    },
    DismissNotification {
        generation: u64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WagerState {
    Idle,
    Submitting,
    Animating,
    Settling,
    Failed,
}

/// "A wager is in flight for this controller."
///
/// Single source of truth for in-flight status; the spin button state is
/// derived from it, never the other way around.
#[derive(Debug, Default)]
pub struct SpinLock {
    held: bool,
}

impl SpinLock {
    fn try_acquire(&mut self) -> bool {
        if self.held {
            return false;
        }
        self.held = true;
        true
    }

    fn release(&mut self) {
        self.held = false;
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

pub fn channel() -> (mpsc::Sender<ControllerEvent>, mpsc::Receiver<ControllerEvent>) {
    mpsc::channel(EVENT_CHANNEL_CAPACITY)
}

/// Synchronous spin preconditions, checked before anything is sent
pub fn check_preconditions(
    lock_held: bool,
    balance: Option<Amount>,
    bet: Amount,
) -> Result<(), PreconditionRejection> {
    if lock_held {
        return Err(PreconditionRejection::InFlight);
    }
    let available = balance.ok_or(PreconditionRejection::NoSession)?;
    if available < bet {
        return Err(PreconditionRejection::InsufficientFunds {
            required: bet,
            available,
        });
    }
    Ok(())
}

/// Send the wager and hold the result until the minimum animation window
/// has elapsed. Failures are returned as soon as they are known.
pub async fn settle_with_animation(
    api: &dyn SettlementApi,
    request: &WagerRequest,
    min_animation: Duration,
    timeout: Duration,
) -> Result<WagerOutcome, SettlementError> {
    let animation = async {
        tokio::time::sleep(min_animation).await;
        Ok::<(), SettlementError>(())
    };
    let settlement = async {
        match tokio::time::timeout(timeout, api.play(request)).await {
            Ok(result) => result.map_err(SettlementError::from),
            Err(_) => Err(SettlementError::Timeout(ServiceError::timeout(timeout))),
        }
    };

    let ((), outcome) = futures::future::try_join(animation, settlement).await?;
    Ok(outcome)
}

struct InFlight {
    request: WagerRequest,
    submitted_at: Instant,
}

pub struct WagerController<P: Presenter> {
    api: Arc<dyn SettlementApi>,
    presenter: P,
    store: BalanceStore,
    selection: BetSelection,
    notifications: NotificationQueue,
    state: WagerState,
    spin_lock: SpinLock,
    in_flight: Option<InFlight>,
    /// Bumped on every settlement commit; refreshes dispatched before the
    /// latest commit carry an older snapshot and are dropped
    session_epoch: u64,
    refresh_pending: bool,
    credential: Option<Credential>,
    config: ControllerConfig,
    retry: RetryStrategy,
    events: mpsc::Sender<ControllerEvent>,
}

impl<P: Presenter> WagerController<P> {
    pub fn new(
        api: Arc<dyn SettlementApi>,
        presenter: P,
        credential: Option<Credential>,
        config: ControllerConfig,
        events: mpsc::Sender<ControllerEvent>,
    ) -> Self {
        Self {
            api,
            presenter,
            store: BalanceStore::new(),
            selection: BetSelection::with_default_amount(config.default_bet),
            notifications: NotificationQueue::new(config.notification_ttl()),
            state: WagerState::Idle,
            spin_lock: SpinLock::default(),
            in_flight: None,
            session_epoch: 0,
            refresh_pending: false,
            credential,
            retry: RetryStrategy::new(config.bootstrap_max_retries),
            config,
            events,
        }
    }

    pub fn state(&self) -> WagerState {
        self.state
    }

    pub fn spin_lock(&self) -> &SpinLock {
        &self.spin_lock
    }

    pub fn selection(&self) -> &BetSelection {
        &self.selection
    }

    pub fn balance(&self) -> Option<Amount> {
        self.store.balance()
    }

    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.store.snapshot()
    }

    pub fn visible_notification(&self) -> Option<&Notification> {
        self.notifications.visible()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Drive the controller until `shutdown` fires
    pub async fn run(
        mut self,
        mut events: mpsc::Receiver<ControllerEvent>,
        shutdown: CancellationToken,
    ) -> Self {
        info!("Controller event loop started");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = events.recv() => match event {
                    Some(event) => self.handle(event),
                    None => break,
                },
            }
        }
        if self.spin_lock.is_held() {
            warn!("Controller stopped with a wager in flight; its result will not be applied");
        }
        info!("Controller event loop stopped");
        self
    }

    pub fn handle(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::SelectBet(amount) => self.select_bet(amount),
            ControllerEvent::SelectGame(game) => self.select_game(game),
            ControllerEvent::Spin => {
                let _ = self.spin();
            }
            ControllerEvent::Refresh => self.refresh(),
            ControllerEvent::WagerResolved { wager_id, result } => {
                self.on_wager_resolved(wager_id, result)
            }
            ControllerEvent::SessionLoaded { epoch, result } => {
                self.on_session_loaded(epoch, result)
            }
            ControllerEvent::DismissNotification { generation } => {
                if self.notifications.dismiss(generation) {
                    self.presenter.clear_notification();
                }
            }
        }
    }

    /// Run the handshake inline; used once at startup
    pub async fn bootstrap(&mut self) -> Result<(), BootstrapError> {
        let result = bootstrap(self.api.as_ref(), self.credential.as_ref(), &self.retry).await;
        self.apply_session(result)
    }

    /// Re-run the handshake off the event loop (pull-to-refresh)
    pub fn refresh(&self) {
        let epoch = self.session_epoch;
        let api = self.api.clone();
        let credential = self.credential.clone();
        let retry = self.retry.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = bootstrap(api.as_ref(), credential.as_ref(), &retry).await;
            if events
                .send(ControllerEvent::SessionLoaded { epoch, result })
                .await
                .is_err()
            {
                debug!("Controller gone, dropping refreshed session");
            }
        });
    }

    fn on_session_loaded(&mut self, epoch: u64, result: Result<Session, BootstrapError>) {
        if self.spin_lock.is_held() {
            // the snapshot may or may not include the in-flight wager
            debug!(epoch, "Refresh landed during a wager, deferring");
            self.refresh_pending = true;
            return;
        }
        if epoch < self.session_epoch {
            debug!(
                epoch,
                current = self.session_epoch,
                "Dropping refresh dispatched before the last settlement"
            );
            return;
        }
        let _ = self.apply_session(result);
    }

    fn apply_session(&mut self, result: Result<Session, BootstrapError>) -> Result<(), BootstrapError> {
        match result {
            Ok(session) => {
                self.store.replace(session);
                if let Some(snapshot) = self.store.snapshot() {
                    self.presenter.render_session(&snapshot);
                }
                Ok(())
            }
            Err(e) => {
                // a failed refresh keeps the previous snapshot
                warn!(
                    error = %e.reason,
                    has_session = self.store.is_ready(),
                    "Session bootstrap failed"
                );
                self.notify(Notification::error(e.reason.user_message()));
                Err(e)
            }
        }
    }

    pub fn select_bet(&mut self, amount: f64) {
        match self.selection.select(amount) {
            Ok(amount) => debug!(amount = %amount, "Bet selected"),
            Err(e) => {
                warn!(error = %e, "Bet selection rejected");
                self.notify(Notification::error(e.user_message()));
            }
        }
    }

    pub fn select_game(&mut self, game: GameKind) {
        debug!(game = %game, "Game selected");
        self.selection.select_game(game);
    }

    /// Idle -> Submitting -> Animating, or a local rejection.
    pub fn spin(&mut self) -> Result<Uuid, PreconditionRejection> {
        let amount = self.selection.amount();
        let session = self
            .store
            .session()
            .map(|s| (s.balance, s.credential.clone()));

        let checked = check_preconditions(
            self.spin_lock.is_held(),
            session.as_ref().map(|(balance, _)| *balance),
            amount,
        );
        let credential = match (checked, session) {
            (Ok(()), Some((_, credential))) => credential,
            (Err(rejection), _) => return Err(self.reject(rejection)),
            (Ok(()), None) => return Err(self.reject(PreconditionRejection::NoSession)),
        };

        if !self.spin_lock.try_acquire() {
            return Err(PreconditionRejection::InFlight);
        }
        self.transition(WagerState::Submitting);
        self.presenter.set_spin_enabled(false);

        let request = WagerRequest::new(credential, self.selection.game(), amount);
        let wager_id = request.id;
        info!(
            wager_id = %wager_id,
            game = %request.game,
            amount = %request.amount,
            "Submitting wager"
        );
        metrics::counter!("wagers_submitted_total").increment(1);
        self.dispatch(&request);

        self.transition(WagerState::Animating);
        self.presenter.start_reels(request.game);
        self.in_flight = Some(InFlight {
            request,
            submitted_at: Instant::now(),
        });

        Ok(wager_id)
    }

    fn reject(&mut self, rejection: PreconditionRejection) -> PreconditionRejection {
        metrics::counter!("spins_rejected_total").increment(1);
        if rejection.notifies_user() {
            info!(reason = %rejection, "Spin rejected");
            self.notify(Notification::error(rejection.to_service_error().user_message()));
        } else {
            debug!("Spin ignored, wager already in flight");
        }
        rejection
    }

    fn dispatch(&self, request: &WagerRequest) {
        let api = self.api.clone();
        let events = self.events.clone();
        let request = request.clone();
        let min_animation = self.config.min_animation();
        let timeout = self.config.settlement_timeout();

        tokio::spawn(async move {
            let result = settle_with_animation(api.as_ref(), &request, min_animation, timeout).await;
            let event = ControllerEvent::WagerResolved {
                wager_id: request.id,
                result,
            };
            if events.send(event).await.is_err() {
                debug!(wager_id = %request.id, "Controller gone, dropping wager result");
            }
        });
    }

    fn on_wager_resolved(&mut self, wager_id: Uuid, result: Result<WagerOutcome, SettlementError>) {
        let matches = self
            .in_flight
            .as_ref()
            .is_some_and(|f| f.request.id == wager_id);
        if !matches {
            warn!(wager_id = %wager_id, "Result for a wager that is not in flight, ignoring");
            return;
        }
        let Some(InFlight { request, submitted_at }) = self.in_flight.take() else {
            return;
        };
        metrics::histogram!("settlement_latency_seconds")
            .record(submitted_at.elapsed().as_secs_f64());

        match result {
            Ok(outcome) => {
                self.transition(WagerState::Settling);
                self.store.apply_settlement(&request, &outcome);
                self.session_epoch += 1;
                self.presenter.show_outcome(&outcome);
                if let Some(snapshot) = self.store.snapshot() {
                    self.presenter.render_session(&snapshot);
                }
                info!(
                    wager_id = %wager_id,
                    is_win = outcome.is_win,
                    win_amount = %outcome.win_amount,
                    new_balance = %outcome.new_balance,
                    "Wager settled"
                );
                metrics::counter!("wagers_settled_total").increment(1);
                self.notify(outcome.notification(request.amount));
            }
            Err(failure) => {
                self.transition(WagerState::Failed);
                self.presenter.stop_reels();
                let reason = failure.service_error();
                log_failure(wager_id, reason);
                metrics::counter!("wagers_failed_total").increment(1);
                self.notify(Notification::error(reason.user_message()));
            }
        }

        self.spin_lock.release();
        self.transition(WagerState::Idle);
        self.presenter.set_spin_enabled(true);

        if std::mem::take(&mut self.refresh_pending) {
            self.refresh();
        }
    }

    fn notify(&mut self, notification: Notification) {
        self.presenter.show_notification(&notification);
        let ticket = self.notifications.enqueue(notification);
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::time::sleep(ticket.ttl).await;
            let _ = events
                .send(ControllerEvent::DismissNotification {
                    generation: ticket.generation,
                })
                .await;
        });
    }

    fn transition(&mut self, next: WagerState) {
        debug!(from = ?self.state, to = ?next, "Wager state transition");
        self.state = next;
    }
}

fn log_failure(wager_id: Uuid, reason: &ServiceError) {
    match reason.category.log_level() {
        "error" => error!(wager_id = %wager_id, error = %reason, "Wager failed"),
        "warn" => warn!(wager_id = %wager_id, error = %reason, "Wager failed"),
        _ => info!(wager_id = %wager_id, error = %reason, "Wager failed"),
    }
    if reason.category == ErrorCategory::Timeout {
        // the authority may still settle it; the next refresh shows the truth
        warn!(wager_id = %wager_id, "Stopped waiting for settlement");
    }
}
