use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::{error, info};
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    models::{StudySession, Visibility},
    store::{PlannerSource, SessionStore},
};

use super::state::{FocusState, FALLBACK_SESSION_TITLE, MAX_DIAL_MINUTES};

struct Ticker {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Owns the focus-session lifecycle: duration configuration, the one-second
/// countdown, the in-session task list, and end-of-session finalization.
///
/// The controller is the sole mutator of [`FocusState`]; the UI layer calls
/// the named operations below and re-renders from the snapshots published on
/// the watch channel. Cheap to clone; clones share the same engine instance.
#[derive(Clone)]
pub struct FocusController {
    state: Arc<Mutex<FocusState>>,
    ticker: Arc<Mutex<Option<Ticker>>>,
    state_tx: watch::Sender<FocusState>,
    store: Arc<dyn SessionStore>,
    planner: Option<Arc<dyn PlannerSource>>,
    tick_interval: Duration,
}

impl FocusController {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (state_tx, _) = watch::channel(FocusState::new());
        Self {
            state: Arc::new(Mutex::new(FocusState::new())),
            ticker: Arc::new(Mutex::new(None)),
            state_tx,
            store,
            planner: None,
            tick_interval: Duration::from_secs(1),
        }
    }

    pub fn with_planner(mut self, planner: Arc<dyn PlannerSource>) -> Self {
        self.planner = Some(planner);
        self
    }

    pub async fn snapshot(&self) -> FocusState {
        self.state.lock().await.clone()
    }

    /// Observers (UI, notification collaborator) receive a whole-state clone
    /// after every mutation. The alarm collaborator watches `alarm_trigger`.
    pub fn subscribe(&self) -> watch::Receiver<FocusState> {
        self.state_tx.subscribe()
    }

    // --------------------
    // Duration configurator
    // --------------------

    /// Opens the duration dial seeded from the current total. Does not touch
    /// a running countdown.
    pub async fn open_duration_dialog(&self) {
        let mut guard = self.state.lock().await;
        guard.seed_temp_minutes();
        guard.show_duration_dialog = true;
        self.publish(&guard);
    }

    pub async fn close_duration_dialog(&self) {
        let mut guard = self.state.lock().await;
        guard.show_duration_dialog = false;
        self.publish(&guard);
    }

    pub async fn inc_temp_minutes(&self) {
        let mut guard = self.state.lock().await;
        guard.inc_temp_minutes();
        self.publish(&guard);
    }

    pub async fn dec_temp_minutes(&self) {
        let mut guard = self.state.lock().await;
        guard.dec_temp_minutes();
        self.publish(&guard);
    }

    /// Commits the dialed minutes. This is a hard reset, not a resume: any
    /// active countdown is cancelled and all session-scoped state (tasks,
    /// summary, modal flags, start timestamp) is cleared.
    pub async fn confirm_duration(&self) {
        self.cancel_ticker().await;
        let mut guard = self.state.lock().await;
        let minutes = guard.temp_minutes.min(MAX_DIAL_MINUTES);
        guard.reset_with_duration(minutes * 60);
        info!("Duration set to {minutes} min");
        self.publish(&guard);
    }

    /// Same reset-and-set as [`confirm_duration`](Self::confirm_duration) for
    /// the preset buttons, skipping the dialog.
    pub async fn quick_start(&self, minutes: u32) {
        self.cancel_ticker().await;
        let mut guard = self.state.lock().await;
        guard.reset_with_duration(minutes * 60);
        info!("Quick pick: {minutes} min");
        self.publish(&guard);
    }

    /// Mid-session +/- adjustment. Only valid once the session has started;
    /// additive and non-destructive, unlike the configurator resets.
    pub async fn adjust_remaining(&self, delta_minutes: i32) {
        let mut guard = self.state.lock().await;
        if guard.started_at_millis.is_none() {
            return;
        }
        guard.adjust_remaining(delta_minutes);
        self.publish(&guard);
    }

    // --------------------
    // Countdown scheduler
    // --------------------

    /// Starts (or resumes) the countdown. No-op when already running, when
    /// nothing remains, or while the summary screen is up. The start
    /// timestamp is recorded on the first call only.
    pub async fn start(&self) {
        {
            let mut guard = self.state.lock().await;
            if guard.is_running || guard.remaining_seconds == 0 || guard.show_summary {
                return;
            }
            if guard.started_at_millis.is_none() {
                guard.started_at_millis = Some(Utc::now().timestamp_millis());
            }
            guard.is_running = true;
            self.publish(&guard);
        }
        self.spawn_ticker().await;
        info!("Countdown running");
    }

    /// Stops the tick loop, preserving remaining time. The tick in flight may
    /// or may not land first; being off by one second is accepted slack.
    pub async fn pause(&self) {
        {
            let mut guard = self.state.lock().await;
            if !guard.is_running {
                return;
            }
            guard.is_running = false;
            self.publish(&guard);
        }
        self.cancel_ticker().await;
        info!("Countdown paused");
    }

    pub async fn resume(&self) {
        self.start().await;
    }

    /// Spawns the one-second tick loop. At most one loop is live per engine;
    /// a prior instance is cancelled before the replacement starts.
    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(ticker) = ticker_guard.take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }

        let state = Arc::clone(&self.state);
        let state_tx = self.state_tx.clone();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            loop {
                {
                    let guard = state.lock().await;
                    if !guard.is_running || guard.remaining_seconds == 0 {
                        break;
                    }
                }

                tokio::select! {
                    _ = token.cancelled() => return,
                    _ = time::sleep(tick_interval) => {}
                }

                let mut guard = state.lock().await;
                guard.remaining_seconds = guard.remaining_seconds.saturating_sub(1);
                let _ = state_tx.send(guard.clone());
            }

            let mut guard = state.lock().await;
            if guard.remaining_seconds == 0 && guard.started_at_millis.is_some() {
                // Natural expiry: the only path that bumps the alarm token.
                info!("Session expired");
                guard.finish(Utc::now().timestamp_millis(), true);
                let _ = state_tx.send(guard.clone());
            } else if guard.is_running {
                guard.is_running = false;
                let _ = state_tx.send(guard.clone());
            }
        });

        *ticker_guard = Some(Ticker { handle, cancel });
    }

    async fn cancel_ticker(&self) {
        if let Some(ticker) = self.ticker.lock().await.take() {
            ticker.cancel.cancel();
            ticker.handle.abort();
        }
    }

    // --------------------
    // Task tracker
    // --------------------

    pub async fn add_task(&self, text: &str) {
        let mut guard = self.state.lock().await;
        if guard.add_task(text) {
            self.publish(&guard);
        }
    }

    pub async fn remove_task(&self, index: usize) {
        let mut guard = self.state.lock().await;
        guard.remove_task(index);
        self.publish(&guard);
    }

    pub async fn select_task(&self, index: usize) {
        let mut guard = self.state.lock().await;
        guard.select_task(index);
        self.publish(&guard);
    }

    /// Pulls task labels from the day planner, when one is wired in.
    pub async fn pick_from_planner(&self) {
        let Some(planner) = self.planner.as_ref() else {
            return;
        };
        let picked = planner.pick_tasks();
        let mut guard = self.state.lock().await;
        let mut added = false;
        for task in &picked {
            added |= guard.add_task(task);
        }
        if added {
            self.publish(&guard);
        }
    }

    // --------------------
    // Summary finalizer
    // --------------------

    /// Opens the stop-confirmation dialog; the scheduler keeps ticking.
    pub async fn request_stop(&self) {
        let mut guard = self.state.lock().await;
        if guard.started_at_millis.is_none() {
            return;
        }
        guard.show_stop_dialog = true;
        self.publish(&guard);
    }

    pub async fn cancel_stop(&self) {
        let mut guard = self.state.lock().await;
        guard.show_stop_dialog = false;
        self.publish(&guard);
    }

    /// User-initiated stop: finalize without bumping the alarm token.
    pub async fn confirm_stop(&self) {
        self.cancel_ticker().await;
        let mut guard = self.state.lock().await;
        if guard.started_at_millis.is_none() {
            guard.show_stop_dialog = false;
            self.publish(&guard);
            return;
        }
        guard.finish(Utc::now().timestamp_millis(), false);
        info!("Session stopped by user");
        self.publish(&guard);
    }

    pub async fn set_summary_title(&self, title: &str) {
        let mut guard = self.state.lock().await;
        if let Some(summary) = guard.summary.as_mut() {
            summary.title = title.to_string();
            self.publish(&guard);
        }
    }

    pub async fn set_focus_rating(&self, rating: u8) {
        let mut guard = self.state.lock().await;
        if let Some(summary) = guard.summary.as_mut() {
            summary.focus_rating = rating.min(5);
            self.publish(&guard);
        }
    }

    pub async fn set_satisfaction_rating(&self, rating: u8) {
        let mut guard = self.state.lock().await;
        if let Some(summary) = guard.summary.as_mut() {
            summary.satisfaction_rating = rating.min(5);
            self.publish(&guard);
        }
    }

    pub async fn close_validation_dialog(&self) {
        let mut guard = self.state.lock().await;
        guard.show_validation_dialog = false;
        self.publish(&guard);
    }

    /// Persists the summary if both ratings are set, then resets to idle.
    /// Without both ratings the validation dialog opens and nothing is
    /// persisted. Returns whether a record was handed to the store.
    ///
    /// The handoff is fire-and-forget: a store failure is logged and never
    /// touches session state.
    pub async fn attempt_save(
        &self,
        title: &str,
        visibility: Visibility,
        allow_comments: bool,
    ) -> bool {
        let record = {
            let mut guard = self.state.lock().await;
            let Some(summary) = guard.summary.as_ref() else {
                return false;
            };
            if !summary.can_save() {
                guard.show_validation_dialog = true;
                self.publish(&guard);
                return false;
            }

            let title = title.trim();
            let record = StudySession {
                id: Uuid::new_v4().to_string(),
                title: if title.is_empty() {
                    FALLBACK_SESSION_TITLE.to_string()
                } else {
                    title.to_string()
                },
                duration_seconds: summary.session_seconds,
                tasks_count: summary.tasks_count,
                xp_points: summary.xp_points,
                focus_rate: summary.focus_rating,
                satisfaction_rate: summary.satisfaction_rating,
                visibility,
                allow_comments,
                created_at: Utc::now(),
            };

            guard.reset_idle();
            self.publish(&guard);
            record
        };

        if let Err(err) = self.store.save_session(&record) {
            error!("Failed to save session {}: {err}", record.id);
        }
        true
    }

    /// Opens the discard confirmation. Discarding is irreversible, so it is
    /// always gated behind this explicit step.
    pub async fn request_discard(&self) {
        let mut guard = self.state.lock().await;
        if !guard.show_summary {
            return;
        }
        guard.show_discard_dialog = true;
        self.publish(&guard);
    }

    pub async fn cancel_discard(&self) {
        let mut guard = self.state.lock().await;
        guard.show_discard_dialog = false;
        self.publish(&guard);
    }

    /// Resets to idle without persisting anything.
    pub async fn confirm_discard(&self) {
        self.cancel_ticker().await;
        let mut guard = self.state.lock().await;
        guard.reset_idle();
        info!("Session discarded");
        self.publish(&guard);
    }

    fn publish(&self, state: &FocusState) {
        let _ = self.state_tx.send(state.clone());
    }
}
