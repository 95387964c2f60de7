use serde::{Deserialize, Serialize};

use crate::models::Visibility;

/// Hard ceiling for the duration dial, in minutes.
pub const MAX_DIAL_MINUTES: u32 = 180;

/// Preset durations offered before the first configuration, in minutes.
pub const QUICK_PICK_MINUTES: [u32; 3] = [15, 25, 45];

/// Title pre-filled on the summary screen.
pub const DEFAULT_SESSION_TITLE: &str = "Morning study";

/// Title used when the user saves with a blank one.
pub const FALLBACK_SESSION_TITLE: &str = "Session";

/// Coarse lifecycle phase, derived from the state. Exactly one phase holds
/// at any time; the modal flags are orthogonal to it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    Summary,
}

/// End-of-session metrics plus the inputs the summary screen collects.
/// Present only between session end and save/discard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_seconds: u32,
    pub tasks_count: u32,
    pub xp_points: u32,
    pub title: String,
    pub focus_rating: u8,
    pub satisfaction_rating: u8,
    pub visibility: Visibility,
    pub allow_comments: bool,
    pub ended_at_millis: i64,
}

impl SessionSummary {
    fn new(session_seconds: u32, tasks_count: u32, ended_at_millis: i64) -> Self {
        Self {
            session_seconds,
            tasks_count,
            xp_points: session_seconds / 60,
            title: DEFAULT_SESSION_TITLE.to_string(),
            focus_rating: 0,
            satisfaction_rating: 0,
            visibility: Visibility::Friends,
            allow_comments: true,
            ended_at_millis,
        }
    }

    /// A summary may be persisted only once both dimensions have been rated.
    pub fn can_save(&self) -> bool {
        self.focus_rating > 0 && self.satisfaction_rating > 0
    }
}

/// Single source of truth for the focus screen. Mutated only by the
/// controller; observers read whole-state clones off the watch channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusState {
    pub total_seconds: u32,
    pub remaining_seconds: u32,
    pub is_running: bool,
    /// Set once, on the first start of a session; cleared when the session
    /// ends or resets. Distinguishes "never started" from "paused".
    pub started_at_millis: Option<i64>,

    pub tasks: Vec<String>,
    pub current_task_index: usize,

    pub show_duration_dialog: bool,
    pub temp_minutes: u32,
    pub show_quick_picks: bool,

    pub show_stop_dialog: bool,
    pub show_validation_dialog: bool,
    pub show_discard_dialog: bool,
    pub show_summary: bool,

    pub summary: Option<SessionSummary>,

    /// Last natural-expiry timestamp (epoch millis). The notification
    /// collaborator fires once per change; user-initiated stops never bump it.
    pub alarm_trigger: i64,
}

impl Default for FocusState {
    fn default() -> Self {
        Self {
            total_seconds: 0,
            remaining_seconds: 0,
            is_running: false,
            started_at_millis: None,
            tasks: Vec::new(),
            current_task_index: 0,
            show_duration_dialog: false,
            temp_minutes: 0,
            show_quick_picks: true,
            show_stop_dialog: false,
            show_validation_dialog: false,
            show_discard_dialog: false,
            show_summary: false,
            summary: None,
            alarm_trigger: 0,
        }
    }
}

impl FocusState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        if self.show_summary {
            SessionPhase::Summary
        } else if self.is_running {
            SessionPhase::Running
        } else if self.started_at_millis.is_some() {
            SessionPhase::Paused
        } else {
            SessionPhase::Idle
        }
    }

    /// Task the "in progress" card points at, if any.
    pub fn current_task(&self) -> Option<&str> {
        self.tasks.get(self.current_task_index).map(String::as_str)
    }

    /// Hard reset to a fresh session with the given duration committed.
    /// Everything session-scoped goes; only the alarm token survives so it
    /// stays monotonic across sessions.
    pub fn reset_with_duration(&mut self, total_seconds: u32) {
        *self = Self {
            total_seconds,
            remaining_seconds: total_seconds,
            show_quick_picks: false,
            alarm_trigger: self.alarm_trigger,
            ..Self::default()
        };
    }

    /// Back to the all-idle form, after a save or discard.
    pub fn reset_idle(&mut self) {
        *self = Self {
            alarm_trigger: self.alarm_trigger,
            ..Self::default()
        };
    }

    pub fn seed_temp_minutes(&mut self) {
        self.temp_minutes = self.total_seconds / 60;
    }

    pub fn inc_temp_minutes(&mut self) {
        self.temp_minutes = (self.temp_minutes + 1).min(MAX_DIAL_MINUTES);
    }

    pub fn dec_temp_minutes(&mut self) {
        self.temp_minutes = self.temp_minutes.saturating_sub(1);
    }

    /// +/- adjustment while a session is active. Additive, floored at zero;
    /// deliberately does not touch `total_seconds`, so remaining may exceed
    /// total (bonus time).
    pub fn adjust_remaining(&mut self, delta_minutes: i32) {
        let adjusted = i64::from(self.remaining_seconds) + i64::from(delta_minutes) * 60;
        self.remaining_seconds = adjusted.max(0) as u32;
    }

    /// Appends trimmed text; blank input is a no-op. Returns whether a task
    /// was added.
    pub fn add_task(&mut self, text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return false;
        }
        self.tasks.push(trimmed.to_string());
        true
    }

    /// Removes by position, keeping the cursor on the same task where
    /// possible: removing at or before the cursor shifts it back one.
    pub fn remove_task(&mut self, index: usize) {
        if index >= self.tasks.len() {
            return;
        }
        self.tasks.remove(index);
        if index <= self.current_task_index && self.current_task_index > 0 {
            self.current_task_index -= 1;
        }
        if self.tasks.is_empty() {
            self.current_task_index = 0;
        } else if self.current_task_index >= self.tasks.len() {
            self.current_task_index = self.tasks.len() - 1;
        }
    }

    /// Manual cursor move; clamped into range. The cursor never advances on
    /// its own.
    pub fn select_task(&mut self, index: usize) {
        if self.tasks.is_empty() {
            self.current_task_index = 0;
        } else {
            self.current_task_index = index.min(self.tasks.len() - 1);
        }
    }

    /// Terminal transition into the summary phase. Computes the session
    /// metrics, snapshots the task count, and (on natural expiry only) bumps
    /// the alarm token.
    pub fn finish(&mut self, now_millis: i64, trigger_alarm: bool) {
        let session_seconds = self.total_seconds.saturating_sub(self.remaining_seconds);

        self.is_running = false;
        self.started_at_millis = None;
        self.show_duration_dialog = false;
        self.show_stop_dialog = false;
        self.show_validation_dialog = false;
        self.show_discard_dialog = false;
        self.show_summary = true;
        self.summary = Some(SessionSummary::new(
            session_seconds,
            self.tasks.len() as u32,
            now_millis,
        ));
        if trigger_alarm {
            self.alarm_trigger = now_millis;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_follows_lifecycle() {
        let mut state = FocusState::new();
        assert_eq!(state.phase(), SessionPhase::Idle);

        state.reset_with_duration(300);
        assert_eq!(state.phase(), SessionPhase::Idle);

        state.started_at_millis = Some(1_000);
        state.is_running = true;
        assert_eq!(state.phase(), SessionPhase::Running);

        state.is_running = false;
        assert_eq!(state.phase(), SessionPhase::Paused);

        state.finish(2_000, false);
        assert_eq!(state.phase(), SessionPhase::Summary);
    }

    #[test]
    fn temp_minutes_clamp_to_dial_range() {
        let mut state = FocusState::new();
        state.temp_minutes = MAX_DIAL_MINUTES;
        state.inc_temp_minutes();
        assert_eq!(state.temp_minutes, MAX_DIAL_MINUTES);

        state.temp_minutes = 0;
        state.dec_temp_minutes();
        assert_eq!(state.temp_minutes, 0);
    }

    #[test]
    fn adjust_remaining_floors_at_zero_and_allows_bonus_time() {
        let mut state = FocusState::new();
        state.reset_with_duration(600);

        state.adjust_remaining(-5);
        assert_eq!(state.remaining_seconds, 300);

        state.adjust_remaining(-10);
        assert_eq!(state.remaining_seconds, 0);

        state.adjust_remaining(15);
        assert_eq!(state.remaining_seconds, 900);
        // Bonus time: remaining may exceed total.
        assert_eq!(state.total_seconds, 600);
    }

    #[test]
    fn add_task_trims_and_rejects_blank() {
        let mut state = FocusState::new();
        assert!(state.add_task("  read chapter 4  "));
        assert!(!state.add_task("   "));
        assert!(!state.add_task(""));
        assert_eq!(state.tasks, vec!["read chapter 4"]);
    }

    #[test]
    fn remove_task_keeps_cursor_on_same_task() {
        let mut state = FocusState::new();
        state.add_task("A");
        state.add_task("B");
        state.add_task("C");
        state.current_task_index = 2;

        state.remove_task(0);
        assert_eq!(state.tasks, vec!["B", "C"]);
        assert_eq!(state.current_task_index, 1);
        assert_eq!(state.current_task(), Some("C"));
    }

    #[test]
    fn remove_last_task_clamps_cursor() {
        let mut state = FocusState::new();
        state.add_task("A");
        state.add_task("B");
        state.current_task_index = 1;

        state.remove_task(1);
        assert_eq!(state.current_task_index, 0);
        assert_eq!(state.current_task(), Some("A"));

        state.remove_task(0);
        assert_eq!(state.current_task_index, 0);
        assert_eq!(state.current_task(), None);

        // Out-of-range removal is a no-op.
        state.remove_task(5);
        assert!(state.tasks.is_empty());
    }

    #[test]
    fn finish_computes_elapsed_and_xp() {
        let mut state = FocusState::new();
        state.reset_with_duration(125);
        state.started_at_millis = Some(1_000);
        state.remaining_seconds = 5;

        state.finish(9_999, false);
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.session_seconds, 120);
        assert_eq!(summary.xp_points, 2);
        assert_eq!(summary.title, DEFAULT_SESSION_TITLE);
        assert!(state.started_at_millis.is_none());
        assert_eq!(state.alarm_trigger, 0);
    }

    #[test]
    fn finish_with_bonus_time_never_goes_negative() {
        let mut state = FocusState::new();
        state.reset_with_duration(60);
        state.adjust_remaining(5);
        assert_eq!(state.remaining_seconds, 360);

        state.finish(1_234, true);
        let summary = state.summary.as_ref().unwrap();
        assert_eq!(summary.session_seconds, 0);
        assert_eq!(summary.xp_points, 0);
        assert_eq!(state.alarm_trigger, 1_234);
    }

    #[test]
    fn alarm_token_survives_resets() {
        let mut state = FocusState::new();
        state.reset_with_duration(60);
        state.finish(5_000, true);
        assert_eq!(state.alarm_trigger, 5_000);

        state.reset_idle();
        assert_eq!(state.alarm_trigger, 5_000);

        state.reset_with_duration(120);
        assert_eq!(state.alarm_trigger, 5_000);
    }

    #[test]
    fn summary_save_gate_requires_both_ratings() {
        let mut summary = SessionSummary::new(120, 0, 0);
        assert!(!summary.can_save());

        summary.satisfaction_rating = 4;
        assert!(!summary.can_save());

        summary.focus_rating = 3;
        assert!(summary.can_save());
    }

    #[test]
    fn state_serializes_camel_case_for_the_ui() {
        let state = FocusState::new();
        let value = serde_json::to_value(&state).unwrap();
        assert!(value.get("remainingSeconds").is_some());
        assert!(value.get("showQuickPicks").is_some());
        assert!(value.get("alarmTrigger").is_some());
    }
}
