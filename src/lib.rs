//! # FocusMe core
//!
//! Focus-session timer engine for the FocusMe study app. The GUI shell,
//! datastore, and notification/alarm plumbing live outside this crate and
//! talk to the engine through narrow seams:
//!
//! - [`FocusController`] owns the session lifecycle (duration configuration,
//!   the one-second countdown, the in-session task list, end-of-session
//!   finalization) and is the sole mutator of [`FocusState`].
//! - Observers subscribe to a watch channel and re-render from whole-state
//!   snapshots; the notification collaborator watches the `alarm_trigger`
//!   token, bumped exactly once per natural expiry.
//! - Finished sessions are handed to a [`SessionStore`] exactly once per
//!   successful save; a [`PlannerSource`] can feed the task list.

pub mod models;
pub mod store;
pub mod timer;

pub use models::{StudySession, Visibility};
pub use store::{PlannerSource, SessionStore};
pub use timer::{FocusController, FocusState, SessionPhase, SessionSummary};
