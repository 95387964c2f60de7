use anyhow::Result;

use crate::models::StudySession;

/// Persistence seam for finished sessions.
///
/// The engine calls [`SessionStore::save_session`] exactly once per successful
/// save and treats the handoff as fire-and-forget: errors are logged and the
/// in-memory session state is reset regardless. Retries and error surfacing
/// are the collaborator's job.
pub trait SessionStore: Send + Sync {
    fn save_session(&self, session: &StudySession) -> Result<()>;
}

/// Optional hook for pulling task labels out of the day planner.
///
/// Wired into [`crate::timer::FocusController::pick_from_planner`]; when no
/// planner is configured that operation is a no-op.
pub trait PlannerSource: Send + Sync {
    fn pick_tasks(&self) -> Vec<String>;
}
