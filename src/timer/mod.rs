pub mod controller;
pub mod state;

pub use controller::FocusController;
pub use state::{
    FocusState, SessionPhase, SessionSummary, DEFAULT_SESSION_TITLE, FALLBACK_SESSION_TITLE,
    MAX_DIAL_MINUTES, QUICK_PICK_MINUTES,
};
