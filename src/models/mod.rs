mod session;

pub use session::{StudySession, Visibility};
