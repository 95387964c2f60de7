use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who gets to see a saved session in the friends feed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Visibility {
    Friends,
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Friends
    }
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Friends => "friends",
            Visibility::Private => "private",
        }
    }
}

/// A completed study session as handed to the persistence collaborator.
/// Built once per successful save, never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudySession {
    pub id: String,
    pub title: String,
    pub duration_seconds: u32,
    pub tasks_count: u32,
    pub xp_points: u32,
    pub focus_rate: u8,
    pub satisfaction_rate: u8,
    pub visibility: Visibility,
    pub allow_comments: bool,
    pub created_at: DateTime<Utc>,
}
