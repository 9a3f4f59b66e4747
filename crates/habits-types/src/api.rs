use serde::{Deserialize, Serialize};
use uuid::Uuid;

// -- Session --

/// Claims carried by the signed `session_user` cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --
//
// Form fields default to empty so that a missing field reaches validation
// and gets the same answer as an empty one.

#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

// -- Habits --

/// Raw habit form. Numeric fields stay strings so that a malformed value
/// surfaces as a validation message rather than an extractor rejection.
#[derive(Debug, Deserialize)]
pub struct HabitForm {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub target_percent: String,
}

#[derive(Debug, Deserialize)]
pub struct MarkRecordForm {
    #[serde(default)]
    pub habit_id: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub done: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteHabitForm {
    #[serde(default)]
    pub habit_id: String,
}

// -- Report --

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub period: Option<String>,
}
