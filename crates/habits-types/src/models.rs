use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// A recurring task owned by exactly one user.
///
/// `frequency` is the number of days per week the habit should be performed;
/// `target_percent` is the adherence at or above which the habit is on track.
#[derive(Debug, Clone)]
pub struct Habit {
    pub id: Uuid,
    pub user_id: Uuid,
    pub description: String,
    pub frequency: u32,
    pub target_percent: u32,
    pub created_at: DateTime<Utc>,
}

/// One day's completion status for one habit. At most one per (habit, date).
#[derive(Debug, Clone)]
pub struct HabitRecord {
    pub id: Uuid,
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub done: bool,
}

#[derive(Debug, Clone)]
pub struct AdviceMessage {
    pub id: i64,
    pub message: String,
}

/// A habit as shown on the list page, with today's completion flag.
#[derive(Debug, Clone)]
pub struct HabitOverview {
    pub habit: Habit,
    pub done_today: bool,
}

/// Adherence of one habit over a reporting window.
#[derive(Debug, Clone)]
pub struct HabitReport {
    pub habit: Habit,
    pub completed_days: u32,
    pub expected_days: u32,
    pub adherence_percent: u32,
    pub on_track: bool,
}
