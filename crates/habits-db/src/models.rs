//! Database row types. These map directly to SQLite rows and are kept apart
//! from the habits-types models so the DB layer stays independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: String,
}

pub struct HabitRow {
    pub id: String,
    pub user_id: String,
    pub description: String,
    pub frequency: i64,
    pub target_percent: i64,
    pub created_at: String,
}

pub struct RecordRow {
    pub id: String,
    pub habit_id: String,
    pub date: String,
    pub done: bool,
}

/// A habit joined with its done-day count over a date range.
pub struct HabitTallyRow {
    pub habit: HabitRow,
    pub done_days: i64,
}

pub struct AdviceRow {
    pub id: i64,
    pub message: String,
}
