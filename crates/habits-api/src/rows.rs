//! Conversions from raw SQLite rows into domain models.

use anyhow::{Context, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use habits_db::models::{HabitRow, RecordRow, UserRow};
use habits_types::models::{Habit, HabitRecord, User};

pub(crate) fn user_from_row(row: UserRow) -> anyhow::Result<User> {
    Ok(User {
        id: parse_id(&row.id).context("corrupt user row")?,
        created_at: parse_timestamp(&row.created_at, &row.id),
        username: row.username,
    })
}

pub(crate) fn habit_from_row(row: HabitRow) -> anyhow::Result<Habit> {
    let id = parse_id(&row.id).context("corrupt habit row")?;
    Ok(Habit {
        id,
        user_id: parse_id(&row.user_id).with_context(|| format!("corrupt owner on habit {id}"))?,
        frequency: u32::try_from(row.frequency)
            .map_err(|_| anyhow!("frequency {} out of range on habit {id}", row.frequency))?,
        target_percent: u32::try_from(row.target_percent)
            .map_err(|_| anyhow!("target {} out of range on habit {id}", row.target_percent))?,
        created_at: parse_timestamp(&row.created_at, &row.id),
        description: row.description,
    })
}

pub(crate) fn record_from_row(row: RecordRow) -> anyhow::Result<HabitRecord> {
    Ok(HabitRecord {
        id: parse_id(&row.id).context("corrupt record row")?,
        habit_id: parse_id(&row.habit_id).context("corrupt record row")?,
        date: NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
            .with_context(|| format!("corrupt date '{}' on record {}", row.date, row.id))?,
        done: row.done,
    })
}

fn parse_id(raw: &str) -> anyhow::Result<Uuid> {
    raw.parse().map_err(|e| anyhow!("invalid id '{raw}': {e}"))
}

/// SQLite `datetime('now')` stores "YYYY-MM-DD HH:MM:SS" without a zone; it is UTC.
fn parse_timestamp(raw: &str, row_id: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .unwrap_or_else(|e| {
            warn!("Corrupt created_at '{}' on row '{}': {}", raw, row_id, e);
            DateTime::default()
        })
}
