use std::sync::Arc;

use anyhow::anyhow;
use chrono::NaiveDate;
use uuid::Uuid;

use habits_db::Database;
use habits_types::models::{AdviceMessage, Habit, HabitReport};
use habits_types::period::Period;

use crate::error::AppError;
use crate::rows::habit_from_row;

/// Resolves the `period` query parameter. Absent means a weekly report.
pub fn parse_period(raw: Option<&str>) -> Result<Period, AppError> {
    match raw {
        None => Ok(Period::default()),
        Some(p) => p.parse().map_err(|_| AppError::validation("Invalid period")),
    }
}

/// Completed share of expected occurrences, floored and capped at 100.
/// Nothing expected reports 0 rather than dividing by zero.
pub fn adherence_percent(completed: u32, expected: u32) -> u32 {
    if expected == 0 {
        return 0;
    }
    let pct = u64::from(completed) * 100 / u64::from(expected);
    pct.min(100) as u32
}

fn completed_days(count: i64, habit: Uuid) -> anyhow::Result<u32> {
    u32::try_from(count).map_err(|_| anyhow!("done-day count {count} out of range on habit {habit}"))
}

pub fn build_report(habit: Habit, completed_days: u32, period: Period) -> HabitReport {
    let expected_days = period.expected_occurrences(habit.frequency);
    let adherence_percent = adherence_percent(completed_days, expected_days);
    HabitReport {
        on_track: adherence_percent >= habit.target_percent,
        habit,
        completed_days,
        expected_days,
        adherence_percent,
    }
}

#[derive(Clone)]
pub struct AdherenceReporter {
    db: Arc<Database>,
}

impl AdherenceReporter {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Adherence of every habit owned by `owner` over the trailing `period`
    /// window ending at `today`.
    pub fn compute_report(&self, owner: Uuid, period: Period, today: NaiveDate) -> Result<Vec<HabitReport>, AppError> {
        let (from, to) = period.window(today);
        let rows = self.db.tally_habits(&owner.to_string(), from, to)?;

        rows.into_iter()
            .map(|row| -> Result<HabitReport, AppError> {
                let habit = habit_from_row(row.habit)?;
                let completed = completed_days(row.done_days, habit.id)?;
                Ok(build_report(habit, completed, period))
            })
            .collect()
    }

    pub fn advice(&self) -> Result<Option<AdviceMessage>, AppError> {
        Ok(self.db.random_advice()?.map(|row| AdviceMessage {
            id: row.id,
            message: row.message,
        }))
    }
}
