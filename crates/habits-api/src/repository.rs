use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use habits_db::Database;
use habits_types::api::HabitForm;
use habits_types::models::{Habit, HabitOverview, HabitRecord};

use crate::error::AppError;
use crate::rows::{habit_from_row, record_from_row};

const MAX_DESCRIPTION_LEN: usize = 200;
/// Frequency is counted in days per week.
const MAX_FREQUENCY: u32 = 7;

/// A validated habit ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewHabit {
    pub description: String,
    pub frequency: u32,
    pub target_percent: u32,
}

impl NewHabit {
    pub fn parse(form: &HabitForm) -> Result<Self, AppError> {
        let description = form.description.trim();
        if description.is_empty() || description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(AppError::validation("Invalid description"));
        }

        let frequency = form
            .frequency
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|f| (1..=MAX_FREQUENCY).contains(f))
            .ok_or_else(|| AppError::validation("Invalid frequency"))?;

        let target_percent = form
            .target_percent
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|t| *t <= 100)
            .ok_or_else(|| AppError::validation("Invalid target percent"))?;

        Ok(Self {
            description: description.to_string(),
            frequency,
            target_percent,
        })
    }
}

/// Habit ids that do not parse are treated like ids owned by someone else,
/// so callers cannot probe which ids exist.
pub fn parse_habit_id(raw: &str) -> Result<Uuid, AppError> {
    raw.trim().parse().map_err(|_| AppError::Authorization)
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| AppError::validation("Invalid date"))
}

/// Interprets the `done` form field. An absent field is an unchecked box.
pub fn parse_done(raw: Option<&str>) -> Result<bool, AppError> {
    match raw.map(str::trim) {
        None | Some("") | Some("false") | Some("off") | Some("0") => Ok(false),
        Some("true") | Some("on") | Some("1") => Ok(true),
        Some(_) => Err(AppError::validation("Invalid done flag")),
    }
}

/// CRUD over habits and their daily records, always scoped to an owner.
#[derive(Clone)]
pub struct HabitRepository {
    db: Arc<Database>,
}

impl HabitRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub fn create_habit(&self, owner: Uuid, habit: &NewHabit) -> Result<Uuid, AppError> {
        let id = Uuid::new_v4();
        self.db.create_habit(
            &id.to_string(),
            &owner.to_string(),
            &habit.description,
            habit.frequency,
            habit.target_percent,
        )?;
        info!("User {} created habit {}", owner, id);
        Ok(id)
    }

    pub fn list_habits(&self, owner: Uuid) -> Result<Vec<Habit>, AppError> {
        let rows = self.db.list_habits(&owner.to_string())?;
        Ok(rows.into_iter().map(habit_from_row).collect::<anyhow::Result<Vec<_>>>()?)
    }

    /// Owner's habits with whether each is marked done on `day`.
    pub fn overview(&self, owner: Uuid, day: NaiveDate) -> Result<Vec<HabitOverview>, AppError> {
        let rows = self.db.tally_habits(&owner.to_string(), day, day)?;
        rows.into_iter()
            .map(|row| -> Result<HabitOverview, AppError> {
                Ok(HabitOverview {
                    done_today: row.done_days > 0,
                    habit: habit_from_row(row.habit)?,
                })
            })
            .collect()
    }

    /// Sets the done flag for (habit, date) and returns the stored record.
    /// Repeating a mark is a no-op; a different value overwrites.
    pub fn mark_record(
        &self,
        owner: Uuid,
        habit_id: &str,
        date: NaiveDate,
        done: bool,
    ) -> Result<HabitRecord, AppError> {
        let habit_id = parse_habit_id(habit_id)?;
        let record_id = Uuid::new_v4();

        let Some(row) = self.db.mark_record(
            &record_id.to_string(),
            &owner.to_string(),
            &habit_id.to_string(),
            date,
            done,
        )?
        else {
            return Err(AppError::Authorization);
        };

        let record = record_from_row(row)?;
        debug!("Habit {} marked {} on {} (record {})", habit_id, done, date, record.id);
        Ok(record)
    }

    pub fn delete_habit(&self, owner: Uuid, habit_id: &str) -> Result<(), AppError> {
        let habit_id = parse_habit_id(habit_id)?;
        if !self.db.delete_habit(&owner.to_string(), &habit_id.to_string())? {
            return Err(AppError::Authorization);
        }
        info!("User {} deleted habit {}", owner, habit_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(description: &str, frequency: &str, target: &str) -> HabitForm {
        HabitForm {
            description: description.into(),
            frequency: frequency.into(),
            target_percent: target.into(),
        }
    }

    fn repo_with_user(db: &Arc<Database>, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        db.create_user(&id.to_string(), name, "hash").unwrap();
        id
    }

    fn validation_message(err: AppError) -> String {
        match err {
            AppError::Validation(m) => m,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn habit_form_validation() {
        assert_eq!(
            NewHabit::parse(&form(" Run ", "5", "80")).unwrap(),
            NewHabit { description: "Run".into(), frequency: 5, target_percent: 80 }
        );
        assert!(NewHabit::parse(&form("Run", "7", "0")).is_ok());
        assert!(NewHabit::parse(&form("Run", "1", "100")).is_ok());

        let bad = [
            (form("Run", "invalid", "80"), "Invalid frequency"),
            (form("Run", "0", "80"), "Invalid frequency"),
            (form("Run", "8", "80"), "Invalid frequency"),
            (form("Run", "-1", "80"), "Invalid frequency"),
            (form("Run", "5", "101"), "Invalid target percent"),
            (form("Run", "5", "abc"), "Invalid target percent"),
            (form("  ", "5", "80"), "Invalid description"),
        ];
        for (f, msg) in bad {
            assert_eq!(validation_message(NewHabit::parse(&f).unwrap_err()), msg);
        }
    }

    #[test]
    fn done_flag_parsing() {
        assert!(!parse_done(None).unwrap());
        assert!(!parse_done(Some("false")).unwrap());
        assert!(parse_done(Some("true")).unwrap());
        assert!(parse_done(Some("on")).unwrap());
        assert!(parse_done(Some("maybe")).is_err());
    }

    #[test]
    fn marking_foreign_or_invalid_habit_is_forbidden() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let repo = HabitRepository::new(db.clone());
        let alice = repo_with_user(&db, "alice");
        let bob = repo_with_user(&db, "bob");
        let day = parse_date("2026-03-10").unwrap();

        let habit = repo
            .create_habit(alice, &NewHabit::parse(&form("Run", "5", "80")).unwrap())
            .unwrap();

        let foreign = repo.mark_record(bob, &habit.to_string(), day, true);
        assert!(matches!(foreign, Err(AppError::Authorization)));

        let missing = repo.mark_record(alice, &Uuid::new_v4().to_string(), day, true);
        assert!(matches!(missing, Err(AppError::Authorization)));

        let garbage = repo.mark_record(alice, "invalid-uuid", day, true);
        assert!(matches!(garbage, Err(AppError::Authorization)));

        assert!(!repo.overview(alice, day).unwrap()[0].done_today);

        let first = repo.mark_record(alice, &habit.to_string(), day, true).unwrap();
        let again = repo.mark_record(alice, &habit.to_string(), day, true).unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.habit_id, habit);
        assert_eq!(again.date, day);
        assert!(again.done);
        assert!(repo.overview(bob, day).unwrap().is_empty());

        let undone = repo.mark_record(alice, &habit.to_string(), day, false).unwrap();
        assert_eq!(undone.id, first.id);
        assert!(!undone.done);
        assert!(!repo.overview(alice, day).unwrap()[0].done_today);
    }

    #[test]
    fn overview_reflects_todays_mark() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let repo = HabitRepository::new(db.clone());
        let alice = repo_with_user(&db, "alice");
        let day = parse_date("2026-03-10").unwrap();

        let run = repo.create_habit(alice, &NewHabit::parse(&form("Run", "5", "80")).unwrap()).unwrap();
        repo.create_habit(alice, &NewHabit::parse(&form("Read", "3", "50")).unwrap()).unwrap();
        repo.mark_record(alice, &run.to_string(), day, true).unwrap();

        let overview = repo.overview(alice, day).unwrap();
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].habit.description, "Run");
        assert!(overview[0].done_today);
        assert!(!overview[1].done_today);

        assert_eq!(repo.list_habits(alice).unwrap().len(), 2);
    }

    #[test]
    fn delete_requires_ownership() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let repo = HabitRepository::new(db.clone());
        let alice = repo_with_user(&db, "alice");
        let bob = repo_with_user(&db, "bob");
        let habit = repo.create_habit(alice, &NewHabit::parse(&form("Run", "5", "80")).unwrap()).unwrap();

        assert!(matches!(repo.delete_habit(bob, &habit.to_string()), Err(AppError::Authorization)));
        repo.delete_habit(alice, &habit.to_string()).unwrap();
        assert!(repo.list_habits(alice).unwrap().is_empty());
    }
}
