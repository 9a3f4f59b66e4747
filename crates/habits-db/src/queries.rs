use crate::Database;
use crate::models::{AdviceRow, HabitRow, HabitTallyRow, RecordRow, UserRow};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::{Connection, Row};

/// Result of an insert guarded by a UNIQUE constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    Duplicate,
}

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<InsertOutcome> {
        self.with_conn(|conn| {
            let res = conn.execute(
                "INSERT INTO users (id, username, password_hash) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            );
            match res {
                Ok(_) => Ok(InsertOutcome::Inserted),
                Err(e) if is_unique_violation(&e) => Ok(InsertOutcome::Duplicate),
                Err(e) => Err(e.into()),
            }
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Habits --

    pub fn create_habit(
        &self,
        id: &str,
        user_id: &str,
        description: &str,
        frequency: u32,
        target_percent: u32,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO habits (id, user_id, description, frequency, target_percent)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, user_id, description, frequency, target_percent],
            )?;
            Ok(())
        })
    }

    pub fn list_habits(&self, user_id: &str) -> Result<Vec<HabitRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, description, frequency, target_percent, created_at
                 FROM habits
                 WHERE user_id = ?1
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt
                .query_map([user_id], habit_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Every habit of `user_id` with the number of days in `from..=to` marked done.
    pub fn tally_habits(&self, user_id: &str, from: NaiveDate, to: NaiveDate) -> Result<Vec<HabitTallyRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT h.id, h.user_id, h.description, h.frequency, h.target_percent, h.created_at,
                        (SELECT COUNT(*) FROM habit_records r
                          WHERE r.habit_id = h.id AND r.done = 1 AND r.date BETWEEN ?2 AND ?3)
                 FROM habits h
                 WHERE h.user_id = ?1
                 ORDER BY h.created_at, h.rowid",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, from.to_string(), to.to_string()], |row| {
                    Ok(HabitTallyRow {
                        habit: habit_from_row(row)?,
                        done_days: row.get(6)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Deletes a habit owned by `user_id`; its records go with it through the
    /// foreign key cascade. Returns false when no owned habit matched.
    pub fn delete_habit(&self, user_id: &str, habit_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM habits WHERE id = ?1 AND user_id = ?2",
                (habit_id, user_id),
            )?;
            Ok(n > 0)
        })
    }

    // -- Records --

    /// Upserts the done flag for (habit, date), but only when the habit
    /// belongs to `user_id`. Ownership check and write are one statement.
    /// Returns the stored record, or `None` when the habit is missing or owned
    /// by someone else.
    pub fn mark_record(
        &self,
        id: &str,
        user_id: &str,
        habit_id: &str,
        date: NaiveDate,
        done: bool,
    ) -> Result<Option<RecordRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "INSERT INTO habit_records (id, habit_id, date, done)
                 SELECT ?1, h.id, ?3, ?4 FROM habits h WHERE h.id = ?2 AND h.user_id = ?5
                 ON CONFLICT(habit_id, date) DO UPDATE SET done = excluded.done
                 RETURNING id, habit_id, date, done",
                rusqlite::params![id, habit_id, date.to_string(), done, user_id],
                |row| {
                    Ok(RecordRow {
                        id: row.get(0)?,
                        habit_id: row.get(1)?,
                        date: row.get(2)?,
                        done: row.get(3)?,
                    })
                },
            )
            .optional()
        })
    }

    // -- Advice --

    pub fn random_advice(&self) -> Result<Option<AdviceRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, message FROM advice ORDER BY RANDOM() LIMIT 1",
                [],
                |row| {
                    Ok(AdviceRow {
                        id: row.get(0)?,
                        message: row.get(1)?,
                    })
                },
            )
            .optional()
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    let sql = format!("SELECT id, username, password_hash, created_at FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password_hash: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn habit_from_row(row: &Row<'_>) -> rusqlite::Result<HabitRow> {
    Ok(HabitRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        description: row.get(2)?,
        frequency: row.get(3)?,
        target_percent: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
