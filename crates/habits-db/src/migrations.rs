use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

const ADVICE: &[&str] = &[
    "Don't give up, habits take time!",
    "Every day is a new chance to get better.",
    "Progress matters more than perfection.",
    "Take a break, then keep going.",
    "You're on the right track!",
];

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                password_hash   TEXT NOT NULL,
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE habits (
                id              TEXT PRIMARY KEY,
                user_id         TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                description     TEXT NOT NULL,
                frequency       INTEGER NOT NULL CHECK (frequency >= 1),
                target_percent  INTEGER NOT NULL CHECK (target_percent BETWEEN 0 AND 100),
                created_at      TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_habits_user ON habits(user_id);

            CREATE TABLE habit_records (
                id          TEXT PRIMARY KEY,
                habit_id    TEXT NOT NULL REFERENCES habits(id) ON DELETE CASCADE,
                date        TEXT NOT NULL,
                done        INTEGER NOT NULL DEFAULT 0,
                UNIQUE (habit_id, date)
            );

            CREATE TABLE advice (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                message     TEXT NOT NULL UNIQUE
            );

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    let mut stmt = conn.prepare("INSERT OR IGNORE INTO advice (message) VALUES (?1)")?;
    for message in ADVICE {
        stmt.execute([*message])?;
    }

    info!("Database migrations complete");
    Ok(())
}
