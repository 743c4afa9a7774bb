use rusqlite::Connection;

/// Schema migrations, applied in order and recorded in `_migrations`.
/// Embedded so the client does not depend on files next to the binary.
const MIGRATIONS: &[(&str, &str)] = &[
    (
        "001_settings.sql",
        include_str!("../../migrations/001_settings.sql"),
    ),
    (
        "002_categories.sql",
        include_str!("../../migrations/002_categories.sql"),
    ),
];

pub fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    tracing::debug!(available = MIGRATIONS.len(), "Checking for database migrations");

    conn.execute(
        "CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let mut applied_count = 0;
    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM _migrations WHERE name = ?)",
            [name],
            |row| row.get(0),
        )?;
        if already_applied {
            continue;
        }

        tracing::info!(migration = %name, "Applying migration");
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO _migrations (name) VALUES (?)", [name])?;
        applied_count += 1;
    }

    if applied_count > 0 {
        tracing::info!(count = applied_count, "Migrations applied successfully");
    } else {
        tracing::debug!("No new migrations to apply");
    }

    Ok(())
}
