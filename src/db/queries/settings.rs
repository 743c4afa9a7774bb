use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

pub fn get_setting(conn: &Connection, key: &str) -> rusqlite::Result<Option<String>> {
    conn.query_row("SELECT value FROM settings WHERE key = ?", [key], |row| {
        row.get(0)
    })
    .optional()
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value, updated_at)
         VALUES (?, ?, datetime('now'))
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value],
    )?;
    debug!(key = %key, "Stored setting");
    Ok(())
}

pub fn delete_setting(conn: &Connection, key: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM settings WHERE key = ?", [key])?;
    if rows > 0 {
        debug!(key = %key, "Deleted setting");
    }
    Ok(rows > 0)
}
