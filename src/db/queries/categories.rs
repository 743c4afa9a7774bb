use crate::models::{CategoryKey, CategoryKind, NewCategory, Subcategory, UserCategory};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const COLUMNS: &str =
    "id, name, kind, icon, color, sort_order, active, is_default, subcategories";

fn row_to_category(row: &Row<'_>) -> rusqlite::Result<UserCategory> {
    let kind: String = row.get(2)?;
    let subcategories: String = row.get(8)?;
    Ok(UserCategory {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: CategoryKind::parse(&kind).unwrap_or(CategoryKind::Expense),
        icon: row.get(3)?,
        color: row.get(4)?,
        order: row.get(5)?,
        active: row.get(6)?,
        is_default: row.get(7)?,
        subcategories: Some(
            serde_json::from_str::<Vec<Subcategory>>(&subcategories).unwrap_or_default(),
        ),
        usage_stats: None,
    })
}

pub fn list_categories(
    conn: &Connection,
    kind: Option<CategoryKind>,
) -> rusqlite::Result<Vec<UserCategory>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {COLUMNS}
         FROM categories
         WHERE (?1 IS NULL OR kind = ?1)
         ORDER BY kind, sort_order, name"
    ))?;

    let categories = stmt
        .query_map([kind.map(|k| k.as_str())], row_to_category)?
        .filter_map(|c| c.ok())
        .collect();

    Ok(categories)
}

pub fn get_category(conn: &Connection, id: &str) -> rusqlite::Result<Option<UserCategory>> {
    conn.query_row(
        &format!("SELECT {COLUMNS} FROM categories WHERE id = ?"),
        [id],
        row_to_category,
    )
    .optional()
}

/// Looks up a category by its reconciliation key. The comparison is done in
/// Rust because SQLite's `NOCASE` only folds ASCII.
pub fn find_by_key(conn: &Connection, key: &CategoryKey) -> rusqlite::Result<Option<UserCategory>> {
    Ok(list_categories(conn, Some(key.kind))?
        .into_iter()
        .find(|c| &c.key() == key))
}

pub fn create_category(conn: &Connection, category: &NewCategory) -> rusqlite::Result<UserCategory> {
    let id = uuid::Uuid::new_v4().to_string();
    let subcategories = serde_json::to_string(&category.subcategories)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        "INSERT INTO categories (id, name, kind, icon, color, sort_order, is_default, subcategories)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        params![
            id,
            category.name,
            category.kind.as_str(),
            category.icon,
            category.color,
            category.order,
            category.is_default,
            subcategories
        ],
    )?;
    debug!(category_id = %id, name = %category.name, kind = %category.kind, "Created category");

    get_category(conn, &id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
}

pub fn update_category(
    conn: &Connection,
    id: &str,
    category: &NewCategory,
) -> rusqlite::Result<bool> {
    let subcategories = serde_json::to_string(&category.subcategories)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    let rows = conn.execute(
        "UPDATE categories SET name = ?, kind = ?, icon = ?, color = ?, sort_order = ?,
         subcategories = ?, updated_at = datetime('now') WHERE id = ?",
        params![
            category.name,
            category.kind.as_str(),
            category.icon,
            category.color,
            category.order,
            subcategories,
            id
        ],
    )?;
    if rows > 0 {
        debug!(category_id = %id, name = %category.name, "Updated category");
    }
    Ok(rows > 0)
}

pub fn delete_category(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    let rows = conn.execute("DELETE FROM categories WHERE id = ?", [id])?;
    if rows > 0 {
        debug!(category_id = %id, "Deleted category");
    }
    Ok(rows > 0)
}
