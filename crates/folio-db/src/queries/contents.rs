//! Content-node queries.

use crate::pool::{not_found, DbError, DbPool, DbResult};
use rusqlite::{params, OptionalExtension, Row};

/// Content row from database.
#[derive(Debug, Clone)]
pub struct ContentRow {
    pub id: i64,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub slug: String,
    pub keywords: String,
    pub position_x: f64,
    pub position_y: f64,
    pub locked: bool,
    pub pinned: bool,
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Values for a new content row.
#[derive(Debug, Clone)]
pub struct NewContentRow<'a> {
    pub title: &'a str,
    pub subtitle: Option<&'a str>,
    pub body: &'a str,
    pub slug: &'a str,
    pub keywords: &'a str,
    pub position_x: f64,
    pub position_y: f64,
    pub views: i64,
    pub created_at: Option<&'a str>,
}

const COLUMNS: &str = "id, title, subtitle, body, slug, keywords, position_x, position_y,
                       locked, pinned, views, created_at, updated_at";

fn map_row(row: &Row<'_>) -> rusqlite::Result<ContentRow> {
    Ok(ContentRow {
        id: row.get(0)?,
        title: row.get(1)?,
        subtitle: row.get(2)?,
        body: row.get(3)?,
        slug: row.get(4)?,
        keywords: row.get(5)?,
        position_x: row.get(6)?,
        position_y: row.get(7)?,
        locked: row.get(8)?,
        pinned: row.get(9)?,
        views: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// Insert a content row and return its id.
pub fn insert_content(pool: &DbPool, new: &NewContentRow<'_>) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO contents (title, subtitle, body, slug, keywords, position_x, position_y, views, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, COALESCE(?9, strftime('%Y-%m-%dT%H:%M:%SZ', 'now')))",
            params![
                new.title,
                new.subtitle,
                new.body,
                new.slug,
                new.keywords,
                new.position_x,
                new.position_y,
                new.views,
                new.created_at,
            ],
        )
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DbError::Conflict(format!("slug already in use: {}", new.slug))
            }
            e => DbError::Connection(e),
        })?;
        Ok(conn.last_insert_rowid())
    })
}

/// Get a content row by id.
pub fn get_content(pool: &DbPool, id: i64) -> DbResult<ContentRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            &format!("SELECT {} FROM contents WHERE id = ?1", COLUMNS),
            params![id],
            map_row,
        )
        .map_err(not_found("Content", id))
    })
}

/// Get a content row by slug.
pub fn get_content_by_slug(pool: &DbPool, slug: &str) -> DbResult<ContentRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            &format!("SELECT {} FROM contents WHERE slug = ?1", COLUMNS),
            params![slug],
            map_row,
        )
        .map_err(not_found("Content", slug))
    })
}

/// List all content rows, oldest first.
pub fn list_contents(pool: &DbPool) -> DbResult<Vec<ContentRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM contents ORDER BY created_at ASC, id ASC",
            COLUMNS
        ))?;
        let rows = stmt.query_map([], map_row)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Whether a slug is already taken.
pub fn slug_exists(pool: &DbPool, slug: &str) -> DbResult<bool> {
    pool.with_conn(|conn| {
        let found: Option<i64> = conn
            .query_row("SELECT id FROM contents WHERE slug = ?1", params![slug], |row| row.get(0))
            .optional()?;
        Ok(found.is_some())
    })
}

/// Overwrite the editable text fields of a content row.
pub fn update_content_body(
    pool: &DbPool,
    id: i64,
    title: &str,
    subtitle: Option<&str>,
    body: &str,
    keywords: &str,
) -> DbResult<()> {
    pool.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE contents
             SET title = ?1, subtitle = ?2, body = ?3, keywords = ?4,
                 updated_at = strftime('%Y-%m-%dT%H:%M:%SZ', 'now')
             WHERE id = ?5",
            params![title, subtitle, body, keywords, id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Content: {}", id)));
        }
        Ok(())
    })
}

/// Move a content node on the canvas.
pub fn update_position(pool: &DbPool, id: i64, x: f64, y: f64) -> DbResult<()> {
    pool.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE contents SET position_x = ?1, position_y = ?2 WHERE id = ?3",
            params![x, y, id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Content: {}", id)));
        }
        Ok(())
    })
}

/// Bump the view counter and return the new value.
pub fn increment_views(pool: &DbPool, id: i64) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.query_row(
            "UPDATE contents SET views = views + 1 WHERE id = ?1 RETURNING views",
            params![id],
            |row| row.get(0),
        )
        .map_err(not_found("Content", id))
    })
}

/// Delete a content row together with every edge touching it.
///
/// Returns the number of edges removed. Both deletes share one transaction.
pub fn delete_content_cascade(pool: &DbPool, id: i64) -> DbResult<usize> {
    let node_id = id.to_string();
    pool.with_tx(|tx| {
        let edges = tx.execute(
            "DELETE FROM edges WHERE source = ?1 OR target = ?1",
            params![node_id],
        )?;
        let deleted = tx.execute("DELETE FROM contents WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::NotFound(format!("Content: {}", id)));
        }
        Ok(edges)
    })
}
