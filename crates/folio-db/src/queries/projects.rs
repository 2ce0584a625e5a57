//! Project gallery queries.

use crate::pool::{not_found, DbError, DbPool, DbResult};
use rusqlite::params;

/// Project row from database.
#[derive(Debug, Clone)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
    pub company: String,
    pub link: String,
    pub image_url: String,
    pub created_at: String,
}

/// Create a new project and return its id.
pub fn create_project(
    pool: &DbPool,
    name: &str,
    company: &str,
    link: &str,
    image_url: &str,
) -> DbResult<i64> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT INTO projects (name, company, link, image_url) VALUES (?1, ?2, ?3, ?4)",
            params![name, company, link, image_url],
        )?;
        Ok(conn.last_insert_rowid())
    })
}

/// Get a project by ID.
pub fn get_project(pool: &DbPool, id: i64) -> DbResult<ProjectRow> {
    pool.with_conn(|conn| {
        conn.query_row(
            "SELECT id, name, company, link, image_url, created_at FROM projects WHERE id = ?1",
            params![id],
            |row| {
                Ok(ProjectRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    company: row.get(2)?,
                    link: row.get(3)?,
                    image_url: row.get(4)?,
                    created_at: row.get(5)?,
                })
            },
        )
        .map_err(not_found("Project", id))
    })
}

/// List all projects, newest first.
pub fn list_projects(pool: &DbPool) -> DbResult<Vec<ProjectRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare(
            "SELECT id, name, company, link, image_url, created_at
             FROM projects ORDER BY created_at DESC, id DESC",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ProjectRow {
                id: row.get(0)?,
                name: row.get(1)?,
                company: row.get(2)?,
                link: row.get(3)?,
                image_url: row.get(4)?,
                created_at: row.get(5)?,
            })
        })?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Update the text fields of a project.
pub fn update_project(pool: &DbPool, id: i64, name: &str, company: &str, link: &str) -> DbResult<()> {
    pool.with_conn(|conn| {
        let changed = conn.execute(
            "UPDATE projects SET name = ?1, company = ?2, link = ?3 WHERE id = ?4",
            params![name, company, link, id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Project: {}", id)));
        }
        Ok(())
    })
}

/// Delete a project.
pub fn delete_project(pool: &DbPool, id: i64) -> DbResult<()> {
    pool.with_conn(|conn| {
        let deleted = conn.execute("DELETE FROM projects WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::NotFound(format!("Project: {}", id)));
        }
        Ok(())
    })
}
