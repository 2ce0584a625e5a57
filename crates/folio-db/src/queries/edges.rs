//! Edge queries.

use crate::pool::{not_found, DbError, DbPool, DbResult};
use rusqlite::params;

/// Edge row from database.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRow {
    pub id: String,
    pub source: String,
    pub target: String,
}

/// Insert an edge. An existing edge for the same pair is left untouched.
///
/// Returns the stored row, which may carry an older id than `id`.
pub fn insert_edge(pool: &DbPool, id: &str, source: &str, target: &str) -> DbResult<EdgeRow> {
    pool.with_conn(|conn| {
        conn.execute(
            "INSERT OR IGNORE INTO edges (id, source, target) VALUES (?1, ?2, ?3)",
            params![id, source, target],
        )?;
        conn.query_row(
            "SELECT id, source, target FROM edges WHERE source = ?1 AND target = ?2",
            params![source, target],
            |row| {
                Ok(EdgeRow {
                    id: row.get(0)?,
                    source: row.get(1)?,
                    target: row.get(2)?,
                })
            },
        )
        .map_err(not_found("Edge", id))
    })
}

/// List all edges in insertion order.
pub fn list_edges(pool: &DbPool) -> DbResult<Vec<EdgeRow>> {
    pool.with_conn(|conn| {
        let mut stmt = conn.prepare("SELECT id, source, target FROM edges ORDER BY rowid ASC")?;
        let rows = stmt.query_map([], |row| {
            Ok(EdgeRow {
                id: row.get(0)?,
                source: row.get(1)?,
                target: row.get(2)?,
            })
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    })
}

/// Point an existing edge at new endpoints.
pub fn update_edge(pool: &DbPool, id: &str, source: &str, target: &str) -> DbResult<()> {
    pool.with_conn(|conn| {
        let changed = conn
            .execute(
                "UPDATE edges SET source = ?1, target = ?2 WHERE id = ?3",
                params![source, target, id],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    DbError::Conflict(format!("edge {} -> {} already exists", source, target))
                }
                e => DbError::Connection(e),
            })?;
        if changed == 0 {
            return Err(DbError::NotFound(format!("Edge: {}", id)));
        }
        Ok(())
    })
}

/// Delete an edge by id.
pub fn delete_edge(pool: &DbPool, id: &str) -> DbResult<()> {
    pool.with_conn(|conn| {
        let deleted = conn.execute("DELETE FROM edges WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::NotFound(format!("Edge: {}", id)));
        }
        Ok(())
    })
}

/// Delete every edge with `node_id` as either endpoint.
pub fn delete_edges_touching(pool: &DbPool, node_id: &str) -> DbResult<usize> {
    pool.with_conn(|conn| {
        let deleted = conn.execute(
            "DELETE FROM edges WHERE source = ?1 OR target = ?1",
            params![node_id],
        )?;
        Ok(deleted)
    })
}

/// Replace the whole edge set in one transaction.
///
/// Duplicate pairs in `edges` collapse to the first occurrence.
pub fn replace_edges(pool: &DbPool, edges: &[EdgeRow]) -> DbResult<usize> {
    pool.with_tx(|tx| {
        tx.execute("DELETE FROM edges", [])?;
        let mut stmt = tx.prepare("INSERT OR IGNORE INTO edges (id, source, target) VALUES (?1, ?2, ?3)")?;
        let mut stored = 0;
        for edge in edges {
            stored += stmt.execute(params![edge.id, edge.source, edge.target])?;
        }
        Ok(stored)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_idempotent_per_pair() {
        let pool = crate::init_memory_pool().unwrap();
        let first = insert_edge(&pool, "a-b", "a", "b").unwrap();
        let second = insert_edge(&pool, "other", "a", "b").unwrap();

        assert_eq!(first, second);
        assert_eq!(list_edges(&pool).unwrap().len(), 1);
    }

    #[test]
    fn test_update_and_delete() {
        let pool = crate::init_memory_pool().unwrap();
        insert_edge(&pool, "a-b", "a", "b").unwrap();

        update_edge(&pool, "a-b", "a", "c").unwrap();
        let edges = list_edges(&pool).unwrap();
        assert_eq!(edges[0].id, "a-b");
        assert_eq!(edges[0].target, "c");

        insert_edge(&pool, "x-y", "x", "y").unwrap();
        assert_eq!(delete_edges_touching(&pool, "x").unwrap(), 1);

        delete_edge(&pool, "a-b").unwrap();
        assert!(list_edges(&pool).unwrap().iter().all(|e| e.id != "a-b"));
        assert!(matches!(delete_edge(&pool, "a-b"), Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_replace_edges() {
        let pool = crate::init_memory_pool().unwrap();
        insert_edge(&pool, "x-y", "x", "y").unwrap();

        let edges = vec![
            EdgeRow { id: "a-b".into(), source: "a".into(), target: "b".into() },
            EdgeRow { id: "b-c".into(), source: "b".into(), target: "c".into() },
            EdgeRow { id: "dup".into(), source: "a".into(), target: "b".into() },
        ];
        assert_eq!(replace_edges(&pool, &edges).unwrap(), 2);

        let ids: Vec<String> = list_edges(&pool).unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["a-b", "b-c"]);
    }
}
