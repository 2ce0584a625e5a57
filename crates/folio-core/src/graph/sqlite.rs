//! `GraphStore` over the SQLite database.

use super::model::Edge;
use super::store::GraphStore;
use crate::content::{ContentNode, ContentPatch, NewContent, Position};
use crate::error::{FolioError, FolioResult};
use folio_db::queries::{contents as queries, edges as edge_queries};
use folio_db::DbPool;

/// Content ids in the database are integers in their canonical decimal form.
/// `"01"` or `"+1"` would name row 1 under a second spelling, so they are
/// treated as missing.
fn row_id(id: &str) -> FolioResult<i64> {
    match id.parse::<i64>() {
        Ok(n) if n.to_string() == id => Ok(n),
        _ => Err(FolioError::ContentNotFound(id.to_string())),
    }
}

impl GraphStore for DbPool {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn list_nodes(&self) -> FolioResult<Vec<ContentNode>> {
        let rows = queries::list_contents(self)?;
        Ok(rows.into_iter().map(ContentNode::from_row).collect())
    }

    fn get_node(&self, id: &str) -> FolioResult<ContentNode> {
        let row = queries::get_content(self, row_id(id)?)?;
        Ok(ContentNode::from_row(row))
    }

    fn find_by_slug(&self, slug: &str) -> FolioResult<ContentNode> {
        let row = queries::get_content_by_slug(self, slug)?;
        Ok(ContentNode::from_row(row))
    }

    fn slug_exists(&self, slug: &str) -> FolioResult<bool> {
        Ok(queries::slug_exists(self, slug)?)
    }

    fn insert_node(&self, new: &NewContent, slug: &str, position: Position) -> FolioResult<ContentNode> {
        let id = queries::insert_content(
            self,
            &queries::NewContentRow {
                title: &new.title,
                subtitle: new.subtitle.as_deref(),
                body: &new.content,
                slug,
                keywords: &new.keywords,
                position_x: position.x,
                position_y: position.y,
                views: new.view,
                created_at: new.created_at.as_deref(),
            },
        )?;
        let row = queries::get_content(self, id)?;
        Ok(ContentNode::from_row(row))
    }

    fn update_body(&self, id: &str, patch: &ContentPatch) -> FolioResult<ContentNode> {
        let id = row_id(id)?;
        let current = queries::get_content(self, id)?;
        queries::update_content_body(
            self,
            id,
            patch.title.as_deref().unwrap_or(&current.title),
            patch.subtitle.as_deref().or(current.subtitle.as_deref()),
            patch.content.as_deref().unwrap_or(&current.body),
            patch.keywords.as_deref().unwrap_or(&current.keywords),
        )?;
        let row = queries::get_content(self, id)?;
        Ok(ContentNode::from_row(row))
    }

    fn set_position(&self, id: &str, position: Position) -> FolioResult<()> {
        queries::update_position(self, row_id(id)?, position.x, position.y)?;
        Ok(())
    }

    fn delete_node(&self, id: &str) -> FolioResult<usize> {
        Ok(queries::delete_content_cascade(self, row_id(id)?)?)
    }

    fn increment_views(&self, id: &str) -> FolioResult<i64> {
        Ok(queries::increment_views(self, row_id(id)?)?)
    }

    fn list_edges(&self) -> FolioResult<Vec<Edge>> {
        let rows = edge_queries::list_edges(self)?;
        Ok(rows.into_iter().map(Edge::from_row).collect())
    }

    fn insert_edge(&self, edge: &Edge) -> FolioResult<Edge> {
        let row = edge_queries::insert_edge(self, &edge.id, &edge.source, &edge.target)?;
        Ok(Edge::from_row(row))
    }

    fn update_edge(&self, edge: &Edge) -> FolioResult<()> {
        edge_queries::update_edge(self, &edge.id, &edge.source, &edge.target)
            .map_err(|e| match e {
                folio_db::DbError::NotFound(_) => FolioError::EdgeNotFound(edge.id.clone()),
                e => e.into(),
            })
    }

    fn delete_edge(&self, id: &str) -> FolioResult<()> {
        edge_queries::delete_edge(self, id).map_err(|e| match e {
            folio_db::DbError::NotFound(_) => FolioError::EdgeNotFound(id.to_string()),
            e => e.into(),
        })
    }

    fn delete_edges_touching(&self, node_id: &str) -> FolioResult<usize> {
        Ok(edge_queries::delete_edges_touching(self, node_id)?)
    }

    fn replace_edges(&self, edges: &[Edge]) -> FolioResult<usize> {
        let rows: Vec<_> = edges.iter().map(Edge::to_row).collect();
        Ok(edge_queries::replace_edges(self, &rows)?)
    }
}
