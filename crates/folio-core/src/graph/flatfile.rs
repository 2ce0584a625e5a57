//! `GraphStore` over `content.json` / `edges.json`.

use super::model::Edge;
use super::store::GraphStore;
use crate::content::{ContentNode, ContentPatch, NewContent, Position};
use crate::error::{FolioError, FolioResult};
use folio_db::flatfile::ContentRecord;
use folio_db::{DbError, FlatFileStore};

impl GraphStore for FlatFileStore {
    fn backend(&self) -> &'static str {
        "flatfile"
    }

    fn list_nodes(&self) -> FolioResult<Vec<ContentNode>> {
        Ok(self
            .list_contents()
            .into_iter()
            .map(ContentNode::from_record)
            .collect())
    }

    fn get_node(&self, id: &str) -> FolioResult<ContentNode> {
        Ok(ContentNode::from_record(self.get_content(id)?))
    }

    fn find_by_slug(&self, slug: &str) -> FolioResult<ContentNode> {
        Ok(ContentNode::from_record(self.get_content_by_slug(slug)?))
    }

    fn slug_exists(&self, slug: &str) -> FolioResult<bool> {
        Ok(FlatFileStore::slug_exists(self, slug))
    }

    fn insert_node(&self, new: &NewContent, slug: &str, position: Position) -> FolioResult<ContentNode> {
        let now = chrono::Utc::now().to_rfc3339();
        let record = ContentRecord {
            id: String::new(),
            node_type: "custom".to_string(),
            title: new.title.clone(),
            subtitle: new.subtitle.clone(),
            content: new.content.clone(),
            position_x: position.x,
            position_y: position.y,
            lock: false,
            fixed: false,
            slug: slug.to_string(),
            keyword: new.keywords.clone(),
            view: new.view,
            created_at: new.created_at.clone().unwrap_or_else(|| now.clone()),
            updated_at: Some(now),
        };
        Ok(ContentNode::from_record(self.insert_content(record)?))
    }

    fn update_body(&self, id: &str, patch: &ContentPatch) -> FolioResult<ContentNode> {
        let record = self.update_content(id, |record| {
            if let Some(title) = &patch.title {
                record.title = title.clone();
            }
            if let Some(subtitle) = &patch.subtitle {
                record.subtitle = Some(subtitle.clone());
            }
            if let Some(content) = &patch.content {
                record.content = content.clone();
            }
            if let Some(keywords) = &patch.keywords {
                record.keyword = keywords.clone();
            }
            record.updated_at = Some(chrono::Utc::now().to_rfc3339());
        })?;
        Ok(ContentNode::from_record(record))
    }

    fn set_position(&self, id: &str, position: Position) -> FolioResult<()> {
        self.update_content(id, |record| {
            record.position_x = position.x;
            record.position_y = position.y;
        })?;
        Ok(())
    }

    fn delete_node(&self, id: &str) -> FolioResult<usize> {
        Ok(self.delete_content_cascade(id)?)
    }

    fn increment_views(&self, id: &str) -> FolioResult<i64> {
        let record = self.update_content(id, |record| record.view += 1)?;
        Ok(record.view)
    }

    fn list_edges(&self) -> FolioResult<Vec<Edge>> {
        Ok(FlatFileStore::list_edges(self)
            .into_iter()
            .map(Edge::from_record)
            .collect())
    }

    fn insert_edge(&self, edge: &Edge) -> FolioResult<Edge> {
        let record = FlatFileStore::insert_edge(self, &edge.id, &edge.source, &edge.target)?;
        Ok(Edge::from_record(record))
    }

    fn update_edge(&self, edge: &Edge) -> FolioResult<()> {
        FlatFileStore::update_edge(self, &edge.id, &edge.source, &edge.target).map_err(|e| match e {
            DbError::NotFound(_) => FolioError::EdgeNotFound(edge.id.clone()),
            e => e.into(),
        })
    }

    fn delete_edge(&self, id: &str) -> FolioResult<()> {
        FlatFileStore::delete_edge(self, id).map_err(|e| match e {
            DbError::NotFound(_) => FolioError::EdgeNotFound(id.to_string()),
            e => e.into(),
        })
    }

    fn delete_edges_touching(&self, node_id: &str) -> FolioResult<usize> {
        Ok(FlatFileStore::delete_edges_touching(self, node_id)?)
    }

    fn replace_edges(&self, edges: &[Edge]) -> FolioResult<usize> {
        let records: Vec<_> = edges.iter().map(Edge::to_record).collect();
        Ok(FlatFileStore::replace_edges(self, &records)?)
    }
}
