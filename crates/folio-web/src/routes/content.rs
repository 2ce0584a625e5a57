//! Content graph handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use folio_core::content::{ContentNode, ContentPatch, NewContent, Position};
use folio_core::graph::{Edge, GraphView, PositionUpdate};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateContentRequest {
    #[serde(default)]
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub keywords: String,
    pub slug: Option<String>,
    pub position: Option<Position>,
    #[serde(default)]
    pub view: i64,
    /// Creation date chosen in the editor.
    pub date: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    #[serde(rename = "Password")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateContentRequest {
    pub id: Option<String>,
    pub position: Option<Position>,
    pub edge: Option<Edge>,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub content: Option<String>,
    pub keywords: Option<String>,
    #[serde(rename = "Password")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct DeleteRequest {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "Password")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct BatchPositionsRequest {
    pub updates: BTreeMap<String, PositionUpdate>,
}

pub async fn get_graph(State(state): State<AppState>) -> ApiResult<Json<GraphView>> {
    Ok(Json(state.graph.view()?))
}

pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ContentNode>> {
    Ok(Json(state.graph.lookup(&id)?))
}

/// Create a node (when `position` is given) and/or an edge (when `source`
/// and `target` are given).
pub async fn create_content(
    State(state): State<AppState>,
    Json(req): Json<CreateContentRequest>,
) -> ApiResult<Json<Value>> {
    state.credentials.verify(req.password.as_deref())?;

    let edge_pair = req.source.as_deref().zip(req.target.as_deref());
    if req.position.is_none() && edge_pair.is_none() {
        return Err(ApiError::bad_request("nothing to create: send a position or source and target"));
    }
    // A bad edge must not leave a half-applied create behind.
    if let Some((source, target)) = edge_pair {
        state.graph.check_connectable(source, target)?;
    }

    let node = match req.position {
        Some(position) => Some(state.graph.create_node(&NewContent {
            title: req.title.clone(),
            subtitle: req.subtitle.clone(),
            content: req.content.clone(),
            keywords: req.keywords.clone(),
            slug: req.slug.clone(),
            position: Some(position),
            view: req.view,
            created_at: req.date.clone(),
        })?),
        None => None,
    };

    let edge = match edge_pair {
        Some((source, target)) => Some(state.graph.connect(source, target)?),
        None => None,
    };

    Ok(Json(json!({
        "success": true,
        "contentId": node.as_ref().map(|n| n.id.clone()),
        "edgeId": edge.as_ref().map(|e| e.id.clone()),
        "content": node,
        "edge": edge,
    })))
}

/// Move a node, re-point an edge and/or edit the body.
///
/// Position and edge changes come from the canvas and need no password; body
/// edits do, and it is checked before anything is written.
pub async fn update_content(
    State(state): State<AppState>,
    Json(req): Json<UpdateContentRequest>,
) -> ApiResult<Json<Value>> {
    let patch = ContentPatch {
        title: req.title,
        subtitle: req.subtitle,
        content: req.content,
        keywords: req.keywords,
    };
    if !patch.is_empty() {
        state.credentials.verify(req.password.as_deref())?;
    }
    if req.position.is_none() && req.edge.is_none() && patch.is_empty() {
        return Err(ApiError::bad_request("nothing to update"));
    }

    let id = req.id.as_deref().filter(|id| !id.is_empty());
    let require_id = || id.ok_or_else(|| ApiError::bad_request("id is required"));

    if let Some(position) = req.position {
        state.graph.move_node(require_id()?, position)?;
    }
    if let Some(edge) = &req.edge {
        state.graph.update_edge(edge)?;
    }
    let content = if patch.is_empty() {
        None
    } else {
        Some(state.graph.update_node(require_id()?, &patch)?)
    };

    Ok(Json(json!({
        "success": true,
        "message": "Node updated successfully",
        "content": content,
    })))
}

pub async fn delete_content(
    State(state): State<AppState>,
    Json(req): Json<DeleteRequest>,
) -> ApiResult<Json<Value>> {
    state.credentials.verify(req.password.as_deref())?;

    match req.kind.as_str() {
        "content" => {
            let edges_removed = state.graph.delete_node(&req.id)?;
            Ok(Json(json!({
                "success": true,
                "message": "Content and related edges deleted",
                "edgesRemoved": edges_removed,
            })))
        }
        "edge" => {
            state.graph.disconnect(&req.id)?;
            Ok(Json(json!({ "success": true, "message": "Edge deleted" })))
        }
        other => Err(ApiError::bad_request(format!("invalid type: {}", other))),
    }
}

pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let view = state.graph.record_view(&id)?;
    Ok(Json(json!({ "success": true, "view": view })))
}

pub async fn update_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<PositionUpdate>,
) -> ApiResult<Json<Value>> {
    state.graph.move_node(&id, update.into())?;
    Ok(Json(json!({ "success": true, "message": "Position saved" })))
}

pub async fn batch_positions(
    State(state): State<AppState>,
    Json(req): Json<BatchPositionsRequest>,
) -> ApiResult<Json<Value>> {
    let outcome = state.graph.move_nodes(&req.updates);
    Ok(Json(json!({
        "success": true,
        "message": format!("{} positions saved", outcome.total()),
        "fileUpdateCount": outcome.file_update_count,
        "contentUpdateCount": outcome.content_update_count,
    })))
}
