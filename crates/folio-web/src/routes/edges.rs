//! Bulk edge save from the canvas.

use axum::{extract::State, Json};
use folio_core::graph::Edge;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ReplaceEdgesRequest {
    pub edges: Vec<Edge>,
}

pub async fn replace_edges(
    State(state): State<AppState>,
    Json(req): Json<ReplaceEdgesRequest>,
) -> ApiResult<Json<Value>> {
    let count = state.graph.replace_edges(&req.edges)?;
    Ok(Json(json!({
        "success": true,
        "message": "Edges saved",
        "count": count,
    })))
}
