//! Task-file handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use folio_core::files::{self, SaveTxt, TxtFileSummary};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn save_txt(
    State(state): State<AppState>,
    Json(req): Json<SaveTxt>,
) -> ApiResult<Json<Value>> {
    let saved = files::save_txt(state.graph.tasks(), &req)?;
    Ok(Json(json!({
        "success": true,
        "message": "File saved",
        "fileName": saved.file_name,
        "position": saved.position,
        "created": saved.created,
    })))
}

pub async fn list_txt_files(State(state): State<AppState>) -> ApiResult<Json<Vec<TxtFileSummary>>> {
    Ok(Json(files::list_txt_files(state.graph.tasks())?))
}

pub async fn read_txt_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<Value>> {
    let content = files::read_txt_file(state.graph.tasks(), &filename)?;
    Ok(Json(json!({ "content": content })))
}
