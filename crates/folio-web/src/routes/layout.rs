//! Dashboard layout handlers.

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_layout(State(state): State<AppState>) -> ApiResult<Json<Option<Value>>> {
    Ok(Json(folio_core::layout::get_layout(&state.db)?))
}

pub async fn put_layout(
    State(state): State<AppState>,
    Json(layout): Json<Value>,
) -> ApiResult<Json<Value>> {
    folio_core::layout::save_layout(&state.db, &layout)?;
    Ok(Json(json!({ "success": true })))
}
