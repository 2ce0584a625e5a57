//! Project gallery handlers.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use folio_core::project::{
    self,
    model::{NewProject, ProjectUpdate},
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::images::{multipart_error, FilePart};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UpdateProjectRequest {
    #[serde(alias = "projectName")]
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub link: String,
    #[serde(rename = "Password", alias = "password")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct PasswordRequest {
    #[serde(rename = "Password", alias = "password")]
    pub password: Option<String>,
}

pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let projects = project::list_projects(&state.db)?;
    Ok(Json(json!({ "projects": projects })))
}

/// Multipart form: `image`, `projectName`, `company`, `link`, `password`.
///
/// The password is checked before the image is uploaded.
pub async fn create_project(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut new = NewProject::default();
    let mut password = None;
    let mut image = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => image = Some(FilePart::read(field).await?),
            "projectName" => new.name = field.text().await.map_err(multipart_error)?,
            "company" => new.company = field.text().await.map_err(multipart_error)?,
            "link" => new.link = field.text().await.map_err(multipart_error)?,
            "password" => password = Some(field.text().await.map_err(multipart_error)?),
            other => tracing::debug!(field = other, "Ignoring form field"),
        }
    }

    state.credentials.verify(password.as_deref())?;
    let image = image
        .filter(|part| !part.bytes.is_empty())
        .ok_or_else(|| ApiError::bad_request("no image uploaded"))?;
    if new.name.trim().is_empty() {
        return Err(ApiError::bad_request("project name is required"));
    }

    new.image_url = image.store(&state).await?.url;
    let created = project::create_project(&state.db, &new)?;

    Ok(Json(json!({
        "success": true,
        "insertedId": created.id,
        "project": created,
    })))
}

pub async fn update_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateProjectRequest>,
) -> ApiResult<Json<Value>> {
    state.credentials.verify(req.password.as_deref())?;
    let updated = project::update_project(
        &state.db,
        id,
        &ProjectUpdate {
            name: req.name,
            company: req.company,
            link: req.link,
        },
    )?;
    Ok(Json(json!({ "success": true, "project": updated })))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PasswordRequest>,
) -> ApiResult<Json<Value>> {
    state.credentials.verify(req.password.as_deref())?;
    project::delete_project(&state.db, id)?;
    Ok(Json(json!({ "success": true, "message": "Project deleted" })))
}
