//! Project gallery.

pub mod model;

use crate::error::{FolioError, FolioResult};
use folio_db::queries::projects as queries;
use folio_db::{DbError, DbPool};
use model::{NewProject, Project, ProjectUpdate};
use tracing::info;

fn map_missing(id: i64) -> impl FnOnce(DbError) -> FolioError {
    move |e| match e {
        DbError::NotFound(_) => FolioError::ProjectNotFound(id.to_string()),
        e => e.into(),
    }
}

/// List all projects, newest first.
pub fn list_projects(pool: &DbPool) -> FolioResult<Vec<Project>> {
    let rows = queries::list_projects(pool)?;
    Ok(rows.into_iter().map(Project::from_row).collect())
}

pub fn get_project(pool: &DbPool, id: i64) -> FolioResult<Project> {
    let row = queries::get_project(pool, id).map_err(map_missing(id))?;
    Ok(Project::from_row(row))
}

/// Create a project. The name is required.
pub fn create_project(pool: &DbPool, new: &NewProject) -> FolioResult<Project> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(FolioError::validation("project name is required"));
    }

    let id = queries::create_project(pool, name, new.company.trim(), new.link.trim(), &new.image_url)?;
    info!(id, name, "Created project");
    get_project(pool, id)
}

pub fn update_project(pool: &DbPool, id: i64, update: &ProjectUpdate) -> FolioResult<Project> {
    let name = update.name.trim();
    if name.is_empty() {
        return Err(FolioError::validation("project name is required"));
    }

    queries::update_project(pool, id, name, update.company.trim(), update.link.trim())
        .map_err(map_missing(id))?;
    get_project(pool, id)
}

pub fn delete_project(pool: &DbPool, id: i64) -> FolioResult<()> {
    queries::delete_project(pool, id).map_err(map_missing(id))?;
    info!(id, "Deleted project");
    Ok(())
}
