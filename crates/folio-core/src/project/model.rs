//! Project gallery models.

use folio_db::queries::projects::ProjectRow;
use serde::{Deserialize, Serialize};

/// A showcased project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub company: String,
    pub link: String,
    pub image_url: String,
    pub created_at: String,
}

impl Project {
    /// Create from database row.
    pub fn from_row(row: ProjectRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            company: row.company,
            link: row.link,
            image_url: row.image_url,
            created_at: row.created_at,
        }
    }
}

/// Input for a new project. The image has already been uploaded.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub image_url: String,
}

/// Replacement text fields for an existing project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub name: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub link: String,
}
