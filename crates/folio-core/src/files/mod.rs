//! Task files: `.txt` JSON documents surfaced as `file-<stem>` graph nodes.

pub mod watcher;

use crate::content::{ContentNode, NodeOrigin, Position};
use crate::error::{FolioError, FolioResult};
use chrono::{DateTime, Utc};
use folio_db::flatfile::TaskDocument;
use folio_db::{DbError, TaskDir};
use serde::{Deserialize, Serialize};

/// Node-id prefix for task-file nodes.
pub const FILE_NODE_PREFIX: &str = "file-";

/// Where a task file without coordinates is drawn until the watcher places it.
const FALLBACK_POSITION: Position = Position { x: 100.0, y: 100.0 };

/// Node id for a task file name (`notes.txt` -> `file-notes`).
pub fn file_node_id(file_name: &str) -> String {
    format!("{}{}", FILE_NODE_PREFIX, TaskDir::stem(file_name))
}

/// Task file name for a node id, if the id names a task file.
pub fn file_name_for_node(node_id: &str) -> Option<String> {
    node_id
        .strip_prefix(FILE_NODE_PREFIX)
        .filter(|stem| !stem.is_empty())
        .map(|stem| format!("{}.txt", stem))
}

/// Keep letters, digits and whitespace; trim the ends.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Build a graph node from a task document.
pub fn node_from_document(file_name: &str, doc: &TaskDocument) -> ContentNode {
    let id = file_node_id(file_name);
    ContentNode {
        id: id.clone(),
        title: doc
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| TaskDir::stem(file_name).to_string()),
        subtitle: None,
        content: doc.content.clone().unwrap_or_default(),
        slug: id,
        keywords: doc.keywords.clone().unwrap_or_default(),
        view: 0,
        locked: false,
        fixed: false,
        position: doc
            .position()
            .map(|(x, y)| Position::new(x, y))
            .unwrap_or(FALLBACK_POSITION),
        created_at: doc
            .created_at
            .clone()
            .unwrap_or_else(|| Utc::now().to_rfc3339()),
        updated_at: doc.updated_at.clone(),
        origin: NodeOrigin::File,
    }
}

fn map_missing(name: &str) -> impl FnOnce(DbError) -> FolioError + '_ {
    move |e| match e {
        DbError::NotFound(_) => FolioError::TaskFileNotFound(name.to_string()),
        e => e.into(),
    }
}

/// All task files that parse, as graph nodes. Unreadable files are skipped.
pub fn list_file_nodes(tasks: &TaskDir) -> FolioResult<Vec<ContentNode>> {
    let mut nodes = Vec::new();
    for name in tasks.list()? {
        match tasks.read_document(&name) {
            Ok(doc) => nodes.push(node_from_document(&name, &doc)),
            Err(e) => tracing::warn!(file = %name, error = %e, "Skipping unreadable task file"),
        }
    }
    Ok(nodes)
}

/// Load a single task-file node.
pub fn load_file_node(tasks: &TaskDir, file_name: &str) -> FolioResult<ContentNode> {
    let doc = tasks.read_document(file_name).map_err(map_missing(file_name))?;
    Ok(node_from_document(file_name, &doc))
}

/// Request to create or overwrite a task file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTxt {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub original_file_name: Option<String>,
}

/// Result of [`save_txt`].
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedTxt {
    pub file_name: String,
    pub position: Position,
    pub created: bool,
}

/// Write a task file.
///
/// Overwriting an existing file keeps its position and `created_at`; a new
/// file gets a random position.
pub fn save_txt(tasks: &TaskDir, req: &SaveTxt) -> FolioResult<SavedTxt> {
    if req.title.trim().is_empty() || req.content.is_empty() {
        return Err(FolioError::validation("title and content are required"));
    }

    let file_name = match req.original_file_name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => {
            let sanitized = sanitize_title(&req.title);
            if sanitized.is_empty() {
                return Err(FolioError::validation("title has no usable characters"));
            }
            format!("{}.txt", sanitized)
        }
    };
    tasks.resolve(&file_name)?;

    let existing = if tasks.exists(&file_name) {
        match tasks.read_document(&file_name) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "Existing task file unreadable, replacing");
                None
            }
        }
    } else {
        None
    };

    let position = existing
        .as_ref()
        .and_then(TaskDocument::position)
        .map(|(x, y)| Position::new(x, y))
        .unwrap_or_else(Position::random);
    let now = Utc::now().to_rfc3339();

    let mut doc = existing.clone().unwrap_or_default();
    doc.title = Some(req.title.clone());
    doc.keywords = Some(req.keywords.clone().unwrap_or_default());
    doc.content = Some(req.content.clone());
    doc.created_at = doc.created_at.take().or_else(|| Some(now.clone()));
    doc.updated_at = Some(now);
    doc.set_position(position.x, position.y);

    tasks.write_document(&file_name, &doc)?;
    tracing::info!(file = %file_name, x = position.x, y = position.y, "Saved task file");

    Ok(SavedTxt {
        file_name,
        position,
        created: existing.is_none(),
    })
}

/// Listing entry for the task-file manager.
#[derive(Debug, Clone, Serialize)]
pub struct TxtFileSummary {
    pub name: String,
    pub title: String,
    pub created_at: String,
    pub updated_at: String,
    pub size: u64,
}

fn system_time_rfc3339(time: Option<std::time::SystemTime>) -> String {
    time.map(|t| DateTime::<Utc>::from(t).to_rfc3339())
        .unwrap_or_default()
}

/// Every task file, newest `updated_at` first.
///
/// Timestamps come from the document when present and from the filesystem
/// otherwise.
pub fn list_txt_files(tasks: &TaskDir) -> FolioResult<Vec<TxtFileSummary>> {
    let mut files = Vec::new();
    for name in tasks.list()? {
        let info = match tasks.info(&name) {
            Ok(info) => info,
            Err(_) => continue,
        };
        let doc = tasks.read_document(&name).ok();
        let title = doc
            .as_ref()
            .and_then(|d| d.title.clone())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| TaskDir::stem(&name).to_string());
        let created_at = doc
            .as_ref()
            .and_then(|d| d.created_at.clone())
            .unwrap_or_else(|| system_time_rfc3339(info.created.or(info.modified)));
        let updated_at = doc
            .as_ref()
            .and_then(|d| d.updated_at.clone())
            .unwrap_or_else(|| system_time_rfc3339(info.modified));

        files.push(TxtFileSummary {
            name,
            title,
            created_at,
            updated_at,
            size: info.size,
        });
    }

    files.sort_by(|a, b| sort_key(&b.updated_at).cmp(&sort_key(&a.updated_at)));
    Ok(files)
}

fn sort_key(timestamp: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(timestamp)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Raw contents of a task file.
pub fn read_txt_file(tasks: &TaskDir, name: &str) -> FolioResult<String> {
    tasks.read_raw(name).map_err(map_missing(name))
}

/// Update title/content/keywords of a task-file node in place.
pub fn update_file_node(
    tasks: &TaskDir,
    file_name: &str,
    patch: &crate::content::ContentPatch,
) -> FolioResult<ContentNode> {
    let mut doc = tasks.read_document(file_name).map_err(map_missing(file_name))?;
    if let Some(title) = &patch.title {
        doc.title = Some(title.clone());
    }
    if let Some(content) = &patch.content {
        doc.content = Some(content.clone());
    }
    if let Some(keywords) = &patch.keywords {
        doc.keywords = Some(keywords.clone());
    }
    doc.updated_at = Some(Utc::now().to_rfc3339());
    tasks.write_document(file_name, &doc)?;
    Ok(node_from_document(file_name, &doc))
}

/// Move a task-file node.
pub fn move_file_node(tasks: &TaskDir, file_name: &str, position: Position) -> FolioResult<()> {
    let mut doc = tasks.read_document(file_name).map_err(map_missing(file_name))?;
    doc.set_position(position.x, position.y);
    tasks.write_document(file_name, &doc)?;
    Ok(())
}

/// Delete a task file.
pub fn remove_file_node(tasks: &TaskDir, file_name: &str) -> FolioResult<()> {
    tasks.remove(file_name).map_err(map_missing(file_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn task_dir() -> (TempDir, TaskDir) {
        let dir = TempDir::new().unwrap();
        let tasks = TaskDir::open(dir.path()).unwrap();
        (dir, tasks)
    }

    #[test]
    fn test_node_id_mapping() {
        assert_eq!(file_node_id("notes.txt"), "file-notes");
        assert_eq!(file_name_for_node("file-notes").as_deref(), Some("notes.txt"));
        assert_eq!(file_name_for_node("file-"), None);
        assert_eq!(file_name_for_node("12"), None);
    }

    #[test]
    fn test_sanitize_title() {
        assert_eq!(sanitize_title("  My: first/post?! "), "My firstpost");
        assert_eq!(sanitize_title("회의 노트 #3"), "회의 노트 3");
    }

    #[test]
    fn test_save_requires_title_and_content() {
        let (_dir, tasks) = task_dir();
        let req = SaveTxt {
            title: "Only title".into(),
            ..Default::default()
        };
        assert!(matches!(save_txt(&tasks, &req), Err(FolioError::ValidationError(_))));
    }

    #[test]
    fn test_save_new_file_gets_random_position() {
        let (_dir, tasks) = task_dir();
        let saved = save_txt(
            &tasks,
            &SaveTxt {
                title: "Weekly plan!".into(),
                content: "- ship it".into(),
                keywords: Some("plan".into()),
                original_file_name: None,
            },
        )
        .unwrap();

        assert_eq!(saved.file_name, "Weekly plan.txt");
        assert!(saved.created);
        let doc = tasks.read_document("Weekly plan.txt").unwrap();
        assert_eq!(doc.position(), Some((saved.position.x, saved.position.y)));
        assert!(doc.created_at.is_some());
    }

    #[test]
    fn test_overwrite_keeps_position_and_created_at() {
        let (_dir, tasks) = task_dir();
        std::fs::write(
            tasks.root().join("plan.txt"),
            r#"{"title":"Plan","content":"old","created_at":"2024-01-01T00:00:00Z","position_x":321,"position_y":123}"#,
        )
        .unwrap();

        let saved = save_txt(
            &tasks,
            &SaveTxt {
                title: "Plan v2".into(),
                content: "new".into(),
                keywords: None,
                original_file_name: Some("plan.txt".into()),
            },
        )
        .unwrap();

        assert!(!saved.created);
        assert_eq!(saved.position, Position::new(321.0, 123.0));
        let doc = tasks.read_document("plan.txt").unwrap();
        assert_eq!(doc.created_at.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert_eq!(doc.content.as_deref(), Some("new"));
    }

    #[test]
    fn test_save_rejects_path_escape() {
        let (_dir, tasks) = task_dir();
        let err = save_txt(
            &tasks,
            &SaveTxt {
                title: "x".into(),
                content: "y".into(),
                keywords: None,
                original_file_name: Some("../escape.txt".into()),
            },
        )
        .unwrap_err();
        assert!(err.is_bad_request());
    }

    #[test]
    fn test_list_sorted_newest_first_with_fallbacks() {
        let (_dir, tasks) = task_dir();
        std::fs::write(
            tasks.root().join("old.txt"),
            r#"{"title":"Old","content":"a","updated_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        std::fs::write(
            tasks.root().join("new.txt"),
            r#"{"title":"New","content":"b","updated_at":"2025-06-01T00:00:00Z"}"#,
        )
        .unwrap();
        std::fs::write(tasks.root().join("raw.txt"), "not json at all").unwrap();

        let files = list_txt_files(&tasks).unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        // raw.txt falls back to its mtime, which is "now".
        assert_eq!(names, vec!["raw.txt", "new.txt", "old.txt"]);
        assert_eq!(files[0].title, "raw");
        assert_eq!(files[0].size, "not json at all".len() as u64);
    }

    #[test]
    fn test_file_nodes_skip_invalid_documents() {
        let (_dir, tasks) = task_dir();
        std::fs::write(tasks.root().join("ok.txt"), r#"{"content":"body","position_x":5,"position_y":6}"#).unwrap();
        std::fs::write(tasks.root().join("broken.txt"), "{").unwrap();

        let nodes = list_file_nodes(&tasks).unwrap();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "file-ok");
        assert_eq!(nodes[0].title, "ok");
        assert_eq!(nodes[0].position, Position::new(5.0, 6.0));
        assert_eq!(nodes[0].origin, NodeOrigin::File);
    }

    #[test]
    fn test_read_missing_file() {
        let (_dir, tasks) = task_dir();
        assert!(matches!(
            read_txt_file(&tasks, "nope.txt"),
            Err(FolioError::TaskFileNotFound(_))
        ));
    }
}
