//! Task-directory watcher that places new files on the canvas.
//!
//! A poll loop rather than OS notifications: the directory is small and the
//! only job is to give freshly dropped files a random position.

use crate::content::Position;
use crate::error::FolioResult;
use folio_db::TaskDir;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::future::Future;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Poll cadence and write-settle threshold.
#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    pub poll_interval: Duration,
    /// A file is left alone until its mtime is at least this old.
    pub stability: Duration,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            stability: Duration::from_secs(1),
        }
    }
}

/// What [`ensure_position`] did to a file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PatchOutcome {
    /// Both coordinates were already numbers.
    AlreadyPlaced,
    /// Coordinates were added to a valid document.
    Placed(Position),
    /// The file was not a JSON object and was rewritten around its raw text.
    Rewritten(Position),
}

impl PatchOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, PatchOutcome::AlreadyPlaced)
    }
}

fn has_numeric_position(object: &Map<String, Value>) -> bool {
    ["position_x", "position_y"]
        .iter()
        .all(|key| object.get(*key).is_some_and(Value::is_number))
}

fn insert_position(object: &mut Map<String, Value>, position: Position) {
    // Whole numbers, matching what editors write.
    object.insert("position_x".into(), Value::from(position.x as i64));
    object.insert("position_y".into(), Value::from(position.y as i64));
}

/// Make sure the task file `name` carries numeric coordinates.
pub fn ensure_position(tasks: &TaskDir, name: &str) -> FolioResult<PatchOutcome> {
    let raw = tasks.read_raw(name)?;

    let outcome = match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(mut object)) => {
            if has_numeric_position(&object) {
                return Ok(PatchOutcome::AlreadyPlaced);
            }
            let position = Position::random();
            insert_position(&mut object, position);
            write_object(tasks, name, object)?;
            PatchOutcome::Placed(position)
        }
        _ => {
            let position = Position::random();
            let mut object = Map::new();
            object.insert("title".into(), Value::from(TaskDir::stem(name)));
            object.insert("content".into(), Value::from(raw));
            object.insert("keywords".into(), Value::from(""));
            insert_position(&mut object, position);
            write_object(tasks, name, object)?;
            PatchOutcome::Rewritten(position)
        }
    };
    Ok(outcome)
}

fn write_object(tasks: &TaskDir, name: &str, object: Map<String, Value>) -> FolioResult<()> {
    tasks.write_document(name, &Value::Object(object))?;
    Ok(())
}

/// Patch every existing task file. Returns how many files changed.
pub fn initialize_file_nodes(tasks: &TaskDir) -> FolioResult<usize> {
    let mut changed = 0;
    for name in tasks.list()? {
        match ensure_position(tasks, &name) {
            Ok(outcome) if outcome.changed() => {
                info!(file = %name, ?outcome, "Initialized task file position");
                changed += 1;
            }
            Ok(_) => {}
            Err(e) => warn!(file = %name, error = %e, "Failed to initialize task file"),
        }
    }
    Ok(changed)
}

/// Poll-based watcher state.
pub struct FileWatcher {
    tasks: TaskDir,
    config: WatcherConfig,
    known: HashSet<String>,
}

impl FileWatcher {
    pub fn new(tasks: TaskDir, config: WatcherConfig) -> Self {
        Self {
            tasks,
            config,
            known: HashSet::new(),
        }
    }

    /// Treat every file currently present as already handled.
    pub fn prime(&mut self) -> FolioResult<()> {
        self.known = self.tasks.list()?.into_iter().collect();
        Ok(())
    }

    /// One poll pass at wall-clock `now`. Returns the files that were patched.
    pub fn scan_once(&mut self, now: SystemTime) -> FolioResult<Vec<(String, PatchOutcome)>> {
        let present: HashSet<String> = self.tasks.list()?.into_iter().collect();

        for gone in self.known.difference(&present) {
            info!(file = %gone, "Task file removed");
        }
        self.known.retain(|name| present.contains(name));

        let mut patched = Vec::new();
        for name in present {
            if self.known.contains(&name) {
                continue;
            }
            if !self.settled(&name, now) {
                debug!(file = %name, "Task file still being written");
                continue;
            }

            match ensure_position(&self.tasks, &name) {
                Ok(outcome) => {
                    if outcome.changed() {
                        info!(file = %name, ?outcome, "Placed new task file");
                        patched.push((name.clone(), outcome));
                    }
                }
                Err(e) => error!(file = %name, error = %e, "Failed to place task file"),
            }
            self.known.insert(name);
        }
        Ok(patched)
    }

    fn settled(&self, name: &str, now: SystemTime) -> bool {
        match self.tasks.info(name).ok().and_then(|info| info.modified) {
            Some(modified) => now
                .duration_since(modified)
                .map(|age| age >= self.config.stability)
                .unwrap_or(false),
            None => true,
        }
    }

    /// Initialize existing files, then poll until `shutdown` resolves.
    pub async fn run<S>(mut self, shutdown: S)
    where
        S: Future<Output = ()> + Send,
    {
        match initialize_file_nodes(&self.tasks) {
            Ok(n) => info!(changed = n, dir = %self.tasks.root().display(), "Task directory initialized"),
            Err(e) => error!(error = %e, "Failed to initialize task directory"),
        }
        if let Err(e) = self.prime() {
            error!(error = %e, "Failed to list task directory");
        }

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    if let Err(e) = self.scan_once(SystemTime::now()) {
                        error!(error = %e, "Task directory scan failed");
                    }
                }
            }
        }
        debug!("Task watcher stopped");
    }
}

/// Spawn a watcher that runs for the life of the runtime.
pub fn spawn(tasks: TaskDir, config: WatcherConfig) -> JoinHandle<()> {
    let watcher = FileWatcher::new(tasks, config);
    tokio::spawn(watcher.run(std::future::pending()))
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

    fn read_json(tasks: &TaskDir, name: &str) -> Value {
        serde_json::from_str(&tasks.read_raw(name).unwrap()).unwrap()
    }

    #[test]
    fn test_existing_position_is_left_alone() {
        let (_dir, tasks) = task_dir();
        let body = r#"{"title":"t","position_x":1,"position_y":2}"#;
        std::fs::write(tasks.root().join("a.txt"), body).unwrap();

        assert_eq!(ensure_position(&tasks, "a.txt").unwrap(), PatchOutcome::AlreadyPlaced);
        assert_eq!(tasks.read_raw("a.txt").unwrap(), body);
    }

    #[test]
    fn test_non_numeric_position_is_replaced() {
        let (_dir, tasks) = task_dir();
        std::fs::write(
            tasks.root().join("a.txt"),
            r#"{"title":"t","position_x":null,"position_y":"7","author":"lee"}"#,
        )
        .unwrap();

        let outcome = ensure_position(&tasks, "a.txt").unwrap();
        assert!(matches!(outcome, PatchOutcome::Placed(_)));

        let json = read_json(&tasks, "a.txt");
        let x = json["position_x"].as_f64().unwrap();
        let y = json["position_y"].as_f64().unwrap();
        assert!((100.0..900.0).contains(&x));
        assert!((100.0..700.0).contains(&y));
        assert_eq!(json["author"], "lee");
    }

    #[test]
    fn test_invalid_json_is_wrapped() {
        let (_dir, tasks) = task_dir();
        std::fs::write(tasks.root().join("scratch.txt"), "remember the milk").unwrap();

        let outcome = ensure_position(&tasks, "scratch.txt").unwrap();
        assert!(matches!(outcome, PatchOutcome::Rewritten(_)));

        let json = read_json(&tasks, "scratch.txt");
        assert_eq!(json["title"], "scratch");
        assert_eq!(json["content"], "remember the milk");
        assert_eq!(json["keywords"], "");
        assert!(json["position_x"].is_number());
    }

    #[test]
    fn test_initialize_counts_changes() {
        let (_dir, tasks) = task_dir();
        std::fs::write(tasks.root().join("a.txt"), r#"{"position_x":1,"position_y":2}"#).unwrap();
        std::fs::write(tasks.root().join("b.txt"), r#"{"title":"b"}"#).unwrap();
        std::fs::write(tasks.root().join("c.txt"), "plain").unwrap();

        assert_eq!(initialize_file_nodes(&tasks).unwrap(), 2);
        assert_eq!(initialize_file_nodes(&tasks).unwrap(), 0);
    }

    #[test]
    fn test_scan_waits_for_stable_files() {
        let (_dir, tasks) = task_dir();
        let mut watcher = FileWatcher::new(
            tasks.clone(),
            WatcherConfig {
                poll_interval: Duration::from_millis(10),
                stability: Duration::from_secs(60),
            },
        );
        watcher.prime().unwrap();

        std::fs::write(tasks.root().join("new.txt"), r#"{"title":"new"}"#).unwrap();

        // Freshly written: too young to touch.
        let patched = watcher.scan_once(SystemTime::now()).unwrap();
        assert!(patched.is_empty());
        assert!(read_json(&tasks, "new.txt").get("position_x").is_none());

        // Two minutes later it has settled.
        let later = SystemTime::now() + Duration::from_secs(120);
        let patched = watcher.scan_once(later).unwrap();
        assert_eq!(patched.len(), 1);
        assert_eq!(patched[0].0, "new.txt");

        // Already known: not patched again.
        assert!(watcher.scan_once(later).unwrap().is_empty());
    }

    #[test]
    fn test_primed_files_are_not_rescanned() {
        let (_dir, tasks) = task_dir();
        std::fs::write(tasks.root().join("old.txt"), r#"{"title":"old"}"#).unwrap();

        let mut watcher = FileWatcher::new(tasks.clone(), WatcherConfig::default());
        watcher.prime().unwrap();

        let later = SystemTime::now() + Duration::from_secs(120);
        assert!(watcher.scan_once(later).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_initializes_and_stops() {
        let (_dir, tasks) = task_dir();
        std::fs::write(tasks.root().join("a.txt"), r#"{"title":"a"}"#).unwrap();

        let watcher = FileWatcher::new(tasks.clone(), WatcherConfig::default());
        watcher.run(async {}).await;

        assert!(read_json(&tasks, "a.txt")["position_x"].is_number());
    }
}
