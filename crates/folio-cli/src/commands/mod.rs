//! CLI command definitions and handlers.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use folio_core::graph::{Graph, GraphStore};
use folio_db::{DbPool, FlatFileStore, TaskDir};
use folio_web::StoreBackend;
use std::path::PathBuf;
use std::sync::Arc;

pub mod content;
pub mod edge;
pub mod files;
pub mod project;
pub mod remote;
pub mod serve;

/// Folio - portfolio content graph server
#[derive(Parser)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// SQLite database (projects and layout; content too with the sqlite backend)
    #[arg(long, global = true, env = "FOLIO_DB", default_value = "data/folio.db")]
    pub db: PathBuf,

    /// Directory holding content.json and edges.json for the files backend
    #[arg(long, global = true, env = "FOLIO_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory of .txt task files shown as graph nodes
    #[arg(long, global = true, env = "FOLIO_TASK_DIR", default_value = "task")]
    pub task_dir: PathBuf,

    /// Where content nodes and edges are stored
    #[arg(long, global = true, env = "FOLIO_BACKEND", value_enum, default_value_t = Backend::Sqlite)]
    pub backend: Backend,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Sqlite,
    Files,
}

impl From<Backend> for StoreBackend {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Sqlite => StoreBackend::Sqlite,
            Backend::Files => StoreBackend::Files,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve(serve::ServeArgs),

    /// Manage content nodes
    #[command(subcommand)]
    Content(content::ContentCommands),

    /// Manage edges between nodes
    #[command(subcommand)]
    Edge(edge::EdgeCommands),

    /// Manage the project gallery
    #[command(subcommand)]
    Project(project::ProjectCommands),

    /// Manage .txt task files
    #[command(subcommand)]
    Files(files::FileCommands),

    /// Edit the graph of a running server
    Remote(remote::RemoteArgs),
}

/// Storage locations shared by every local command.
pub struct Stores {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
    pub task_dir: PathBuf,
    pub backend: Backend,
}

impl Stores {
    pub fn db(&self) -> Result<Arc<DbPool>> {
        Ok(Arc::new(folio_db::init_pool(&self.db_path)?))
    }

    pub fn tasks(&self) -> Result<TaskDir> {
        Ok(TaskDir::open(&self.task_dir)?)
    }

    pub fn graph(&self) -> Result<Graph> {
        let store: Arc<dyn GraphStore> = match self.backend {
            Backend::Sqlite => self.db()?,
            Backend::Files => Arc::new(FlatFileStore::open(&self.data_dir)?),
        };
        Ok(Graph::new(store, self.tasks()?))
    }
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let stores = Stores {
            db_path: self.db,
            data_dir: self.data_dir,
            task_dir: self.task_dir,
            backend: self.backend,
        };

        match self.command {
            Commands::Serve(args) => serve::execute(args, &stores).await,
            Commands::Content(cmd) => content::execute(cmd, &stores).await,
            Commands::Edge(cmd) => edge::execute(cmd, &stores).await,
            Commands::Project(cmd) => project::execute(cmd, &stores).await,
            Commands::Files(cmd) => files::execute(cmd, &stores).await,
            Commands::Remote(args) => remote::execute(args).await,
        }
    }
}
