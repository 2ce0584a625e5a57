//! Task file commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use folio_core::files::{self, watcher, SaveTxt};
use std::path::PathBuf;

use super::Stores;
use crate::output;

#[derive(Subcommand)]
pub enum FileCommands {
    /// List task files, newest first
    List,

    /// Print a task file
    Show { name: String },

    /// Create or overwrite a task file
    Save(SaveArgs),

    /// Give every task file without coordinates a position
    Place,
}

#[derive(Args)]
pub struct SaveArgs {
    pub title: String,

    /// Body text
    #[arg(short, long, conflicts_with = "from")]
    pub content: Option<String>,

    /// Read the body from a file
    #[arg(long)]
    pub from: Option<PathBuf>,

    #[arg(short, long)]
    pub keywords: Option<String>,

    /// Existing file to overwrite (keeps its position)
    #[arg(long)]
    pub file_name: Option<String>,
}

pub async fn execute(cmd: FileCommands, stores: &Stores) -> Result<()> {
    let tasks = stores.tasks()?;

    match cmd {
        FileCommands::List => output::print_txt_files(&files::list_txt_files(&tasks)?),

        FileCommands::Show { name } => println!("{}", files::read_txt_file(&tasks, &name)?),

        FileCommands::Save(args) => {
            let content = match (args.content, args.from) {
                (Some(content), _) => content,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => anyhow::bail!("provide --content or --from"),
            };
            let saved = files::save_txt(
                &tasks,
                &SaveTxt {
                    title: args.title,
                    content,
                    keywords: args.keywords,
                    original_file_name: args.file_name,
                },
            )?;
            let verb = if saved.created { "Created" } else { "Updated" };
            println!(
                "{} {} {} at ({}, {})",
                "✓".green().bold(),
                verb,
                saved.file_name.cyan(),
                saved.position.x,
                saved.position.y
            );
        }

        FileCommands::Place => {
            let changed = watcher::initialize_file_nodes(&tasks)?;
            println!("{} Placed {} file(s)", "✓".green().bold(), changed);
        }
    }

    Ok(())
}
