//! Project gallery commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use folio_core::project::{self, model::NewProject};

use super::Stores;
use crate::output;

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// List projects
    List,

    /// Add a project whose image is already hosted
    Add(AddProjectArgs),

    /// Delete a project
    Delete { id: i64 },
}

#[derive(Args)]
pub struct AddProjectArgs {
    pub name: String,

    #[arg(long, default_value = "")]
    pub company: String,

    #[arg(long, default_value = "")]
    pub link: String,

    #[arg(long, default_value = "")]
    pub image_url: String,
}

pub async fn execute(cmd: ProjectCommands, stores: &Stores) -> Result<()> {
    let pool = stores.db()?;

    match cmd {
        ProjectCommands::List => output::print_projects(&project::list_projects(&pool)?),

        ProjectCommands::Add(args) => {
            let created = project::create_project(
                &pool,
                &NewProject {
                    name: args.name,
                    company: args.company,
                    link: args.link,
                    image_url: args.image_url,
                },
            )?;
            println!(
                "{} Added project: {} ({})",
                "✓".green().bold(),
                created.name.cyan(),
                created.id.to_string().dimmed()
            );
        }

        ProjectCommands::Delete { id } => {
            project::delete_project(&pool, id)?;
            println!("{} Deleted project {}", "✓".green().bold(), id);
        }
    }

    Ok(())
}
