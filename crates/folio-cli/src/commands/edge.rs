//! Edge commands.

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use super::Stores;
use crate::output;

#[derive(Subcommand)]
pub enum EdgeCommands {
    /// List edges
    List,

    /// Connect two nodes
    Connect { source: String, target: String },

    /// Remove an edge by id
    Disconnect { id: String },
}

pub async fn execute(cmd: EdgeCommands, stores: &Stores) -> Result<()> {
    let graph = stores.graph()?;

    match cmd {
        EdgeCommands::List => output::print_edges(&graph.edges()?),

        EdgeCommands::Connect { source, target } => {
            let edge = graph.connect(&source, &target)?;
            println!(
                "{} Connected {} {} {} ({})",
                "✓".green().bold(),
                source.cyan(),
                "→".dimmed(),
                target.cyan(),
                edge.id.dimmed()
            );
        }

        EdgeCommands::Disconnect { id } => {
            graph.disconnect(&id)?;
            println!("{} Removed edge {}", "✓".green().bold(), id.dimmed());
        }
    }

    Ok(())
}
