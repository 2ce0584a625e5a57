//! Canvas edits against a running server.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use folio_core::canvas::{Canvas, HttpSink, NodeChange, DEFAULT_WINDOW};
use folio_core::content::Position;
use std::sync::Arc;

use crate::output;

#[derive(Args)]
pub struct RemoteArgs {
    /// Server base URL
    #[arg(long, env = "FOLIO_URL", default_value = "http://127.0.0.1:3030")]
    pub url: String,

    /// Secret for protected operations
    #[arg(long, env = "API_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[command(subcommand)]
    pub command: RemoteCommands,
}

#[derive(Subcommand)]
pub enum RemoteCommands {
    /// Print the server's graph
    Graph,

    /// Drag a node to a new position
    #[command(allow_negative_numbers = true)]
    Move { id: String, x: f64, y: f64 },

    /// Connect two nodes
    Connect { source: String, target: String },

    /// Remove an edge
    Disconnect { id: String },
}

pub async fn execute(args: RemoteArgs) -> Result<()> {
    let sink = Arc::new(HttpSink::new(&args.url, args.password));
    let view = sink.fetch_view().await?;

    if let RemoteCommands::Graph = args.command {
        output::print_graph_table(&view);
        return Ok(());
    }

    let mut canvas = Canvas::new(view, sink, DEFAULT_WINDOW);
    match args.command {
        RemoteCommands::Graph => {}

        RemoteCommands::Move { id, x, y } => {
            let queued = canvas.apply_node_changes(vec![NodeChange::Position {
                id: id.clone(),
                position: Some(Position::new(x, y)),
                dragging: true,
            }]);
            if queued == 0 {
                anyhow::bail!("node {} is not on the server's canvas", id);
            }
            match canvas.flush().await {
                Some(Ok(outcome)) if outcome.total() > 0 => {
                    println!("{} Moved {} to ({}, {})", "✓".green().bold(), id.dimmed(), x, y);
                }
                Some(Ok(_)) => anyhow::bail!("server did not store the position of {}", id),
                Some(Err(e)) => return Err(e.into()),
                None => anyhow::bail!("position of {} was not sent", id),
            }
        }

        RemoteCommands::Connect { source, target } => {
            let edge = canvas.connect(&source, &target).await?;
            println!("{} Connected {}", "✓".green().bold(), edge.id.dimmed());
        }

        RemoteCommands::Disconnect { id } => {
            let known = canvas.disconnect(&id).await?;
            if !known {
                println!("{} Edge {} was not on the canvas", "!".yellow(), id.dimmed());
            }
            println!("{} Removed {}", "✓".green().bold(), id.dimmed());
        }
    }

    Ok(())
}
