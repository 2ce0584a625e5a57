//! Content node commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;
use folio_core::content::{ContentPatch, NewContent, Position};

use super::Stores;
use crate::output;

#[derive(Subcommand)]
pub enum ContentCommands {
    /// List every node, stored and task-file
    List {
        /// Print the graph view as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one node by id or slug
    Show {
        /// Node id or slug
        key: String,
    },

    /// Create a node
    New(NewContentArgs),

    /// Edit the text of a node
    Edit(EditContentArgs),

    /// Move a node on the canvas
    #[command(allow_negative_numbers = true)]
    Move {
        id: String,
        x: f64,
        y: f64,
    },

    /// Delete a node and its edges
    Delete {
        id: String,
    },

    /// Count a view
    View {
        id: String,
    },
}

#[derive(Args)]
pub struct NewContentArgs {
    /// Node title
    pub title: String,

    /// Markdown body
    #[arg(short, long, default_value = "")]
    pub content: String,

    #[arg(short, long)]
    pub subtitle: Option<String>,

    /// Comma-separated keywords
    #[arg(short, long, default_value = "")]
    pub keywords: String,

    /// Slug (derived from the title when omitted)
    #[arg(long)]
    pub slug: Option<String>,

    /// Canvas position; random when omitted
    #[arg(long, requires = "y")]
    pub x: Option<f64>,

    #[arg(long, requires = "x")]
    pub y: Option<f64>,
}

#[derive(Args)]
pub struct EditContentArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub subtitle: Option<String>,

    #[arg(short, long)]
    pub content: Option<String>,

    #[arg(short, long)]
    pub keywords: Option<String>,
}

pub async fn execute(cmd: ContentCommands, stores: &Stores) -> Result<()> {
    let graph = stores.graph()?;

    match cmd {
        ContentCommands::List { json } => {
            let view = graph.view()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                output::print_graph_table(&view);
            }
        }

        ContentCommands::Show { key } => {
            let node = graph.lookup(&key)?;
            output::print_node(&node);
        }

        ContentCommands::New(args) => {
            let position = args.x.zip(args.y).map(|(x, y)| Position::new(x, y));
            let node = graph.create_node(&NewContent {
                title: args.title,
                subtitle: args.subtitle,
                content: args.content,
                keywords: args.keywords,
                slug: args.slug,
                position,
                ..Default::default()
            })?;
            println!(
                "{} Created node: {} ({})",
                "✓".green().bold(),
                node.title.cyan(),
                node.id.dimmed()
            );
            println!("  slug: {}", node.slug);
        }

        ContentCommands::Edit(args) => {
            let node = graph.update_node(
                &args.id,
                &ContentPatch {
                    title: args.title,
                    subtitle: args.subtitle,
                    content: args.content,
                    keywords: args.keywords,
                },
            )?;
            println!("{} Updated node: {}", "✓".green().bold(), node.title.cyan());
        }

        ContentCommands::Move { id, x, y } => {
            graph.move_node(&id, Position::new(x, y))?;
            println!("{} Moved {} to ({}, {})", "✓".green().bold(), id.dimmed(), x, y);
        }

        ContentCommands::Delete { id } => {
            let edges = graph.delete_node(&id)?;
            println!(
                "{} Deleted node {} and {} edge(s)",
                "✓".green().bold(),
                id.dimmed(),
                edges
            );
        }

        ContentCommands::View { id } => {
            let views = graph.record_view(&id)?;
            println!("{} {} views", id.dimmed(), views.to_string().cyan());
        }
    }

    Ok(())
}
