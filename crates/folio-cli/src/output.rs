//! Terminal output formatting.

use colored::{ColoredString, Colorize};
use folio_core::content::{ContentNode, NodeOrigin};
use folio_core::files::TxtFileSummary;
use folio_core::graph::{Edge, GraphView};
use folio_core::project::model::Project;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Print a single node with its body.
pub fn print_node(node: &ContentNode) {
    println!("{} {}", node.title.cyan().bold(), format!("({})", node.id).dimmed());
    if let Some(subtitle) = node.subtitle.as_deref().filter(|s| !s.is_empty()) {
        println!("{}", subtitle.italic());
    }
    println!();

    println!("{}: {}", "Slug".bold(), node.slug);
    println!("{}: {}", "Origin".bold(), origin_label(node.origin));
    println!("{}: ({}, {})", "Position".bold(), node.position.x, node.position.y);
    println!("{}: {}", "Views".bold(), node.view);
    println!("{}: {}", "Created".bold(), node.created_at);
    if let Some(updated) = &node.updated_at {
        println!("{}: {}", "Updated".bold(), updated);
    }

    let keywords = node.keyword_list();
    if !keywords.is_empty() {
        println!("{}: {}", "Keywords".bold(), keywords.join(", ").yellow());
    }

    if !node.content.is_empty() {
        println!();
        println!("{}", node.content);
    }
}

/// Print the graph's nodes as a table, followed by counts.
pub fn print_graph_table(view: &GraphView) {
    if view.content_data.is_empty() {
        println!("{}", "No content found.".dimmed());
        return;
    }

    let title_width = term_width().saturating_sub(24 + 18 + 8 + 4).clamp(16, 48);

    println!(
        "{} {} {} {}",
        pad_right("ID", 24),
        pad_right("Title", title_width),
        pad_right("Position", 18),
        "Views"
    );
    println!("{}", "─".repeat(24 + title_width + 18 + 8));

    for node in &view.content_data {
        let position = format!("({:.0}, {:.0})", node.position.x, node.position.y);
        let id = pad_right(&truncate_visual(&node.id, 23), 24);
        let id = match node.data.origin {
            NodeOrigin::File => id.magenta(),
            NodeOrigin::Stored => id.normal(),
        };
        println!(
            "{} {} {} {}",
            id,
            pad_right(&truncate_visual(&node.data.title, title_width - 1), title_width),
            pad_right(&position, 18).dimmed(),
            node.data.view
        );
    }

    println!();
    println!(
        "{} stored, {} file(s), {} edge(s)",
        view.static_count,
        view.files_count,
        view.edge_data.len()
    );
}

/// Print edges as a table.
pub fn print_edges(edges: &[Edge]) {
    if edges.is_empty() {
        println!("{}", "No edges found.".dimmed());
        return;
    }

    println!("{} {} {}", pad_right("ID", 32), pad_right("Source", 20), "Target");
    println!("{}", "─".repeat(72));

    for edge in edges {
        println!(
            "{} {} {}",
            pad_right(&truncate_visual(&edge.id, 31), 32).dimmed(),
            pad_right(&truncate_visual(&edge.source, 19), 20),
            edge.target
        );
    }

    println!();
    println!("{} edge(s) total", edges.len());
}

/// Print the project gallery.
pub fn print_projects(projects: &[Project]) {
    if projects.is_empty() {
        println!("{}", "No projects found.".dimmed());
        return;
    }

    println!(
        "{:<6} {} {} {}",
        "ID",
        pad_right("Name", 28),
        pad_right("Company", 20),
        "Link"
    );
    println!("{}", "─".repeat(term_width().min(90)));

    for project in projects {
        println!(
            "{:<6} {} {} {}",
            project.id,
            pad_right(&truncate_visual(&project.name, 27), 28).cyan(),
            pad_right(&truncate_visual(&project.company, 19), 20),
            project.link.dimmed()
        );
    }
}

/// Print task files, newest first as listed.
pub fn print_txt_files(files: &[TxtFileSummary]) {
    if files.is_empty() {
        println!("{}", "No task files found.".dimmed());
        return;
    }

    println!(
        "{} {} {} {:>8}",
        pad_right("File", 28),
        pad_right("Title", 28),
        pad_right("Updated", 26),
        "Size"
    );
    println!("{}", "─".repeat(93));

    for file in files {
        println!(
            "{} {} {} {:>8}",
            pad_right(&truncate_visual(&file.name, 27), 28).magenta(),
            pad_right(&truncate_visual(&file.title, 27), 28),
            pad_right(&truncate_visual(&file.updated_at, 25), 26).dimmed(),
            file.size
        );
    }
}

fn origin_label(origin: NodeOrigin) -> ColoredString {
    match origin {
        NodeOrigin::Stored => "stored".green(),
        NodeOrigin::File => "file".magenta(),
    }
}

/// Get terminal width, defaulting to 80.
fn term_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(80)
}

/// Pad a plain string to a given visual width (right-padded).
fn pad_right(s: &str, width: usize) -> String {
    let visual = UnicodeWidthStr::width(s);
    if visual >= width {
        s.to_string()
    } else {
        format!("{}{}", s, " ".repeat(width - visual))
    }
}

/// Truncate a string respecting visual width.
fn truncate_visual(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    if max_width <= 3 {
        return ".".repeat(max_width);
    }
    let mut result = String::new();
    let mut current_width = 0;
    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if current_width + ch_width > max_width - 2 {
            break;
        }
        result.push(ch);
        current_width += ch_width;
    }
    result.push_str("..");
    result
}
