//! mycomind CLI - command-line interface for exploring and editing mind maps
//!
//! Usage: mycomind-cli [OPTIONS] <COMMAND>
//!
//! File-backed: every editing command loads the document, applies one
//! operation, and writes the document back. `browse` opens the interactive
//! TUI. Supports JSON output for scripting.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use mycomind::{
    document, locate, visibility, MapError, MapNode, MapSession, MetaPatch, NodePatch, NodeStatus,
    NodeType, ROOT_ID,
};
use std::path::PathBuf;

#[path = "cli/tui.rs"]
mod tui;

#[derive(Parser)]
#[command(name = "mycomind-cli")]
#[command(version, about = "Explorable mind map CLI", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Document path (default: auto-detect)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    json: bool,

    /// Suppress confirmation output
    #[arg(long, short, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter document
    Init {
        /// Overwrite an existing document
        #[arg(long)]
        force: bool,
    },
    /// Print the tree as an outline
    Show {
        /// Subtree to show (default: whole map)
        id: Option<String>,
        /// Include children of collapsed nodes
        #[arg(long, short)]
        all: bool,
    },
    /// Summary statistics for the document
    Stats,
    /// Case-insensitive label search (matches hidden nodes too)
    Find {
        /// Substring to look for
        query: String,
    },
    /// Add a child node
    Add {
        /// Parent node id (default: root)
        parent: Option<String>,
        /// Label for the new node
        #[arg(long, default_value = "New Node")]
        label: String,
        /// Description for the new node
        #[arg(long)]
        description: Option<String>,
        /// Node type: concept, task, note
        #[arg(long = "type", short = 't')]
        node_type: Option<String>,
        /// Node status: active, completed, pending
        #[arg(long)]
        status: Option<String>,
        /// Comma-separated tags
        #[arg(long, value_delimiter = ',')]
        tag: Option<Vec<String>>,
    },
    /// Delete a node (refused for the root)
    Delete {
        /// Node id to delete
        id: String,
    },
    /// Patch a node's label, description, or metadata
    Update {
        /// Node id to update
        id: String,
        #[arg(long)]
        label: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Node type: concept, task, note
        #[arg(long = "type", short = 't')]
        node_type: Option<String>,
        /// Node status: active, completed, pending
        #[arg(long)]
        status: Option<String>,
        /// Comma-separated tags (replaces the tag list)
        #[arg(long, value_delimiter = ',')]
        tag: Option<Vec<String>>,
    },
    /// Collapse or expand one node
    Toggle {
        /// Node id to toggle
        id: String,
    },
    /// Expand a whole subtree
    Expand {
        /// Subtree root (default: root)
        id: Option<String>,
    },
    /// Collapse every descendant of a subtree root
    Collapse {
        /// Subtree root (default: root)
        id: Option<String>,
    },
    /// Dump the full document, hidden subtrees included
    Export {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Browse the map interactively
    Browse,
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run_cli(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Resolve the document path: explicit flag, then ./data/mindmap.json for
/// development, then the platform data dir.
fn resolve_path(flag: Option<PathBuf>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    let local = PathBuf::from("data/mindmap.json");
    if local.exists() {
        return local;
    }
    dirs::data_dir()
        .map(|p| p.join("mycomind").join("mindmap.json"))
        .unwrap_or(local)
}

fn run_cli(cli: Cli) -> Result<(), MapError> {
    let path = resolve_path(cli.file.clone());

    match cli.command {
        Commands::Init { force } => {
            if path.exists() && !force {
                return Err(MapError::Malformed(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            let root = document::starter_document();
            document::save_file(&path, &root)?;
            if !cli.quiet {
                println!("Created {} ({} nodes)", path.display(), root.subtree_size());
            }
            Ok(())
        }
        Commands::Show { id, all } => {
            let root = document::load_file(&path)?;
            let target = match id.as_deref() {
                Some(id) => {
                    locate::find(&root, id).ok_or_else(|| MapError::NotFound(id.to_string()))?
                }
                None => &root,
            };
            if cli.json {
                println!("{}", serde_json::to_string_pretty(target)?);
            } else {
                print_outline(target, 0, all);
            }
            Ok(())
        }
        Commands::Stats => handle_stats(&path, cli.json),
        Commands::Find { query } => {
            let root = document::load_file(&path)?;
            let hits = locate::search_labels(&root, &query);
            if cli.json {
                let rows: Vec<_> = hits
                    .iter()
                    .map(|n| {
                        serde_json::json!({
                            "id": n.id,
                            "label": n.label,
                            "type": n.metadata.node_type.as_str(),
                            "status": n.metadata.status.as_str(),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for n in &hits {
                    println!("{}  {} [{}]", n.id, n.label, n.metadata.node_type.as_str());
                }
                if !cli.quiet {
                    println!("{} match(es) for '{}'", hits.len(), query);
                }
            }
            Ok(())
        }
        Commands::Add { parent, label, description, node_type, status, tag } => {
            let root = document::load_file(&path)?;
            let mut session = MapSession::new(root)?;
            let parent_id = parent.unwrap_or_else(|| ROOT_ID.to_string());
            if locate::find(session.tree(), &parent_id).is_none() {
                return Err(MapError::NotFound(parent_id));
            }

            let new_id = session.add_node_under(&parent_id);
            let patch = NodePatch {
                label: Some(label),
                description,
                metadata: Some(MetaPatch {
                    node_type: node_type.as_deref().map(parse_type).transpose()?,
                    status: status.as_deref().map(parse_status).transpose()?,
                    tags: tag,
                    created: None,
                }),
            };
            session.update_node(&new_id, &patch);
            document::save_file(&path, session.tree())?;

            if cli.json {
                println!("{}", serde_json::json!({ "id": new_id, "parent": parent_id }));
            } else if !cli.quiet {
                println!("Added {} under {}", new_id, parent_id);
            }
            Ok(())
        }
        Commands::Delete { id } => {
            let root = document::load_file(&path)?;
            let mut session = MapSession::new(root)?;
            match session.delete_node(&id) {
                Ok(true) => {
                    document::save_file(&path, session.tree())?;
                    if !cli.quiet {
                        println!("Deleted {}", id);
                    }
                    Ok(())
                }
                Ok(false) => {
                    if !cli.quiet {
                        println!("No node with id {}", id);
                    }
                    Ok(())
                }
                // Invariant guard: a notice, not a failure; nothing is saved
                Err(e) if e.is_rejection() => {
                    eprintln!("Rejected: {}", e);
                    Ok(())
                }
                Err(e) => Err(e),
            }
        }
        Commands::Update { id, label, description, node_type, status, tag } => {
            let root = document::load_file(&path)?;
            if locate::find(&root, &id).is_none() {
                return Err(MapError::NotFound(id));
            }
            let metadata = MetaPatch {
                node_type: node_type.as_deref().map(parse_type).transpose()?,
                status: status.as_deref().map(parse_status).transpose()?,
                tags: tag,
                created: None,
            };
            let no_meta = metadata.node_type.is_none() && metadata.status.is_none() && metadata.tags.is_none();
            let patch = NodePatch { label, description, metadata: Some(metadata) };
            if patch.label.is_none() && patch.description.is_none() && no_meta {
                println!("Nothing to update");
                return Ok(());
            }
            let next = mycomind::mutate::update_node(&root, &id, &patch);
            document::save_file(&path, &next)?;
            if !cli.quiet {
                println!("Updated {}", id);
            }
            Ok(())
        }
        Commands::Toggle { id } => {
            let root = document::load_file(&path)?;
            if locate::find(&root, &id).is_none() {
                return Err(MapError::NotFound(id));
            }
            let next = visibility::toggle_collapse(&root, &id);
            let collapsed = locate::find(&next, &id).map(|n| n.collapsed).unwrap_or(false);
            document::save_file(&path, &next)?;
            if !cli.quiet {
                println!("{} is now {}", id, if collapsed { "collapsed" } else { "expanded" });
            }
            Ok(())
        }
        Commands::Expand { id } => {
            let root = document::load_file(&path)?;
            let target = id.unwrap_or_else(|| ROOT_ID.to_string());
            let next = visibility::expand_all(&root, &target);
            document::save_file(&path, &next)?;
            if !cli.quiet {
                println!("Expanded subtree {}", target);
            }
            Ok(())
        }
        Commands::Collapse { id } => {
            let root = document::load_file(&path)?;
            let target = id.unwrap_or_else(|| ROOT_ID.to_string());
            let next = visibility::collapse_all(&root, &target);
            document::save_file(&path, &next)?;
            if !cli.quiet {
                println!("Collapsed descendants of {}", target);
            }
            Ok(())
        }
        Commands::Export { output } => {
            let root = document::load_file(&path)?;
            let json = document::export_string(&root)?;
            match output {
                Some(out) => {
                    std::fs::write(&out, json)?;
                    if !cli.quiet {
                        println!("Exported {} nodes to {}", root.subtree_size(), out.display());
                    }
                }
                None => println!("{}", json),
            }
            Ok(())
        }
        Commands::Browse => {
            let root = document::load_file(&path)?;
            tui::run_tui(root, &path)
        }
        Commands::Completions { shell } => {
            generate(shell, &mut Cli::command(), "mycomind-cli", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn parse_type(s: &str) -> Result<NodeType, MapError> {
    NodeType::from_str(s)
        .ok_or_else(|| MapError::Malformed(format!("unknown type '{}' (concept, task, note, root)", s)))
}

fn parse_status(s: &str) -> Result<NodeStatus, MapError> {
    NodeStatus::from_str(s).ok_or_else(|| {
        MapError::Malformed(format!("unknown status '{}' (active, completed, pending)", s))
    })
}

/// Outline printer: ▼ expanded, ▶ collapsed (with hidden count), ○ leaf.
fn print_outline(node: &MapNode, depth: usize, show_hidden: bool) {
    let indent = "  ".repeat(depth);
    let marker = if node.collapsed {
        "▶"
    } else if node.has_children() {
        "▼"
    } else {
        "○"
    };
    let count = if node.collapsed {
        format!(" ({} hidden)", node.hidden_children.len())
    } else {
        String::new()
    };
    println!("{}{} {} [{}]{}", indent, marker, node.label, node.id, count);

    for child in &node.children {
        print_outline(child, depth + 1, show_hidden);
    }
    if show_hidden {
        for child in &node.hidden_children {
            print_outline(child, depth + 1, show_hidden);
        }
    }
}

fn handle_stats(path: &std::path::Path, json: bool) -> Result<(), MapError> {
    let root = document::load_file(path)?;

    let mut total = 0usize;
    let mut hidden = 0usize;
    let mut collapsed = 0usize;
    let mut max_depth = 0usize;
    let mut by_type = [0usize; 4]; // concept, task, note, root
    let mut by_status = [0usize; 3]; // active, completed, pending

    walk_stats(&root, 0, false, &mut total, &mut hidden, &mut collapsed, &mut max_depth, &mut by_type, &mut by_status);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "totalNodes": total,
                "hiddenNodes": hidden,
                "collapsedNodes": collapsed,
                "maxDepth": max_depth,
                "byType": {
                    "concept": by_type[0], "task": by_type[1],
                    "note": by_type[2], "root": by_type[3],
                },
                "byStatus": {
                    "active": by_status[0], "completed": by_status[1], "pending": by_status[2],
                },
            }))?
        );
    } else {
        println!("Nodes:   {} total, {} hidden, {} collapsed", total, hidden, collapsed);
        println!("Depth:   {}", max_depth);
        println!(
            "Types:   {} concept, {} task, {} note, {} root",
            by_type[0], by_type[1], by_type[2], by_type[3]
        );
        println!(
            "Status:  {} active, {} completed, {} pending",
            by_status[0], by_status[1], by_status[2]
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn walk_stats(
    node: &MapNode,
    depth: usize,
    in_hidden: bool,
    total: &mut usize,
    hidden: &mut usize,
    collapsed: &mut usize,
    max_depth: &mut usize,
    by_type: &mut [usize; 4],
    by_status: &mut [usize; 3],
) {
    *total += 1;
    if in_hidden {
        *hidden += 1;
    }
    if node.collapsed {
        *collapsed += 1;
    }
    *max_depth = (*max_depth).max(depth);
    by_type[match node.metadata.node_type {
        NodeType::Concept => 0,
        NodeType::Task => 1,
        NodeType::Note => 2,
        NodeType::Root => 3,
    }] += 1;
    by_status[match node.metadata.status {
        NodeStatus::Active => 0,
        NodeStatus::Completed => 1,
        NodeStatus::Pending => 2,
    }] += 1;
    for child in &node.children {
        walk_stats(child, depth + 1, in_hidden, total, hidden, collapsed, max_depth, by_type, by_status);
    }
    for child in &node.hidden_children {
        walk_stats(child, depth + 1, true, total, hidden, collapsed, max_depth, by_type, by_status);
    }
}
