//! qtree CLI
//!
//! Inspect question topics from the command line and run the graph layout
//! without a window.
//!
//! Usage:
//!   cargo run --features cli --bin qtree -- tree <TOPIC_ID>
//!   cargo run --features cli --bin qtree -- tree --file topic.json
//!   cargo run --features cli --bin qtree -- path q42 --topic <TOPIC_ID>
//!   cargo run --features cli --bin qtree -- ask "What is 3NF?" --topic <TOPIC_ID> --parent q1
//!   cargo run --features cli --bin qtree -- ask "Explain databases"
//!   cargo run --features cli --bin qtree -- history
//!   cargo run --features cli --bin qtree -- search normal
//!   cargo run --features cli --bin qtree -- layout --file topic.json --max-ticks 600
//!
//! Environment:
//!   QTREE_API_URL, QTREE_API_TOKEN, QTREE_TIMEOUT_SECS  service connection
//!   QTREE_GRAPH_SETTINGS                                graph settings YAML
//!   RUST_LOG                                            log filter (default qtree=info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use qtree::types::{TopicTreeResponse, ViewData};
use qtree::{find_path, transform, HttpQuestionApi, QuestionApi, TreeController};
use qtree_graph::QuestionGraphWidget;

#[derive(Parser, Debug)]
#[command(name = "qtree")]
#[command(about = "Question tree client: inspect topics, ask questions, run the graph layout")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a topic as an indented tree
    Tree {
        #[command(flatten)]
        source: Source,
        /// Print the transformed tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the path from the root to a node
    Path {
        node_id: String,
        #[command(flatten)]
        source: Source,
    },
    /// Ask a question: a follow-up with --topic, otherwise a new topic
    Ask {
        question: String,
        #[arg(long)]
        topic: Option<String>,
        /// Parent question (defaults to the topic root)
        #[arg(long, requires = "topic")]
        parent: Option<String>,
    },
    /// List topics, newest first
    History,
    /// Search questions across topics
    Search { keyword: String },
    /// Run the force layout until settled and print node positions as JSON
    Layout {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value_t = 1000)]
        max_ticks: usize,
    },
}

/// Where a topic tree comes from
#[derive(Args, Debug)]
struct Source {
    /// Topic id to fetch from the service
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    topic_id: Option<String>,
    /// Read a saved `GET /topics/{id}` response instead
    #[arg(long)]
    file: Option<PathBuf>,
}

impl Source {
    async fn load(&self) -> Result<TopicTreeResponse> {
        if let Some(path) = &self.file {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            return serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", path.display()));
        }
        let Some(topic_id) = &self.topic_id else {
            bail!("either a topic id or --file is required");
        };
        let api = HttpQuestionApi::from_env()?;
        Ok(api.get_topic_tree(topic_id).await?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("qtree=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Tree { source, json } => {
            let tree = transform(&source.load().await?);
            if json {
                println!("{}", serde_json::to_string_pretty(&tree)?);
            } else {
                print_tree(&tree, 0);
            }
        }
        Command::Path { node_id, source } => {
            let tree = transform(&source.load().await?);
            let Some(path) = find_path(&tree, &node_id) else {
                bail!("node `{node_id}` is not in topic `{}`", tree.id);
            };
            let labels: Vec<&str> = path.iter().map(|n| n.question_text.as_str()).collect();
            println!("{}", labels.join(" > "));
        }
        Command::Ask {
            question,
            topic,
            parent,
        } => {
            let mut controller = controller()?;
            let new_id = match topic {
                Some(topic_id) => {
                    controller.load(&topic_id).await?;
                    if let Some(parent) = parent {
                        controller.store_mut().focus_node(&parent)?;
                    }
                    controller.ask(&question).await?
                }
                None => controller.start_topic(&question).await?,
            };
            if let Some(node) = controller.store().tree().and_then(|t| t.find(&new_id)) {
                println!("{}\n\n{}", node.question_text, node.answer_text);
            }
            println!("\nid: {new_id}");
        }
        Command::History => {
            let controller = controller()?;
            for item in controller.history().await? {
                println!("{}  {}  {}", item.created_at, item.topic_id, item.topic_name);
            }
        }
        Command::Search { keyword } => {
            let controller = controller()?;
            let hits = controller.search(&keyword).await?;
            if hits.is_empty() {
                println!("no matches for `{keyword}`");
            }
            for hit in hits {
                println!(
                    "{} / {}  [{}]  {}",
                    hit.topic_name, hit.topic_id, hit.node_id, hit.question_text
                );
            }
        }
        Command::Layout { source, max_ticks } => {
            let tree = transform(&source.load().await?);
            let mut graph = QuestionGraphWidget::new();
            graph.sync(Some(&tree), 1);
            let ticks = graph.run_headless(max_ticks);
            tracing::info!(ticks, nodes = tree.node_count(), "layout finished");
            println!("{}", serde_json::to_string_pretty(&graph.positions())?);
        }
    }
    Ok(())
}

fn controller() -> Result<TreeController> {
    let api: Arc<dyn QuestionApi> = Arc::new(HttpQuestionApi::from_env()?);
    Ok(TreeController::new(api))
}

fn print_tree(node: &ViewData, depth: usize) {
    let badge = if node.has_children() {
        format!(" ({})", node.children.len())
    } else {
        String::new()
    };
    println!("{}{} [{}]{}", "  ".repeat(depth), node.question_text, node.id, badge);
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}
