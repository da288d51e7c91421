use clap::{Parser, Subcommand};
use notegraph_core::config::parse_spacing;
use notegraph_core::{parse_id, ConfigError, NoteId, TopicId};
use std::path::PathBuf;

/// Flags override the matching `NOTEGRAPH_*` variables.
#[derive(Parser, Debug)]
#[command(name = "notegraph", version, about = "Note prerequisite graphs as JSON")]
pub struct Cli {
    /// SQLite database file; created and migrated when missing
    pub db_path: PathBuf,

    /// Owner partition to read and write
    #[arg(long)]
    pub owner: Option<String>,

    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Enable file logging into this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    /// Vertical distance between sibling leaves
    #[arg(long, value_parser = node_spacing)]
    pub node_spacing: Option<f64>,

    /// Horizontal distance between depth levels
    #[arg(long, value_parser = level_spacing)]
    pub level_spacing: Option<f64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// List topics
    Topics,
    /// Whole graph across all topics
    Graph,
    /// Graph of one topic with its external prerequisites
    TopicGraph {
        #[arg(value_parser = id)]
        topic_id: TopicId,
    },
    /// Positioned whole graph
    Layout,
    /// Positioned graph of one topic
    TopicLayout {
        #[arg(value_parser = id)]
        topic_id: TopicId,
    },
    /// Delete a note and splice it out of prerequisite chains
    Delete {
        #[arg(value_parser = id)]
        note_id: NoteId,
    },
}

fn id(value: &str) -> Result<NoteId, String> {
    parse_id(value).map_err(|err| err.to_string())
}

fn node_spacing(value: &str) -> Result<f64, ConfigError> {
    parse_spacing("--node-spacing", value)
}

fn level_spacing(value: &str) -> Result<f64, ConfigError> {
    parse_spacing("--level-spacing", value)
}
