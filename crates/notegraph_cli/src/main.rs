//! Command-line driver for `notegraph_core`.
//!
//! # Responsibility
//! - Open a database, run one graph/store command and print JSON to stdout.
//! - Build the core configuration from `NOTEGRAPH_*` variables and flags.

mod args;

use args::{Cli, Command};
use clap::Parser;
use log::info;
use notegraph_core::db::open_db;
use notegraph_core::{
    core_version, init_logging_from, CoreConfig, GraphService, LayoutOptions, NoteService,
    SqliteStore, TopicService,
};
use serde_json::json;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("notegraph {}: {message}", core_version());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<String, String> {
    let config = resolve_config(&cli, std::env::vars())?;
    init_logging_from(&config)?;

    let conn = open_db(&cli.db_path).map_err(|err| err.to_string())?;
    let store = SqliteStore::try_new(&conn, config.owner.clone()).map_err(|err| err.to_string())?;
    let graphs = GraphService::new(&store, config.layout);
    info!("event=cli_command module=cli status=start command={:?}", cli.command);

    let value = match cli.command {
        Command::Topics => to_json(&TopicService::new(&store).list_topics())?,
        Command::Graph => to_json(&graphs.full_graph())?,
        Command::Layout => to_json(&graphs.full_layout())?,
        Command::TopicGraph { topic_id } => to_json(&graphs.topic_graph(topic_id))?,
        Command::TopicLayout { topic_id } => to_json(&graphs.topic_layout(topic_id))?,
        Command::Delete { note_id } => {
            let report = NoteService::new(&store)
                .delete_note(note_id)
                .map_err(|err| err.to_string())?;
            json!({
                "deleted": report.deleted,
                "rewired": report.rewired,
                "failed": report
                    .failed
                    .iter()
                    .map(|failure| json!({ "note": failure.note, "error": failure.error }))
                    .collect::<Vec<_>>(),
                "removed_links": report.removed_links,
            })
        }
    };

    serde_json::to_string_pretty(&value).map_err(|err| err.to_string())
}

/// Variables first, then flags on top.
fn resolve_config<I>(cli: &Cli, vars: I) -> Result<CoreConfig, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut config = CoreConfig::from_vars(vars).map_err(|err| err.to_string())?;
    if let Some(owner) = &cli.owner {
        config.owner = owner.clone();
    }
    if let Some(level) = &cli.log_level {
        config = config.with_log_level(level.as_str());
    }
    if let Some(dir) = &cli.log_dir {
        config = config.with_log_dir(dir.as_path());
    }
    let layout = LayoutOptions {
        node_spacing: cli.node_spacing.unwrap_or(config.layout.node_spacing),
        level_spacing: cli.level_spacing.unwrap_or(config.layout.level_spacing),
        ..config.layout
    };
    Ok(config.with_layout(layout))
}

fn to_json<T, E>(result: &Result<T, E>) -> Result<serde_json::Value, String>
where
    T: serde::Serialize,
    E: std::fmt::Display,
{
    match result {
        Ok(value) => serde_json::to_value(value).map_err(|err| err.to_string()),
        Err(err) => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::resolve_config;
    use crate::args::Cli;
    use clap::Parser;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn flags_override_environment() {
        let cli = Cli::try_parse_from([
            "notegraph",
            "--owner",
            "bob",
            "--node-spacing",
            "25",
            "--log-dir",
            "/tmp/ng-logs",
            "notes.db",
            "graph",
        ])
        .unwrap();
        let config = resolve_config(
            &cli,
            vars(&[("NOTEGRAPH_OWNER", "alice"), ("NOTEGRAPH_LEVEL_SPACING", "90")]),
        )
        .unwrap();

        assert_eq!(config.owner, "bob");
        assert_eq!(config.layout.node_spacing, 25.0);
        assert_eq!(config.layout.level_spacing, 90.0);
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/ng-logs")));
    }

    #[test]
    fn environment_applies_without_flags() {
        let cli = Cli::try_parse_from(["notegraph", "notes.db", "topics"]).unwrap();
        let config = resolve_config(
            &cli,
            vars(&[("NOTEGRAPH_OWNER", "alice"), ("NOTEGRAPH_LOG_LEVEL", "warn")]),
        )
        .unwrap();

        assert_eq!(config.owner, "alice");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.layout.node_spacing, 60.0);
    }

    #[test]
    fn invalid_environment_spacing_is_reported() {
        let cli = Cli::try_parse_from(["notegraph", "notes.db", "layout"]).unwrap();
        let err = resolve_config(&cli, vars(&[("NOTEGRAPH_NODE_SPACING", "wide")])).unwrap_err();
        assert!(err.contains("NOTEGRAPH_NODE_SPACING"));
    }
}
