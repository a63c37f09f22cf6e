//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every stage: answers, reviews, ranking and synthesis
    Full,
    /// Only the chairman's final answer
    Final,
    /// The run view as JSON
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => Self::Full,
            OutputFormat::Final => Self::Final,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for the council orchestrator
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "Council orchestrator - independent answers, anonymous peer review, one synthesis")]
#[command(long_about = r#"
Council orchestrator coordinates a panel of member services and a chairman.

A run has three stages:
1. Answers: every member answers the query in parallel
2. Peer Review: members rank each other's anonymized answers
3. Synthesis: the chairman writes the final answer

Configuration is loaded from (highest priority first):
1. COUNCIL_* environment variables (e.g. COUNCIL_COUNCIL__MEMBERS)
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/council-orchestrator/config.toml   Global config

Example:
  council serve
  council ask "What's the best way to handle errors in Rust?"
  council runs list --limit 5
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the HTTP API and run the heartbeat monitor
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run all three stages for one query and print the result
    Ask {
        /// The question to put to the council
        query: String,

        /// Output format
        #[arg(short, long, value_enum, default_value = "final")]
        output: OutputFormat,

        /// Suppress progress indicators
        #[arg(short, long)]
        quiet: bool,
    },

    /// Inspect stored runs
    Runs {
        #[command(subcommand)]
        command: RunsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum RunsCommand {
    /// List the most recent runs
    List {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Show one run
    Show {
        id: String,

        #[arg(short, long, value_enum, default_value = "full")]
        output: OutputFormat,
    },

    /// Delete one run
    Delete { id: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_parses_output_format() {
        let cli = Cli::parse_from(["council", "-vv", "ask", "why?", "--output", "json"]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Some(Command::Ask { query, output, .. }) => {
                assert_eq!(query, "why?");
                assert_eq!(output, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_runs_subcommands() {
        let cli = Cli::parse_from(["council", "runs", "list", "--limit", "3"]);
        assert!(matches!(
            cli.command,
            Some(Command::Runs {
                command: RunsCommand::List { limit: 3 }
            })
        ));

        let cli = Cli::parse_from(["council", "--config", "c.toml", "runs", "delete", "r1"]);
        assert_eq!(cli.config, Some(PathBuf::from("c.toml")));
        assert!(matches!(
            cli.command,
            Some(Command::Runs {
                command: RunsCommand::Delete { .. }
            })
        ));
    }
}
