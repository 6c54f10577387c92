//! Command-line interface for signsub
//!
//! Provides argument parsing using clap derive macros.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Sign language detection to live subtitles
#[derive(Parser, Debug)]
#[command(name = "signsub", version, about = "Sign language detection to live subtitles")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run detection over a recorded landmark stream
    Run {
        /// JSON-lines file of landmark captures (one frame per line)
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Backend override (local-rules, remote, local-model)
        #[arg(long, value_name = "BACKEND")]
        backend: Option<String>,

        /// Subtitle language override (english, spanish, khmer)
        #[arg(long, value_name = "LANG")]
        language: Option<String>,

        /// Minimum confidence override, within [0, 1]
        #[arg(long, value_name = "CONF")]
        min_confidence: Option<f32>,

        /// Write finalized subtitles to an SRT file
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show vocabulary statistics
    Vocab,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_command() {
        let cli = Cli::try_parse_from(["signsub", "run", "session.jsonl"]).unwrap();
        match cli.command {
            Commands::Run { input, output, .. } => {
                assert_eq!(input, PathBuf::from("session.jsonl"));
                assert!(output.is_none());
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_run_overrides() {
        let cli = Cli::try_parse_from([
            "signsub",
            "run",
            "session.jsonl",
            "--backend",
            "local-rules",
            "--language",
            "spanish",
            "--min-confidence",
            "0.8",
            "-o",
            "out.srt",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                backend,
                language,
                min_confidence,
                output,
                ..
            } => {
                assert_eq!(backend.as_deref(), Some("local-rules"));
                assert_eq!(language.as_deref(), Some("spanish"));
                assert_eq!(min_confidence, Some(0.8));
                assert_eq!(output, Some(PathBuf::from("out.srt")));
            }
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parses_config_subcommands() {
        let cli = Cli::try_parse_from(["signsub", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Show
            }
        ));
    }

    #[test]
    fn test_cli_requires_a_command() {
        assert!(Cli::try_parse_from(["signsub"]).is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["signsub", "vocab", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
