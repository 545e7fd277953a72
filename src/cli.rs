//! Command-line interface definitions.
//!
//! Defines all CLI arguments and subcommands using clap. The data-file and
//! repository flags can also be supplied through environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// cards.js editor CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Root directory that relative paths are resolved against
    #[arg(short, long)]
    pub root: Option<PathBuf>,

    /// Config file name (default: cards-editor.toml)
    #[arg(short = 'C', long, default_value = "cards-editor.toml")]
    pub config: PathBuf,

    /// Path of the cards.js data file
    #[arg(short, long, env = "CARDS_PATH")]
    pub file: Option<PathBuf>,

    /// Local mirror directory for cataclysm images
    #[arg(short, long, env = "CARDS_ASSETS")]
    pub assets: Option<PathBuf>,

    /// Default repository (`owner/name`) used for remote sync
    #[arg(long, global = true, env = "CARDS_GITHUB_REPO")]
    pub repo: Option<String>,

    /// Default branch used for remote sync
    #[arg(long, global = true, env = "CARDS_GITHUB_BRANCH")]
    pub branch: Option<String>,

    /// subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Serve the editor form (default)
    Serve {
        /// Interface to bind on
        #[arg(short, long, env = "CARDS_EDITOR_INTERFACE")]
        interface: Option<String>,

        /// The port you should provide
        #[arg(short, long, env = "CARDS_EDITOR_PORT")]
        port: Option<u16>,
    },

    /// Download the repository snapshot and refresh cards.js and images
    Sync,

    /// Print a summary of the parsed data file
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let cli = Cli::parse_from(["cards-editor"]);
        assert!(cli.command.is_none());
        assert_eq!(cli.config, PathBuf::from("cards-editor.toml"));
    }

    #[test]
    fn test_serve_flags() {
        let cli = Cli::parse_from(["cards-editor", "serve", "--port", "8080", "-i", "0.0.0.0"]);
        match cli.command {
            Some(Commands::Serve { interface, port }) => {
                assert_eq!(interface.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_sync_with_repo_override() {
        let cli = Cli::parse_from([
            "cards-editor",
            "--repo",
            "someone/fork",
            "--branch",
            "dev",
            "sync",
        ]);
        assert!(matches!(cli.command, Some(Commands::Sync)));
        assert_eq!(cli.repo.as_deref(), Some("someone/fork"));
        assert_eq!(cli.branch.as_deref(), Some("dev"));
    }

    #[test]
    fn test_repo_after_subcommand() {
        let cli = Cli::parse_from(["cards-editor", "sync", "--repo", "someone/fork"]);
        assert_eq!(cli.repo.as_deref(), Some("someone/fork"));
    }
}
