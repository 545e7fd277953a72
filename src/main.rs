//! cards-editor - a web editor for the card game's `cards.js` data module.

mod cli;
mod codec;
mod config;
mod document;
mod editor;
mod logger;
mod serve;
mod sync;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::EditorConfig;
use editor::Editor;
use serve::serve_editor;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EditorConfig::load(&cli)?;

    match &cli.command {
        None | Some(Commands::Serve { .. }) => serve_editor(&config),
        Some(Commands::Sync) => run_sync(&config),
        Some(Commands::Show) => show(&config),
    }
}

/// Run remote sync once with the configured repository and branch.
fn run_sync(config: &EditorConfig) -> Result<()> {
    let report = Editor::new(config).sync(None, None)?;
    for path in &report.changed {
        log!("sync"; "updated {}", path.display());
    }
    log!("sync"; "{} files changed", report.count());
    Ok(())
}

/// Print what the editor would show for the current data file.
fn show(config: &EditorConfig) -> Result<()> {
    let view = Editor::new(config).view()?;
    println!("{}", config.data.path.display());
    println!("{}", view.summary());
    Ok(())
}
