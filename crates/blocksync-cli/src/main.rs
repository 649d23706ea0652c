//! blocksync CLI
//!
//! Manage the block registry and keep embedded copies in sync.

mod cli;
mod commands;
mod context;
mod error;
mod logging;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use context::Workspace;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.verbose) {
        eprintln!("{}: failed to initialise logging: {}", "warning".yellow(), e);
    }
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} keeps shared text blocks in sync", "blocksync".green().bold());
        println!();
        println!("Run {} for available commands.", "blocksync --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let mut ws = Workspace::open(cli.root.as_deref(), &cwd)?;
    execute_command(&mut ws, command)
}

fn execute_command(ws: &mut Workspace, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::List { tag, search, json } => {
            commands::run_list(ws, tag.as_deref(), search.as_deref(), json)
        }
        Commands::Show { id } => commands::run_show(ws, &id),
        Commands::Create {
            name,
            content,
            from,
            tags,
        } => commands::run_create(ws, &name, content.as_deref(), from.as_deref(), tags),
        Commands::Rename { id, name } => commands::run_rename(ws, &id, &name),
        Commands::Tag { id, tag } => commands::run_tag(ws, &id, &tag),
        Commands::Untag { id, tag } => commands::run_untag(ws, &id, &tag),
        Commands::Remove { id } => commands::run_remove(ws, &id),
        Commands::Status { id, json } => commands::run_status(ws, id.as_ref(), json),
        Commands::Push { id, all } => commands::run_push(ws, id.as_ref(), all),
        Commands::Pull { id, file } => commands::run_pull(ws, &id, &file),
        Commands::Diff { id, file, context } => commands::run_diff(ws, &id, &file, context),
        Commands::Wrap {
            file,
            start,
            end,
            name,
            tags,
        } => commands::run_wrap(ws, &file, start, end, &name, tags),
        Commands::Insert { id, file, line } => commands::run_insert(ws, &id, &file, line),
    }
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
    fn test_push_requires_id_or_all() {
        assert!(Cli::try_parse_from(["blocksync", "push"]).is_err());
        assert!(Cli::try_parse_from(["blocksync", "push", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["blocksync", "push", "a1b2c3", "--all"]).is_err());
    }

    #[test]
    fn test_ids_are_validated_by_the_parser() {
        assert!(Cli::try_parse_from(["blocksync", "show", "XYZ"]).is_err());
        let cli = Cli::try_parse_from(["blocksync", "show", "a1b2c3"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Show { .. })));
    }
}
