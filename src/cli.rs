//! CLI argument parsing for artifact maintenance.
//!
//! The binary only maintains artifacts on disk; comparisons happen inside the
//! host test runner through the library.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "snapstate",
    version,
    about = "Inspect snapshot artifacts and remove orphaned ones",
    after_help = "Examples:\n  snapstate init --root .\n  snapstate list --root .\n  snapstate show --root . --source src/app.test.js\n  snapstate cleanup --root .            (dry run)\n  snapstate cleanup --root . --apply",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Emit debug logs on stderr (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Init(InitArgs),
    List(ListArgs),
    Show(ShowArgs),
    Cleanup(CleanupArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Write a default snapstate.json")]
pub struct InitArgs {
    /// Project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Overwrite an existing snapstate.json
    #[arg(long)]
    pub force: bool,
}

#[derive(Parser, Debug)]
#[command(about = "List artifact files found under the project root")]
pub struct ListArgs {
    /// Project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Print the entries recorded for one source test file")]
pub struct ShowArgs {
    /// Project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Source test file, relative to the root or absolute
    #[arg(long, value_name = "PATH")]
    pub source: PathBuf,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
#[command(about = "Find artifacts whose source file is gone (dry run unless --apply)")]
pub struct CleanupArgs {
    /// Project root
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Delete orphaned artifacts instead of only reporting them
    #[arg(long)]
    pub apply: bool,

    /// Emit machine-readable JSON output
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cleanup_defaults_to_dry_run() {
        let args = RootArgs::try_parse_from(["snapstate", "cleanup"]).expect("parse");
        match args.command {
            Command::Cleanup(cleanup) => {
                assert!(!cleanup.apply);
                assert_eq!(cleanup.root, PathBuf::from("."));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbose_is_accepted_after_the_subcommand() {
        let args = RootArgs::try_parse_from(["snapstate", "list", "--verbose", "--json"])
            .expect("parse");
        assert!(args.verbose);
    }

    #[test]
    fn show_requires_a_source() {
        assert!(RootArgs::try_parse_from(["snapstate", "show"]).is_err());
    }
}
