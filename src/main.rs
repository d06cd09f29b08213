use anyhow::Result;
use clap::Parser;
use snapstate::cli::{Command, RootArgs};
use snapstate::workflow;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = RootArgs::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Init(args) => workflow::run_init(args),
        Command::List(args) => workflow::run_list(args),
        Command::Show(args) => workflow::run_show(args),
        Command::Cleanup(args) => workflow::run_cleanup(args),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
