//! Command implementations behind the CLI.
use crate::artifact::ArtifactStore;
use crate::cli::{CleanupArgs, InitArgs, ListArgs, ShowArgs};
use crate::config::{self, CONFIG_FILE_NAME};
use crate::discovery::list_artifact_paths;
use crate::reconcile::cleanup_project;
use crate::summary::render_cleanup_text;
use crate::util::display_path;
use anyhow::{anyhow, Context, Result};
use std::path::Path;

pub fn run_init(args: InitArgs) -> Result<()> {
    let path = args.root.join(CONFIG_FILE_NAME);
    if path.is_file() && !args.force {
        return Err(anyhow!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        ));
    }
    config::write_config(&args.root, &config::default_config())?;
    println!("wrote {}", path.display());
    Ok(())
}

pub fn run_list(args: ListArgs) -> Result<()> {
    let root = resolve_root(&args.root)?;
    let config = config::load_config_optional(&root)?;
    let paths = list_artifact_paths(&root, &config)
        .with_context(|| format!("scan {}", root.display()))?;
    let rels: Vec<String> = paths
        .iter()
        .map(|path| display_path(path, Some(&root)))
        .collect();
    if args.json {
        let text = serde_json::to_string_pretty(&rels).context("serialize artifact list")?;
        println!("{text}");
    } else {
        for rel in rels {
            println!("{rel}");
        }
    }
    Ok(())
}

pub fn run_show(args: ShowArgs) -> Result<()> {
    let root = resolve_root(&args.root)?;
    let config = config::load_config_optional(&root)?;
    let source = root.join(&args.source);
    let mut store = ArtifactStore::from_config(&config);
    let artifact = store
        .for_file(&source)
        .with_context(|| format!("load artifact for {}", source.display()))?;
    if let Some(warning) = artifact.load_warning() {
        eprintln!("warning: {warning}");
    }
    if args.json {
        let value = serde_json::json!({
            "artifact": display_path(artifact.path(), Some(&root)),
            "entries": artifact.entries(),
        });
        let text = serde_json::to_string_pretty(&value).context("serialize artifact entries")?;
        println!("{text}");
        return Ok(());
    }
    if artifact.is_empty() {
        println!("no entries for {}", display_path(&source, Some(&root)));
        return Ok(());
    }
    for (key, value) in artifact.entries() {
        println!("{key}");
        for line in value.lines() {
            println!("  {line}");
        }
    }
    Ok(())
}

pub fn run_cleanup(args: CleanupArgs) -> Result<()> {
    let root = resolve_root(&args.root)?;
    let config = config::load_config_optional(&root)?;
    let report = cleanup_project(&root, &config, args.apply)
        .with_context(|| format!("reconcile artifacts under {}", root.display()))?;
    if args.json {
        let text = serde_json::to_string_pretty(&report).context("serialize cleanup report")?;
        println!("{text}");
    } else {
        print!("{}", render_cleanup_text(&report));
    }
    Ok(())
}

fn resolve_root(root: &Path) -> Result<std::path::PathBuf> {
    if !root.is_dir() {
        return Err(anyhow!("project root {} is not a directory", root.display()));
    }
    root.canonicalize()
        .with_context(|| format!("resolve project root {}", root.display()))
}
