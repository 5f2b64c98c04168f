use crate::config::Config;
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Mutation, StaticRegistry};
use pagecraft_export::compile_outline;
use pagecraft_workspace::{EditorSession, FilePageStore, Notifier};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Page id to edit
    pub page: String,

    /// JSON file with an array of mutations
    pub script: PathBuf,

    /// Stop at the first rejected mutation
    #[arg(long)]
    pub strict: bool,

    /// Print the resulting outline without saving
    #[arg(long)]
    pub dry_run: bool,
}

pub async fn apply(args: ApplyArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = Arc::new(FilePageStore::new(config.get_pages_dir(cwd)));

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("Cannot read {}", args.script.display()))?;
    let mutations: Vec<Mutation> = serde_json::from_str(&script)
        .with_context(|| format!("Invalid mutation script {}", args.script.display()))?;

    let (notifier, _notifications) = Notifier::channel();
    let mut session = EditorSession::open(
        &args.page,
        store,
        Arc::new(StaticRegistry::builtin()),
        notifier,
        &config.session_config(),
    )
    .await?;

    println!(
        "{} {} mutations to {}",
        "✏️".bright_blue(),
        mutations.len(),
        args.page.bright_white()
    );

    let mut rejected = 0;
    for (i, mutation) in mutations.into_iter().enumerate() {
        let name = mutation.name();
        match session.apply(mutation) {
            Ok(_) => println!("  {} #{} {}", "✓".green(), i + 1, name),
            Err(err) => {
                rejected += 1;
                tracing::warn!(index = i + 1, mutation = name, error = %err, "mutation rejected");
                println!("  {} #{} {} - {}", "✗".red(), i + 1, name, err.user_message());
                if args.strict {
                    session.close();
                    bail!("Mutation #{} rejected; nothing was saved", i + 1);
                }
            }
        }
    }

    if args.dry_run {
        println!();
        print!("{}", compile_outline(&session.to_page())?);
        session.close();
        return Ok(());
    }

    let result = session.save().await;
    tracing::info!(page = %args.page, success = result.success, rejected, "apply finished");
    session.close();
    if !result.success {
        return Err(anyhow!("Failed to save page: {}", result.message));
    }

    println!();
    if rejected > 0 {
        println!("{} Saved with {} rejected mutations", "⚠️".yellow(), rejected);
    } else {
        println!("{}", "✅ Page saved".green().bold());
    }
    Ok(())
}
