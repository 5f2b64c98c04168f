use crate::config::Config;
use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::Page;
use pagecraft_workspace::FilePageStore;

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Page id (file name without .json)
    pub id: String,

    /// Page title (defaults to the id)
    #[arg(short, long)]
    pub title: Option<String>,

    /// URL slug (defaults to the id)
    #[arg(short, long)]
    pub slug: Option<String>,

    /// Overwrite an existing page
    #[arg(short, long)]
    pub force: bool,
}

pub async fn new_page(args: NewArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = FilePageStore::new(config.get_pages_dir(cwd));

    if !args.force && store.list_pages().await?.contains(&args.id) {
        bail!("Page '{}' already exists (use --force to overwrite)", args.id);
    }

    let title = args.title.unwrap_or_else(|| args.id.clone());
    let slug = args.slug.unwrap_or_else(|| args.id.clone());
    let page = Page::new(&args.id, title, slug);

    let path = store.create_page(&page).await?;
    println!("  {} Created {}", "✓".green(), path.display());
    Ok(())
}
