use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use pagecraft_editor::{Block, BlockId, Page};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Pages directory
    #[arg(short, long, default_value = "pages")]
    pub pages_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing Pagecraft project...".bright_blue().bold());

    let pages_dir = PathBuf::from(cwd).join(&args.pages_dir);
    if !pages_dir.exists() {
        fs::create_dir_all(&pages_dir)?;
        println!("  {} Created {}/", "✓".green(), args.pages_dir);
    }

    let example_file = pages_dir.join("home.json");
    if !example_file.exists() {
        fs::write(&example_file, serde_json::to_string_pretty(&example_page())?)?;
        println!("  {} Created home.json", "✓".green());
    }

    let config = Config {
        pages_dir: args.pages_dir.clone(),
        ..Config::default()
    };
    fs::write(&config_path, serde_json::to_string_pretty(&config)?)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/home.json or run: pagecraft apply home edits.json", args.pages_dir);
    println!("  2. Run: pagecraft seo");
    println!("  3. Run: pagecraft export home --target html");

    Ok(())
}

fn example_page() -> Page {
    let mut page = Page::new("home", "Home", "home");
    let mut heading = Block::new("Heading")
        .with_id("welcome-heading")
        .with_prop("text", "Build pages block by block")
        .with_prop("level", 2);
    heading.parent_block_id = Some(BlockId::new("intro"));

    page.blocks = vec![
        Block::new("Hero")
            .with_id("hero")
            .with_prop("title", "Welcome to Pagecraft")
            .with_prop("subtitle", "Your first page"),
        Block::new("Section").with_id("intro").with_prop("padding", 48),
        heading,
    ];
    page.blocks[1].sort_order = 1;
    page
}
