use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_export::{compile_outline, compile_to_css, compile_to_html, compile_to_json, CompileOptions};
use pagecraft_workspace::{FilePageStore, PageStore};
use std::fs;

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Page id to export
    pub page: String,

    /// Target format (html, css, json, outline)
    #[arg(short, long, default_value = "html")]
    pub target: String,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Render hidden blocks
    #[arg(long)]
    pub include_hidden: bool,
}

pub async fn export(args: ExportArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let store = FilePageStore::new(config.get_pages_dir(cwd));
    let page = store.load_page(&args.page).await?;
    tracing::debug!(page = %page.id, target = %args.target, blocks = page.blocks.len(), "exporting");

    let (output, extension) = match args.target.as_str() {
        "html" => {
            let options = CompileOptions {
                pretty: config.export.pretty,
                include_hidden: args.include_hidden || config.export.include_hidden,
                ..Default::default()
            };
            (compile_to_html(&page, options)?, "html")
        }
        "css" => (compile_to_css(&page), "css"),
        "json" => (compile_to_json(&page, config.export.pretty)?, "json"),
        "outline" => (compile_outline(&page)?, "txt"),
        other => {
            return Err(anyhow!(
                "Unknown target: {}. Use: html, css, json, or outline",
                other
            ))
        }
    };

    if args.stdout {
        print!("{}", output);
        return Ok(());
    }

    let out_dir = match &args.out_dir {
        Some(dir) => std::path::PathBuf::from(cwd).join(dir),
        None => config.get_out_dir(cwd),
    };
    fs::create_dir_all(&out_dir)?;

    let output_path = out_dir.join(format!("{}.{}", page.id, extension));
    fs::write(&output_path, output)?;
    tracing::info!(page = %page.id, path = %output_path.display(), "exported");

    println!(
        "  {} {} → {}",
        "✓".green(),
        args.page,
        output_path.display()
    );
    Ok(())
}
