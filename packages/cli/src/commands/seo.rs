use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use pagecraft_editor::Page;
use pagecraft_seo::{analyze_page, AnalyzeOptions, DiagnosticLevel, SeoReport};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Args, Debug)]
pub struct SeoArgs {
    /// Page file or directory to check (defaults to the pages directory)
    pub input: Option<PathBuf>,

    /// Show all diagnostics including info level
    #[arg(short, long)]
    pub verbose: bool,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Fail when any page scores below this
    #[arg(long, default_value_t = 0)]
    pub min_score: u8,
}

pub fn seo(args: SeoArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let input = args.input.clone().unwrap_or_else(|| config.get_pages_dir(cwd));

    let files = if input.is_file() {
        vec![input.clone()]
    } else if input.is_dir() {
        find_page_files(&input)
    } else {
        return Err(anyhow!("Input path does not exist: {}", input.display()));
    };

    if args.format != "json" {
        println!("🔍 {} Pagecraft SEO check", "Starting".green().bold());
        println!("   Input: {}", input.display());
        println!("   Found {} pages", files.len());
        println!();
    }

    let mut reports = Vec::new();
    for file in &files {
        let page = match load_page(file) {
            Ok(page) => page,
            Err(err) => {
                eprintln!("{} Failed to read {}: {}", "✗".red(), file.display(), err);
                continue;
            }
        };
        let report = analyze_page(
            &page,
            AnalyzeOptions {
                include_hidden: config.export.include_hidden,
                ..Default::default()
            },
        );
        reports.push((page.id, report));
    }

    if args.format == "json" {
        let json: serde_json::Map<String, serde_json::Value> = reports
            .iter()
            .map(|(id, report)| Ok((id.clone(), serde_json::to_value(report)?)))
            .collect::<Result<_, serde_json::Error>>()?;
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for (id, report) in &reports {
            print_report(id, report, args.verbose);
        }
    }

    let total_errors: usize = reports.iter().map(|(_, r)| r.errors().count()).sum();
    let lowest = reports.iter().map(|(_, r)| r.score).min();
    let below_min = lowest.map(|score| score < args.min_score).unwrap_or(false);

    if args.format != "json" {
        println!(
            "✨ {} SEO check complete!",
            if total_errors > 0 || below_min {
                "Done".red().bold()
            } else {
                "Done".green().bold()
            }
        );
        println!("   Pages checked: {}", reports.len());
        if let Some(lowest) = lowest {
            println!("   Lowest score: {}", lowest);
        }
    }

    // Exit with error code if there are errors
    if total_errors > 0 || below_min {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(id: &str, report: &SeoReport, verbose: bool) {
    let score = format!("{}/100", report.score);
    let score = match report.score {
        80..=100 => score.green().bold(),
        50..=79 => score.yellow().bold(),
        _ => score.red().bold(),
    };
    println!("{} {}", id.bright_white(), score);

    for diagnostic in &report.diagnostics {
        if !verbose && matches!(diagnostic.level, DiagnosticLevel::Info) {
            continue;
        }

        let level_str = match diagnostic.level {
            DiagnosticLevel::Error => "error".red().bold(),
            DiagnosticLevel::Warning => "warning".yellow().bold(),
            DiagnosticLevel::Info => "info".blue().bold(),
        };

        match &diagnostic.block_id {
            Some(block_id) => println!(
                "  {} [{}] {} ({})",
                level_str, diagnostic.rule, diagnostic.message, block_id
            ),
            None => println!("  {} [{}] {}", level_str, diagnostic.rule, diagnostic.message),
        }

        if let Some(suggestion) = &diagnostic.suggestion {
            println!("    {} {}", "💡".dimmed(), suggestion.dimmed());
        }
    }

    println!();
}

fn load_page(path: &Path) -> Result<Page> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn find_page_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().map(|e| e == "json").unwrap_or(false))
        .collect();
    files.sort();
    files
}
