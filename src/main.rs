mod error;
mod parser;
mod render;
mod server;
mod settings;
mod splice;
mod store;
mod sync;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use parser::SectionName;
use settings::Settings;
use store::SiteRoot;
use sync::{SectionOutcome, SkipReason};

#[derive(Parser)]
#[command(name = "card_sync", about = "Preview site pages and refresh clearance cards from a CSV export")]
struct Cli {
    /// Config file (default: ./card_sync.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Site directory holding the pages (overrides config)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the preview dashboard
    Serve {
        /// Address to listen on (overrides config)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Rewrite the card section of every mapped page from a CSV export
    Sync {
        /// Spreadsheet export
        csv: PathBuf,
    },
    /// Show how many items each section of a CSV export holds
    Sections {
        csv: PathBuf,
    },
    /// Print the card grid for one section (no files are changed)
    Render {
        csv: PathBuf,
        /// Section label, e.g. "living room"
        #[arg(short, long)]
        section: String,
    },
    /// List browsable files in the site directory
    Files,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(root) = cli.root {
        settings.root = root;
    }
    let site = SiteRoot::new(settings.root.clone(), settings.exclude.clone());

    let result = match cli.command {
        Commands::Serve { bind } => {
            let bind = bind.unwrap_or_else(|| settings.bind.clone());
            let state = server::AppState::new(site, settings.target_table());
            server::serve(state, &bind).await
        }
        Commands::Sync { csv } => {
            let text = read_csv(&csv)?;
            let targets = settings.target_table();
            let report = sync::parse_and_synchronize(&site, &text, |s| targets.get(&s).cloned())?;

            for (section, outcome) in &report.sections {
                match outcome {
                    SectionOutcome::Applied { file, items, backup } => {
                        println!("{:<12} | {:>3} items -> {} (backup {})", section, items, file, backup);
                    }
                    SectionOutcome::Skipped(reason) => {
                        println!("{:<12} | skipped: {}", section, describe_skip(reason));
                    }
                }
            }
            println!("\nUpdated {} file(s).", report.files().len());
            Ok(())
        }
        Commands::Sections { csv } => {
            let sections = parser::parse_sections(&read_csv(&csv)?)?;
            for (section, items) in &sections {
                println!("{:<12} | {:>3}", section, items.len());
            }
            let total: usize = sections.values().map(Vec::len).sum();
            println!("\n{} items total", total);
            Ok(())
        }
        Commands::Render { csv, section } => {
            let Some(name) = SectionName::from_header(&section) else {
                bail!("Unknown section {:?} (expected one of: living room, bedroom, dining room, recliner)", section);
            };
            let sections = parser::parse_sections(&read_csv(&csv)?)?;
            let items = sections.get(&name).map(Vec::as_slice).unwrap_or_default();
            println!("{}", render::render_cards_only(items));
            Ok(())
        }
        Commands::Files => {
            let files = site
                .list_files()
                .with_context(|| format!("Failed to list {}", site.root().display()))?;
            if files.is_empty() {
                println!("No files in {}", site.root().display());
            }
            for f in &files {
                println!("{}", f);
            }
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        eprintln!("\nDone in {:.1}s", elapsed.as_secs_f64());
    }

    result
}

fn read_csv(path: &Path) -> anyhow::Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn describe_skip(reason: &SkipReason) -> String {
    match reason {
        SkipReason::Unconfigured => "no target file configured".to_string(),
        SkipReason::MissingFile { file } => format!("{} does not exist", file),
        SkipReason::MissingMarker { file, detail } => format!("{}: {}", file, detail),
        SkipReason::Io { file, detail } => format!("{}: {}", file, detail),
    }
}
