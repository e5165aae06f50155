use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use indicatif::{ParallelProgressIterator, ProgressStyle};
use rayon::prelude::*;
use std::{
    fs,
    io::{self, Read},
    net::SocketAddr,
    path::{Path, PathBuf},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cricket_scorecard_scraper::{
    collection::MatchCollection,
    config::ScraperConfig,
    export,
    web::{self, AppState},
    Report, ScorecardScraper,
};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional JSON config file; environment variables still override it
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Extract statistics from a single scorecard page
    ProcessFile {
        /// Path to the HTML file, or "-" to read stdin
        #[arg(short, long)]
        file: String,

        /// Match title; defaults to the page heading
        #[arg(short, long)]
        title: Option<String>,

        /// Also write the stat rows as CSV to this path
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the report as JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Extract every saved page (.html/.htm) in a directory into one CSV
    BatchProcess {
        /// Directory holding saved scorecard pages
        #[arg(short, long, default_value = "html_files")]
        dir: PathBuf,

        /// Number of files to process (for testing)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output CSV path; defaults to a timestamped file in the output directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the web interface
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut html = String::new();
        io::stdin()
            .read_to_string(&mut html)
            .context("Failed to read HTML from stdin")?;
        return Ok(html);
    }
    fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))
}

fn process_file(
    config: &ScraperConfig,
    file: &str,
    title: Option<&str>,
    csv: Option<&Path>,
    json: bool,
) -> Result<()> {
    let html = read_input(file)?;
    info!("Processing scorecard: {}", file);

    let scraper = ScorecardScraper::new(config);
    let report = scraper.extract(&html, title)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.text());
    }

    if let Some(path) = csv {
        export::write_csv_file(path, std::slice::from_ref(&report))?;
        info!("Wrote CSV to {:?}", path);
    }
    Ok(())
}

fn html_files_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn batch_process(
    config: &ScraperConfig,
    dir: &Path,
    limit: Option<usize>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut html_files = html_files_in(dir)?;
    if let Some(limit) = limit {
        html_files.truncate(limit);
    }
    if html_files.is_empty() {
        bail!("No HTML files found in {}", dir.display());
    }
    info!("Found {} HTML files to process", html_files.len());

    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} files processed ({eta})")?;

    let scraper = ScorecardScraper::new(config);
    // Indexed par_iter + collect keeps the sorted file order.
    let outcomes: Vec<Option<Report>> = html_files
        .par_iter()
        .progress_with_style(style)
        .map(|path| {
            let html = match fs::read_to_string(path) {
                Ok(html) => html,
                Err(e) => {
                    warn!("Failed to read file {:?}: {}", path, e);
                    return None;
                }
            };
            let title = path.file_stem().and_then(|stem| stem.to_str());
            match scraper.extract(&html, title) {
                Ok(report) => Some(report),
                Err(e) => {
                    warn!("Skipping {:?}: {}", path, e);
                    None
                }
            }
        })
        .collect();

    let mut collection = MatchCollection::new();
    let mut failed = 0;
    for outcome in outcomes {
        match outcome {
            Some(report) => {
                collection.add(report);
            }
            None => failed += 1,
        }
    }

    let output = output.unwrap_or_else(|| {
        Path::new(&config.export.output_dir).join(export::default_export_filename(Utc::now()))
    });
    export::write_csv_file(&output, collection.reports())?;
    info!(
        "Extracted {} matches ({} failed) into {:?}",
        collection.len(),
        failed,
        output
    );
    Ok(())
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ScraperConfig::from_file(path)?,
        None => ScraperConfig::from_env(),
    };

    match cli.command {
        Commands::ProcessFile { file, title, csv, json } => {
            process_file(&config, &file, title.as_deref(), csv.as_deref(), json)?;
        }
        Commands::BatchProcess { dir, limit, output } => {
            batch_process(&config, &dir, limit, output)?;
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.web.port);
            let addr: SocketAddr = format!("{}:{}", config.web.host, port)
                .parse()
                .with_context(|| format!("Invalid listen address {}:{}", config.web.host, port))?;
            let state = AppState::new(&config);

            // Create a new tokio runtime just for the server
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(web::serve(state, addr))?;
        }
    }

    Ok(())
}
