use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use validator::Validate;

use crate::{
    browser::chrome::ChromeSession,
    buzzwords::Buzzwords,
    cli::Cli,
    config::Config,
    job_boards::{indeed::Indeed, JobBoard},
    scan::{scan_and_close, RunResult, ScanStats}
};

mod browser;
mod buzzwords;
mod cli;
mod config;
mod html_text;
mod job_boards;
mod scan;


fn init_logging(verbose: bool) {
    let default_directive = if verbose { "buzzword_scanner=debug" } else { "buzzword_scanner=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}


/// Opens Chrome, runs the search and scan, and closes Chrome again whatever happened.
fn scan_board<B: JobBoard>(config: &Config, board: &B, buzzwords: &Buzzwords, results: &mut RunResult) -> anyhow::Result<ScanStats> {
    let mut session = ChromeSession::launch(&config.chrome_options()).context("Failed to start Chrome")?;
    scan_and_close(&mut session, board, &config.search, buzzwords, config.pause(), results)
}


fn print_results(results: &RunResult, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(results)?);
        return Ok(());
    }
    for job in results.jobs() {
        println!("Job #{}: {}", job.position + 1, job.keywords.join(", "));
    }
    println!("{:?}", results.keyword_lists());
    Ok(())
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(&cli.config).await?;
    config.apply_cli(&cli);
    config.validate().context("Invalid configuration")?;

    let buzzwords = Buzzwords::from_file(&cli.buzzwords_file)?;
    if buzzwords.is_empty() {
        warn!(path = %cli.buzzwords_file.display(), "No buzzwords loaded, nothing will match");
    }
    info!(count = buzzwords.len(), "Loaded buzzwords");

    let board = match &config.start_url {
        Some(url) => Indeed::new(url.clone()),
        None => Indeed::default()
    };

    let (results, outcome) = tokio_rayon::spawn(move || {
        let mut results = RunResult::default();
        let outcome = scan_board(&config, &board, &buzzwords, &mut results);
        (results, outcome)
    }).await;

    if let Err(e) = &outcome {
        error!("{e:#}");
        if !results.is_empty() {
            warn!(jobs = results.jobs().len(), "Printing the matches found before the failure");
        }
    }
    print_results(&results, cli.json)?;
    outcome.map(|_| ())
}
