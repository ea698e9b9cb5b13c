//! `jobscout` - scan a saved job search, screen the results with a
//! two-stage model pipeline, and email the dated CSV report.

mod capture;
mod report;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use resend::ResendClient;
use screening::browser::{WebDriverBrowser, WebDriverBrowserOptions};
use screening::{Blocklist, OpenAiClient, Pipeline, Preferences, SeenLedger};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(name = "jobscout", about = "Job discovery and screening runner", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the saved search, screen the results, emit the report (default)
    Run,
    /// Interactively capture the search URL into .env
    Capture,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(&settings).await,
        Command::Capture => capture::capture(&settings).await,
    }
}

async fn run(settings: &Settings) -> Result<()> {
    println!("{}", "🧭 jobscout".bright_cyan().bold());

    let search_url = settings.search_url.clone().context(
        "SEARCH_URL is not set; run `jobscout capture` once to save your search",
    )?;

    // State and config load first; nothing is spent if any of it fails.
    let preferences = Preferences::load(&settings.config_path)
        .with_context(|| format!("loading preferences from {}", settings.config_path.display()))?;
    let mut ledger = SeenLedger::load(settings.seen_path())?;
    let blocklist = Blocklist::load(settings.blocklist_path())?;
    info!(
        seen = ledger.len(),
        blocked = blocklist.len(),
        "state loaded"
    );

    let ai = OpenAiClient::new(&settings.openai_api_key);
    ai.verify_key().await.context("OpenAI key preflight")?;

    let mut options = WebDriverBrowserOptions::new(&settings.webdriver_url);
    if let Some(dir) = &settings.chrome_profile_dir {
        options = options.with_user_data_dir(dir);
    }
    let browser = WebDriverBrowser::start(options)
        .await
        .context("starting the browser session")?;

    let pipeline = Pipeline::new(browser, ai, preferences);
    let run_result = pipeline.run(&search_url, &mut ledger, &blocklist).await;

    let (browser, _ai) = pipeline.into_collaborators();
    if let Err(e) = browser.shutdown().await {
        warn!(error = %e, "browser shutdown failed");
    }
    let outcome = run_result?;

    // Ledger first: a delivered report must never outrun the ledger.
    ledger.commit(settings.seen_path())?;

    let csv_path = report::write_report(&outcome.rows, &settings.results_dir(), outcome.started_at)?;
    println!("  {} {}", "report:".bright_yellow(), csv_path.display());

    let mailer = ResendClient::new(&settings.resend_api_key);
    let message_id = report::send_report(&mailer, settings, &outcome, &csv_path).await?;
    println!(
        "  {} {} ({message_id})",
        "emailed:".bright_yellow(),
        settings.recipient_email
    );

    println!();
    println!("{}", "✅ Run complete".bright_green().bold());
    println!(
        "  cards: {} | fit: {} | adjudicated: {} | est. cost: ${:.4}",
        outcome.cards_extracted, outcome.passed, outcome.decided, outcome.estimated_cost
    );
    if outcome.degraded {
        println!(
            "{}",
            "⚠ result list never stabilized; card set may be partial".bright_yellow()
        );
    }
    Ok(())
}
