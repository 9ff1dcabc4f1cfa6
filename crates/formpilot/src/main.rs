mod output;

use anyhow::Context;
use clap::{Parser, Subcommand};
use formpilot_engine::config::{ConfigLoader, FormpilotConfig};
use formpilot_engine::dispatch::Dispatcher;
use formpilot_engine::notify::{Notifier, OverlayNotifier, TracingNotifier};
use formpilot_engine::profile::{ProfileLoader, ProfileRegistry};
use formpilot_engine::protocol::SolverResult;
use formpilot_engine::rehearsal::rehearsal_document;
use formpilot_h::{CdpDocument, HeadlessSession, LaunchOptions};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "formpilot", version, about = "Fills job-application forms in Chromium")]
struct Args {
    /// Configuration file (defaults to ./formpilot.yaml, then ~/.formpilot/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List registered profiles
    List,
    /// Open the profile's page in Chromium and fill it
    Run {
        profile: String,
        /// Page to open instead of the profile's URL
        #[arg(long)]
        url: Option<String>,
        /// Launch browser in visible mode (not headless)
        #[arg(long)]
        visible: bool,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
        /// Do not show the result overlay on the page
        #[arg(long)]
        no_overlay: bool,
    },
    /// Dry-run a profile against a page built from its own locators
    Check {
        profile: String,
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Logs go to stderr; stdout carries results.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref()).await?;
    let dispatcher = Dispatcher::new(load_registry(&config).await?, config.timings.clone());

    match args.command {
        Command::List => {
            println!("{}", output::render_profiles(&dispatcher.registry().list()));
            Ok(ExitCode::SUCCESS)
        }
        Command::Run {
            profile,
            url,
            visible,
            json,
            no_overlay,
        } => {
            // Unknown profiles fail before a browser is started.
            let engine = dispatcher.engine_for(&profile)?;
            let page_ready = engine.timings().page_ready_delay();
            let url = match url {
                Some(url) => url,
                None => dispatcher.registry().resolve(&profile)?.url.clone(),
            };
            let mut launch = LaunchOptions::from(&config.browser);
            launch.visible |= visible;

            let plan = RunPlan {
                profile_id: profile,
                url,
                page_ready,
                launch,
                overlay: config.notifications.overlay && !no_overlay,
                dismiss_after_ms: config.notifications.dismiss_after_ms,
            };
            let result = run(&dispatcher, &plan).await?;
            finish(&result, json)
        }
        Command::Check { profile, json } => {
            let definition = dispatcher.registry().resolve(&profile)?;
            let document = rehearsal_document(definition)
                .with_context(|| format!("Profile {} has unusable locators", profile))?;
            let result = dispatcher
                .dispatch(&profile, &document, &TracingNotifier)
                .await?;
            finish(&result, json)
        }
    }
}

async fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<FormpilotConfig> {
    let config = match path {
        Some(path) => ConfigLoader::load_from(path)
            .await
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ConfigLoader::load_default()
            .await
            .context("Failed to load config")?,
    };
    Ok(config)
}

async fn load_registry(config: &FormpilotConfig) -> anyhow::Result<ProfileRegistry> {
    let mut registry = ProfileRegistry::with_builtins();
    if config.profiles.auto_load {
        let count = ProfileLoader::load_into(&config.profiles.profile_paths, &mut registry)
            .await
            .context("Failed to load profiles")?;
        info!("Loaded {} profile(s) from disk", count);
    }
    Ok(registry)
}

/// Everything `run` needs, resolved before a browser is started.
struct RunPlan {
    profile_id: String,
    url: String,
    page_ready: Duration,
    launch: LaunchOptions,
    overlay: bool,
    dismiss_after_ms: u64,
}

async fn run(dispatcher: &Dispatcher, plan: &RunPlan) -> anyhow::Result<SolverResult> {
    let session = HeadlessSession::launch(&plan.launch).await?;
    let outcome = drive(dispatcher, plan, &session).await;

    if let Err(e) = session.close().await {
        warn!("Failed to close browser: {}", e);
    }
    outcome
}

async fn drive(
    dispatcher: &Dispatcher,
    plan: &RunPlan,
    session: &HeadlessSession,
) -> anyhow::Result<SolverResult> {
    session.navigate(&plan.url).await?;
    // Dynamic content keeps arriving after the load event.
    tokio::time::sleep(plan.page_ready).await;

    let document = session.document();
    if !plan.overlay {
        return Ok(dispatcher
            .dispatch(&plan.profile_id, &document, &TracingNotifier)
            .await?);
    }

    let notifier: OverlayNotifier<CdpDocument> =
        OverlayNotifier::new(document.clone(), plan.dismiss_after_ms);
    let result = dispatcher
        .dispatch(&plan.profile_id, &document, &notifier)
        .await?;
    TracingNotifier.notify(&result).await?;

    if plan.launch.visible {
        // Leave the overlay up for its full lifetime before tearing down.
        tokio::time::sleep(Duration::from_millis(plan.dismiss_after_ms + 300)).await;
    }
    if let Err(e) = notifier.uninstall().await {
        warn!("Failed to remove overlay style: {}", e);
    }
    Ok(result)
}

fn finish(result: &SolverResult, json: bool) -> anyhow::Result<ExitCode> {
    println!("{}", output::render_result(result, json)?);
    Ok(if result.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
