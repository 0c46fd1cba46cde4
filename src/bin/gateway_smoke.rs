//! gateway-smoke: check that each configured deployment works end to end.
//!
//! Usage:
//!   gateway-smoke                                   Test the default deployments
//!   gateway-smoke gpt-4o gemini-2.5-pro             Test the named deployments
//!   TASK_MODELS="gpt-4o,gemini-2.5-pro" gateway-smoke
//!
//! Ctrl+C cancels the in-flight call and skips the remaining models. The summary of the
//! models run so far is still printed, then the process exits with status 130.

use anyhow::Result;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use chat_gateway::harness::{self, MODELS_ENV};
use chat_gateway::{Gateway, GatewayConfig, RunOptions};

#[derive(Parser)]
#[command(
    name = "gateway-smoke",
    version,
    about = "Run one prompt through each deployment and report which ones work"
)]
struct Cli {
    /// Deployment names (default: $TASK_MODELS, then the builtin list)
    models: Vec<String>,

    /// User message sent to every deployment
    #[arg(short, long, default_value = "Say hello and name the model you are, in one sentence.")]
    message: String,

    /// Per-call deadline in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let gateway = match GatewayConfig::from_env().and_then(Gateway::from_config) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("ERROR: could not construct the gateway: {}", e);
            eprintln!(
                "Hint: check the *_API_KEY / *_BASE_URL variables and GATEWAY_CATALOG, if set."
            );
            std::process::exit(1);
        }
    };

    let env_models = std::env::var(MODELS_ENV).ok();
    let models = harness::select_models(&cli.models, env_models.as_deref());

    println!("Running the gateway for the following models:");
    for m in &models {
        println!("  - {}", m);
    }

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let mut options = RunOptions::default().only_content().with_cancel(cancel);
    if let Some(secs) = cli.timeout {
        options = options.with_timeout(std::time::Duration::from_secs(secs));
    }

    let report = harness::run_smoke(&gateway, &models, &cli.message, &options).await;

    println!("\n\n==================== SUMMARY ====================");
    if report.outcomes.is_empty() {
        println!("No models were executed.");
    } else {
        print!("{}", report.summary_table());
        if report.all_ok() {
            println!("\nAll models completed without errors.");
        } else {
            println!("\nOne or more models failed. Check the errors above.");
        }
    }
    println!("=================================================\n");

    if report.interrupted {
        eprintln!("Interrupted by user; stopped further model tests.");
        std::process::exit(130);
    }
    Ok(())
}
