//! gateway-demo: one call per generation parameter, to compare how vendors honor it.
//!
//! Usage:
//!   gateway-demo n [--value 3]
//!   gateway-demo temperature [--value 0.3]
//!   gateway-demo seed [--value 42] [--choices 5]
//!   gateway-demo max-tokens [--value 10]
//!   gateway-demo frequency-penalty [--value 1.2]
//!   gateway-demo presence-penalty [--value 1.5]
//!   gateway-demo stop [--sequence TEXT]...
//!
//! Common options: --model, --message (read from stdin when absent), --print-request,
//! --only-content / --full.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};

use chat_gateway::{ChatRequest, Gateway, GatewayConfig, RunOptions};

#[derive(Parser)]
#[command(
    name = "gateway-demo",
    version,
    about = "Demonstrate one generation parameter against a deployment"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    common: Common,
}

#[derive(Args)]
struct Common {
    /// Deployment name
    #[arg(short, long, global = true, default_value = "gpt-4o")]
    model: String,

    /// User message (read from stdin when absent)
    #[arg(long, global = true)]
    message: Option<String>,

    /// Include the vendor request body in the output
    #[arg(long, global = true)]
    print_request: bool,

    /// Print only the choice contents
    #[arg(long, global = true, conflicts_with = "full")]
    only_content: bool,

    /// Print the whole structured result
    #[arg(long, global = true)]
    full: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Number of choices per call
    N {
        #[arg(long, default_value_t = 3)]
        value: u32,
    },
    /// Sampling temperature (lower is more deterministic)
    Temperature {
        #[arg(long, default_value_t = 0.3, allow_negative_numbers = true)]
        value: f64,
    },
    /// Seed for reproducible sampling
    Seed {
        #[arg(long, default_value_t = 42, allow_negative_numbers = true)]
        value: i64,
        /// Choices generated alongside the seed
        #[arg(long, default_value_t = 5)]
        choices: u32,
    },
    /// Output token cap
    MaxTokens {
        #[arg(long, default_value_t = 10)]
        value: u32,
    },
    /// Penalty on token frequency
    FrequencyPenalty {
        #[arg(long, default_value_t = 1.2, allow_negative_numbers = true)]
        value: f64,
    },
    /// Penalty on token presence
    PresencePenalty {
        #[arg(long, default_value_t = 1.5, allow_negative_numbers = true)]
        value: f64,
    },
    /// Stop sequences
    Stop {
        #[arg(long = "sequence")]
        sequences: Vec<String>,
    },
}

const DEFAULT_STOP: [&str; 4] = [
    "\n\n",
    "**Embedding Layer**",
    "**Transformer Blocks**",
    "**Training**",
];

impl Commands {
    fn apply(self, request: ChatRequest) -> ChatRequest {
        match self {
            Commands::N { value } => request.n(value),
            Commands::Temperature { value } => request.temperature(value),
            Commands::Seed { value, choices } => request.seed(value).n(choices),
            Commands::MaxTokens { value } => request.max_tokens(value),
            Commands::FrequencyPenalty { value } => request.frequency_penalty(value),
            Commands::PresencePenalty { value } => request.presence_penalty(value),
            Commands::Stop { sequences } if sequences.is_empty() => {
                request.stop(DEFAULT_STOP.to_vec())
            }
            Commands::Stop { sequences } => request.stop(sequences),
        }
    }

    /// Whether this demo prints only contents unless told otherwise.
    fn content_only_by_default(&self) -> bool {
        !matches!(
            self,
            Commands::N { .. } | Commands::Seed { .. } | Commands::MaxTokens { .. }
        )
    }
}

fn read_message() -> Result<String> {
    print!("User message: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read the user message from stdin")?;
    let line = line.trim().to_string();
    if line.is_empty() {
        bail!("empty user message");
    }
    Ok(line)
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
    let common = cli.common;

    let gateway = Gateway::from_config(GatewayConfig::from_env()?)
        .context("could not construct the gateway")?;

    let message = match common.message {
        Some(m) => m,
        None => read_message()?,
    };

    let print_only_content = if common.full {
        false
    } else {
        common.only_content || cli.command.content_only_by_default()
    };
    let options = RunOptions {
        print_request: common.print_request,
        print_only_content,
        ..RunOptions::default()
    };

    let request = cli.command.apply(ChatRequest::prompt(common.model, message));
    gateway.run(&request, &options).await?;
    Ok(())
}
