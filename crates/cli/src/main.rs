//! Hosted model prediction CLI
//!
//! A command-line tool for running predictions against hosted models
//! and browsing the model catalog.

mod commands;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use commands::{models, predict};
use predict_lib::{ClientConfig, PredictionClient, PredictionClientBuilder};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Hosted model prediction CLI
#[derive(Parser)]
#[command(name = "predict")]
#[command(author, version, about = "CLI for hosted model predictions", long_about = None)]
pub struct Cli {
    /// API base URL (can also be set via CLARIFAI_API_BASE env var)
    #[arg(long, env = "CLARIFAI_API_BASE", global = true)]
    pub api_url: Option<String>,

    /// Personal access token (can also be set via CLARIFAI_PAT env var)
    #[arg(long, env = "CLARIFAI_PAT", hide_env_values = true, global = true)]
    pub pat: Option<String>,

    /// Client configuration file (toml, yaml or json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Write logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a prediction
    Run(predict::RunArgs),

    /// Browse the model catalog
    #[command(subcommand)]
    Models(ModelsCommands),
}

#[derive(Subcommand)]
pub enum ModelsCommands {
    /// Search models
    List {
        /// Free-text search on name and description
        #[arg(long, short)]
        query: Option<String>,

        /// Filter by model type (e.g. visual-classifier, text-to-text)
        #[arg(long)]
        model_type: Option<String>,

        /// Page number, starting at 1
        #[arg(long)]
        page: Option<u32>,

        /// Results per page
        #[arg(long)]
        per_page: Option<u32>,
    },

    /// Show a model and its inference parameters
    Show {
        /// Model URL or owner/app/model[@version]
        model: String,
    },
}

fn init_tracing(verbose: bool, log_json: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn build_client(cli: &Cli, prefs: &config::Preferences) -> Result<PredictionClient> {
    let mut client_config = ClientConfig::load(cli.config.as_deref())?;

    if let Some(api_url) = cli.api_url.clone().or_else(|| prefs.api_url.clone()) {
        client_config.api_base = api_url;
    }
    if let Some(pat) = &cli.pat {
        client_config.pat = Some(pat.clone());
    }
    if client_config.pat.is_none() {
        anyhow::bail!("No personal access token; pass --pat or set CLARIFAI_PAT");
    }
    debug!(
        api_base = %client_config.api_base,
        request_timeout_secs = client_config.request_timeout_secs,
        connect_timeout_secs = client_config.connect_timeout_secs,
        user_agent = %client_config.user_agent,
        "Client configured"
    );

    PredictionClientBuilder::from_config(&client_config)
        .build()
        .context("Failed to create prediction client")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let prefs = config::Preferences::load()?;
    let format = cli.format.or_else(|| prefs.format()).unwrap_or_default();

    // Initialize client
    let client = build_client(&cli, &prefs)?;

    // Execute command
    match cli.command {
        Commands::Run(args) => {
            predict::run(&client, args, format).await?;
        }
        Commands::Models(models_cmd) => match models_cmd {
            ModelsCommands::List {
                query,
                model_type,
                page,
                per_page,
            } => {
                models::list_models(&client, query, model_type, page, per_page, format).await?;
            }
            ModelsCommands::Show { model } => {
                models::show_model(&client, &model, format).await?;
            }
        },
    }

    Ok(())
}
