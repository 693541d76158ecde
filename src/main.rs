//! epigram - CLI entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use epigram::auth::{CredentialCache, GcloudTokenFetcher};
use epigram::commitlint;
use epigram::config::Settings;
use epigram::git::{GitCommitWriter, GitDiffSource};
use epigram::pipeline::{
    CommitPipeline, CommitWriter, DialoguerSelector, PipelineOutcome, PrintWriter,
};
use epigram::provider::{ProviderRegistry, ReqwestTransport};

/// Generate Conventional Commit messages from the staged diff using AI.
#[derive(Parser, Debug)]
#[command(name = "epigram")]
#[command(about = "Generate Conventional Commit messages from the staged diff using AI")]
#[command(version)]
struct Cli {
    /// Provider to use (overrides the config file)
    #[arg(short, long)]
    provider: Option<String>,

    /// Path to an alternate config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the selected message without creating a commit
    #[arg(long)]
    dry_run: bool,

    /// List registered providers and exit
    #[arg(long)]
    list_providers: bool,

    /// Verbose logging (debug level)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "epigram=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    // Step 1: Load settings, with the CLI flag overriding the active provider
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(provider) = cli.provider {
        settings.provider = Some(provider);
    }

    // Step 2: Build the session context: one transport, one credential
    // cache, one registry for the whole run
    let transport = Arc::new(ReqwestTransport::new().context("Failed to build HTTP client")?);
    let credentials = Arc::new(CredentialCache::new(Box::new(GcloudTokenFetcher)));
    let registry = Arc::new(ProviderRegistry::with_builtin(transport, credentials));

    if cli.list_providers {
        let active = settings.provider.as_deref().unwrap_or("");
        for name in registry.list() {
            let marker = if name == active { " (active)" } else { "" };
            println!("{name}{marker}");
        }
        return Ok(());
    }

    // Step 3: Look up commitlint rules for the prompt
    let repo_root = PathBuf::from(".");
    let rules = commitlint::load_rules(&repo_root).await;
    if rules.text.is_some() {
        println!("Using commitlint rules from the repository");
    }

    // Step 4: Assemble and run the pipeline
    let writer: Box<dyn CommitWriter> = if cli.dry_run {
        Box::new(PrintWriter)
    } else {
        Box::new(GitCommitWriter::new(repo_root.clone()))
    };

    let mut pipeline = CommitPipeline::new(
        registry,
        settings,
        Box::new(GitDiffSource::new(repo_root)),
        Box::new(DialoguerSelector),
        writer,
        rules.text,
    );

    match pipeline.run().await? {
        PipelineOutcome::Committed { message } => {
            if cli.dry_run {
                println!("✓ Dry run complete. No commit created.");
            } else {
                println!("✓ Committed: {message}");
            }
        }
        PipelineOutcome::Cancelled => {
            println!("Aborted. No commit created.");
        }
    }

    Ok(())
}
