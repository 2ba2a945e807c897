mod cli;
mod ui;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use cutout::validator::validate;
use cutout::{CutoutConfig, RemovalClient, SourceFile, TypePolicy, Workflow, WorkflowError, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose)?;

    let mut config = CutoutConfig::load().context("failed to load configuration")?;
    if let Some(endpoint) = cli.endpoint {
        config.api_url = endpoint;
    }
    if let Some(api_key) = cli.api_key {
        config.api_key = api_key;
    }
    if let Some(secs) = cli.timeout {
        config.request_timeout_secs = secs;
    }
    config.validate().context("invalid command-line overrides")?;

    match cli.command {
        Command::Remove {
            file,
            output,
            strict,
        } => {
            if strict {
                config.type_policy = TypePolicy::AllowList;
            }
            remove(&config, file, output).await
        }
        Command::Check { file, strict } => {
            if strict {
                config.type_policy = TypePolicy::AllowList;
            }
            check(&config, file).await
        }
        Command::Health => {
            let client = RemovalClient::new(&config)?;
            let health = client
                .health()
                .await
                .with_context(|| format!("health check failed for {}", client.endpoint()))?;
            ui::print_health(client.endpoint(), &health);
            Ok(())
        }
    }
}

async fn open(file: &Path) -> Result<SourceFile> {
    SourceFile::from_path(file)
        .await
        .with_context(|| format!("cannot open '{}'", file.display()))
}

async fn remove(config: &CutoutConfig, file: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let source = open(&file).await?;
    let name = source.name().to_string();
    let workflow = Workflow::new(RemovalClient::new(config)?, config);

    if let Err(err) = workflow.select_file(source) {
        ui::print_rejection(&err);
        return Err(err.into());
    }

    let progress = ui::SubmitProgress::start(&name);
    let outcome = workflow.submit().await;
    let snapshot = workflow.snapshot();
    progress.complete(&snapshot);
    if let Err(err) = outcome {
        ui::print_snapshot(&snapshot);
        return Err(err.into());
    }

    let dest = output.unwrap_or_else(|| PathBuf::from("."));
    let written = workflow.export_result(&dest).await?;
    ui::print_exported(&written);
    ui::print_snapshot(&workflow.snapshot());

    workflow.reset();
    Ok(())
}

async fn check(config: &CutoutConfig, file: PathBuf) -> Result<()> {
    let source = open(&file).await?;
    match validate(&source, &config.policy()) {
        Ok(()) => {
            ui::print_accepted(&source);
            Ok(())
        }
        Err(rejection) => {
            let err = WorkflowError::from(rejection);
            ui::print_rejection(&err);
            Err(err.into())
        }
    }
}
