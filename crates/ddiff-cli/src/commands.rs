use std::fs;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use colored::Colorize;
use ddiff_batch::{BatchConfig, BatchRunner, SchemaComparison, TokenComparison};
use ddiff_tokens::TokenDiffOptions;
use serde_json::json;
use tracing::debug;

use crate::cli::*;
use crate::loader::load_pairs;
use crate::render;

pub fn run_command(cli: Cli) -> anyhow::Result<ExitCode> {
    let config = load_config(cli.config.as_deref(), cli.strict)?;
    match cli.command {
        Command::Tokens(args) => cmd_tokens(args, config, cli.format),
        Command::Components(args) => cmd_components(args, config, cli.format),
    }
}

fn load_config(path: Option<&Path>, strict: bool) -> anyhow::Result<BatchConfig> {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            BatchConfig::from_toml_str(&text)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => BatchConfig::default(),
    };
    config.strict |= strict;
    debug!(?config, "batch configuration");
    Ok(config)
}

fn cmd_tokens(args: InputArgs, config: BatchConfig, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let loaded = load_pairs(&args.original, &args.updated)?;
    let comparison = TokenComparison::new(TokenDiffOptions {
        rename: config.rename.clone(),
    });
    let corpus = BatchRunner::new(comparison, config).run_corpus(loaded.pairs, loaded.failures)?;

    match format {
        OutputFormat::Json => {
            let output = json!({"report": corpus.report, "failures": corpus.failures});
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            render::tokens_text(&mut io::stdout().lock(), &corpus.report, &corpus.failures)?
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_components(args: ComponentArgs, config: BatchConfig, format: OutputFormat) -> anyhow::Result<ExitCode> {
    let loaded = load_pairs(&args.input.original, &args.input.updated)?;
    let batch = BatchRunner::new(SchemaComparison, config).run_with_failures(loaded.pairs, loaded.failures)?;
    let full = batch.combined();
    let report = if args.breaking_only { full.breaking_only() } else { full.clone() };

    match format {
        OutputFormat::Json => {
            let output = json!({"report": report, "failures": batch.failures});
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => render::components_text(&mut io::stdout().lock(), &report, &batch.failures)?,
    }

    if args.fail_on_breaking && full.has_breaking_changes() {
        eprintln!(
            "{} {} breaking change(s)",
            "error:".red().bold(),
            full.summary.breaking_changes
        );
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
