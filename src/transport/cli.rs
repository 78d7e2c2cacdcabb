//! CLI commands that run without the HTTP server

use super::types::GenerationResponse;
use crate::config::{Config, API_KEY_ENV};
use crate::orchestration::{GenerationRequest, Orchestrator};
use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::path::Path;

/// Run one generation in-process and print the response JSON to stdout
///
/// # Arguments
/// * `request_path` - JSON file holding a generation request
/// * `config` - resolved configuration
pub async fn run_orchestrate(request_path: &Path, config: &Config) -> Result<()> {
    let content = std::fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read request file {}", request_path.display()))?;
    let request: GenerationRequest = serde_json::from_str(&content)
        .with_context(|| format!("Invalid generation request in {}", request_path.display()))?;

    if !request.has_prompt() {
        bail!("Prompt cannot be empty.");
    }

    let orchestrator = Orchestrator::from_config(&config.llm);
    let outcome = orchestrator
        .run(&request)
        .await
        .context("Generation failed")?;

    for stage in &outcome.stages {
        tracing::debug!(
            "{} ({}) took {:?}",
            stage.stage,
            stage.agent_id,
            stage.duration
        );
    }

    let response = GenerationResponse::from_outcome(&outcome);
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Print the resolved configuration, credential redacted
pub fn run_check_config(config: &Config, config_file: Option<&Path>) -> Result<()> {
    println!("{}", "=== appforge configuration ===".bold().cyan());
    println!();

    let source = match config_file {
        Some(path) => path.display().to_string(),
        None => Config::config_path()
            .filter(|p| p.exists())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "<defaults>".to_string()),
    };
    println!("  Config file:   {}", source);
    println!();

    let llm = &config.llm;
    println!("{}", "[llm]".bold());
    println!("  provider:      {}", llm.provider);
    println!("  base_url:      {}", llm.base_url);
    println!("  model:         {}", llm.model);
    println!("  max_tokens:    {}", llm.max_tokens);
    println!("  temperature:   {}", llm.temperature);
    println!("  top_p:         {}", llm.top_p);
    println!("  timeout_secs:  {}", llm.timeout_secs);
    println!("  retry:         {} attempt(s)", llm.retry.max_attempts);
    println!("  honor options: {}", llm.honor_request_options);

    let key_status = if llm.has_usable_api_key() {
        "usable".green()
    } else {
        format!("not set (use {} or llm.api_key)", API_KEY_ENV).red()
    };
    println!("  api_key:       {} [{}]", llm.redacted_api_key(), key_status);
    println!();

    let server = &config.server;
    println!("{}", "[server]".bold());
    println!("  listen:        {}:{}", server.host, server.port);
    println!(
        "  api_key:       {}",
        if server.api_key.is_some() {
            "required"
        } else {
            "not required"
        }
    );
    let origins = if server.cors_origins.is_empty() {
        "*".to_string()
    } else {
        server.cors_origins.join(", ")
    };
    println!("  cors origins:  {}", origins);

    Ok(())
}
