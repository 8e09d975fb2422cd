//! Outbound language-model call.
//!
//! Providers are tried in the configured order until one succeeds or all
//! fail; today the chain holds a single Fireworks.ai entry, but the shape
//! supports more without duplicating the dispatch. The request carries a
//! bounded timeout and is never retried — failure surfaces to the caller.

use anyhow::{anyhow, bail, Context, Result};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::LlmConfig;

const FIREWORKS_URL: &str = "https://api.fireworks.ai/inference/v1/chat/completions";

/// Runs the provider chain for one prompt. Fails fast when no credentials
/// were supplied, before any network traffic.
pub async fn generate_answer(config: &LlmConfig, prompt: &str, api_key: &str) -> Result<String> {
    if api_key.trim().is_empty() {
        bail!("no API key provided");
    }

    let mut last_err: Option<anyhow::Error> = None;
    for provider in &config.providers {
        info!("trying llm provider '{}'", provider);
        let result = match provider.as_str() {
            "fireworks" => call_fireworks(config, prompt, api_key).await,
            other => Err(anyhow!("unknown llm provider '{}'", other)),
        };
        match result {
            Ok(answer) => return Ok(answer),
            Err(e) => {
                warn!("llm provider '{}' failed: {}", provider, e);
                last_err = Some(e);
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("no llm providers configured")))
}

async fn call_fireworks(config: &LlmConfig, prompt: &str, api_key: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .context("failed to build HTTP client")?;

    let payload = json!({
        "model": config.model,
        "max_tokens": config.max_tokens,
        "top_p": 1,
        "top_k": 40,
        "presence_penalty": 0,
        "frequency_penalty": 0,
        "temperature": 0.3,
        "messages": [
            { "role": "user", "content": prompt }
        ]
    });

    let response = client
        .post(FIREWORKS_URL)
        .bearer_auth(api_key)
        .json(&payload)
        .send()
        .await
        .context("fireworks request failed")?
        .error_for_status()
        .context("fireworks returned an error status")?;

    let data: Value = response
        .json()
        .await
        .context("fireworks response was not valid JSON")?;

    let content = data
        .get("choices")
        .and_then(|c| c.get(0))
        .and_then(|choice| choice.get("message"))
        .and_then(|message| message.get("content"))
        .and_then(|content| content.as_str())
        .ok_or_else(|| anyhow!("fireworks returned unexpected data: {}", data))?;

    Ok(content.trim().to_string())
}
