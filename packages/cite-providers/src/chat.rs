use serde::Deserialize;
use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ChatResponse {
	choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
	message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
	content: Option<String>,
}

/// Single-turn completion: one system prompt, one user prompt, text back.
pub async fn generate(
	cfg: &cite_config::LlmProviderConfig,
	system: &str,
	prompt: &str,
) -> Result<String> {
	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": cfg.temperature,
		"messages": [
			{ "role": "system", "content": system },
			{ "role": "user", "content": prompt },
		],
	});

	complete(cfg, body).await
}

pub(crate) async fn complete(cfg: &cite_config::LlmProviderConfig, body: Value) -> Result<String> {
	let client = crate::http_client(cfg.timeout_ms)?;
	let res = client
		.post(crate::endpoint(&cfg.api_base, &cfg.path))
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let raw = res.error_for_status()?.bytes().await?;

	parse_chat_content(&raw)
}

fn parse_chat_content(raw: &[u8]) -> Result<String> {
	let response: ChatResponse = serde_json::from_slice(raw)?;

	response
		.choices
		.into_iter()
		.next()
		.and_then(|choice| choice.message.content)
		.ok_or_else(|| Error::InvalidResponse {
			message: "Chat response is missing message content.".to_string(),
		})
}
