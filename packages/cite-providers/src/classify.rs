use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct LabelOutput {
	label: String,
}

/// Asks the model to pick exactly one of `labels` for `text`.
pub async fn classify(
	cfg: &cite_config::LlmProviderConfig,
	text: &str,
	labels: &[&str],
) -> Result<String> {
	if labels.is_empty() {
		return Err(Error::InvalidConfig {
			message: "Classification requires at least one label.".to_string(),
		});
	}

	let body = serde_json::json!({
		"model": cfg.model,
		"temperature": 0.0,
		"response_format": { "type": "json_object" },
		"messages": [
			{ "role": "system", "content": system_prompt(labels) },
			{ "role": "user", "content": text },
		],
	});
	let content = crate::chat::complete(cfg, body).await?;

	parse_label(&content, labels)
}

fn system_prompt(labels: &[&str]) -> String {
	format!(
		"Classify the user's message. Respond with a JSON object of the form {{\"label\": \"<label>\"}} where <label> is exactly one of: {}.",
		labels.join(", ")
	)
}

fn parse_label(content: &str, labels: &[&str]) -> Result<String> {
	let raw = match serde_json::from_str::<LabelOutput>(content) {
		Ok(output) => output.label,
		Err(_) => content.to_string(),
	};
	let normalized = raw.trim().trim_matches('"').to_lowercase();

	labels
		.iter()
		.find(|label| label.eq_ignore_ascii_case(&normalized))
		.map(|label| label.to_string())
		.ok_or_else(|| Error::InvalidResponse {
			message: format!("Classifier returned unknown label {normalized:?}."),
		})
}
