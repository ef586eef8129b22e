use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outgoing chat-model request: the conversation plus opaque provider metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptParams {
	pub prompt: Vec<Message>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub provider_metadata: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
	System,
	User,
	Assistant,
	Tool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
	pub role: Role,
	pub content: Vec<ContentPart>,
}
impl Message {
	pub fn user(text: impl Into<String>) -> Self {
		Self { role: Role::User, content: vec![ContentPart::text(text)] }
	}

	pub fn assistant(text: impl Into<String>) -> Self {
		Self { role: Role::Assistant, content: vec![ContentPart::text(text)] }
	}

	/// Text parts joined with newlines. Non-text parts are skipped.
	pub fn text(&self) -> String {
		self.content
			.iter()
			.filter_map(|part| match part {
				ContentPart::Text { text } => Some(text.as_str()),
				_ => None,
			})
			.collect::<Vec<_>>()
			.join("\n")
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
	Text { text: String },
	Image { image: String },
}
impl ContentPart {
	pub fn text(text: impl Into<String>) -> Self {
		Self::Text { text: text.into() }
	}
}
