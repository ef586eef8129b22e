use crate::{CiteService, Error, Result};

const HYPOTHETICAL_ANSWER_SYSTEM_PROMPT: &str = "\
You write a short passage, two to four sentences, that could appear in a research paper and \
directly answers the user's question. State plausible facts plainly. Do not hedge, do not \
mention that the passage is hypothetical, and do not add citations.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
	Question,
	Statement,
	Other,
}
impl QueryKind {
	pub const LABELS: [&'static str; 3] = ["question", "statement", "other"];

	pub fn from_label(label: &str) -> Option<Self> {
		match label.trim().to_ascii_lowercase().as_str() {
			"question" => Some(Self::Question),
			"statement" => Some(Self::Statement),
			"other" => Some(Self::Other),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::Question => "question",
			Self::Statement => "statement",
			Self::Other => "other",
		}
	}
}

impl CiteService {
	pub(crate) async fn classify_query(&self, text: &str) -> Result<QueryKind> {
		let label = self
			.providers
			.classifier
			.classify(&self.cfg.providers.llm_fast, text, &QueryKind::LABELS)
			.await?;

		QueryKind::from_label(&label).ok_or_else(|| Error::Provider {
			message: format!("Classifier returned unknown label {label:?}."),
		})
	}

	/// HyDE text to embed in place of the query. Falls back to the query when the model
	/// returns nothing.
	pub(crate) async fn hypothetical_answer(&self, query: &str) -> Result<String> {
		let answer = self
			.providers
			.generator
			.generate(&self.cfg.providers.llm_fast, HYPOTHETICAL_ANSWER_SYSTEM_PROMPT, query)
			.await?;
		let answer = answer.trim();

		if answer.is_empty() {
			tracing::info!("Hypothetical answer was empty; embedding the raw query.");

			return Ok(query.to_string());
		}

		Ok(answer.to_string())
	}

	pub(crate) async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
		let cfg = &self.cfg.providers.embedding;
		let embeddings = self.providers.embedding.embed(cfg, &[text.to_string()]).await?;
		let Some(vector) = embeddings.into_iter().next() else {
			return Err(Error::Provider {
				message: "Embedding provider returned no vectors.".to_string(),
			});
		};

		if vector.len() != cfg.dimensions as usize {
			return Err(Error::Provider {
				message: format!(
					"Embedding vector has {} dimensions; expected {}.",
					vector.len(),
					cfg.dimensions
				),
			});
		}

		Ok(vector)
	}
}
