use serde::{Deserialize, Serialize};

use crate::citation::Citation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEntry {
	pub source_doc_id: String,
	pub usage_count: u64,
	/// Not recoverable from a citation marker; stays `None` unless the client supplied it.
	#[serde(default)]
	pub journal: Option<String>,
	pub link: String,
}

/// Per-conversation tally of cited source documents, most cited first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionUsage {
	entries: Vec<UsageEntry>,
}
impl SessionUsage {
	pub fn new(entries: Vec<UsageEntry>) -> Self {
		Self { entries }
	}

	pub fn entries(&self) -> &[UsageEntry] {
		&self.entries
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn get(&self, source_doc_id: &str) -> Option<&UsageEntry> {
		self.entries.iter().find(|entry| entry.source_doc_id == source_doc_id)
	}

	/// Counts each citation against its source document and re-sorts by count.
	pub fn apply(&self, citations: &[Citation]) -> Self {
		let mut entries = self.entries.clone();

		for citation in citations {
			match entries.iter_mut().find(|entry| entry.source_doc_id == citation.source_doc_id) {
				Some(entry) => entry.usage_count += 1,
				None => entries.push(UsageEntry {
					source_doc_id: citation.source_doc_id.clone(),
					usage_count: 1,
					journal: None,
					link: citation.link.clone(),
				}),
			}
		}

		entries.sort_by(|a, b| b.usage_count.cmp(&a.usage_count));

		Self { entries }
	}

	/// The `limit` most cited documents.
	pub fn top(&self, limit: usize) -> &[UsageEntry] {
		&self.entries[..self.entries.len().min(limit)]
	}
}
