use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::chunk::Chunk;

pub const UNKNOWN: &str = "Unknown";
pub const MISSING_LINK: &str = "#";

pub const CONTEXT_PREAMBLE: &str = "Here is some relevant information that you can use to answer the question. When you use information from these sources, please cite them using the format [Source: {source_doc_id} - {section_heading}]({link}):";
pub const NO_CHUNKS_NOTE: &str = "Note: No document chunks were found for the selected files. The files may not have been processed yet or the file paths may not match. Please ensure the files have been uploaded and processed.";

static CITATION_RE: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"\[Source: ([^\]]+) - ([^\]]+)\]\(([^)]+)\)").expect("citation regex is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
	pub source_doc_id: String,
	pub section_heading: String,
	pub link: String,
}

/// Every `[Source: A - B](C)` marker in `text`, in order of appearance.
pub fn extract_citations(text: &str) -> Vec<Citation> {
	CITATION_RE
		.captures_iter(text)
		.map(|caps| Citation {
			source_doc_id: caps[1].to_string(),
			section_heading: caps[2].to_string(),
			link: caps[3].to_string(),
		})
		.collect()
}

pub fn citation_marker(source_doc_id: &str, section_heading: &str, link: &str) -> String {
	format!("[Source: {source_doc_id} - {section_heading}]({link})")
}

/// Renders one retrieved chunk for the prompt. `position` is 1-based.
pub fn format_chunk_block(position: usize, chunk: &Chunk) -> String {
	let meta = &chunk.metadata;
	let source = or_unknown(meta.source_doc_id.as_deref());
	let section = or_unknown(meta.section_heading.as_deref());
	let journal = or_unknown(meta.journal.as_deref());
	let year = meta.publish_year.map(|year| year.to_string());
	let year = year.as_deref().unwrap_or(UNKNOWN);
	let link = meta.link.as_deref().filter(|value| !value.trim().is_empty()).unwrap_or(MISSING_LINK);
	let marker = citation_marker(source, section, link);

	format!(
		"[CHUNK {position}]\nSource: {source}\nSection: {section}\nJournal: {journal}\nYear: {year}\nLink: {link}\n\nContent: {content}\n\nCitation: {marker}\n---",
		content = chunk.content,
	)
}

fn or_unknown(value: Option<&str>) -> &str {
	value.filter(|value| !value.trim().is_empty()).unwrap_or(UNKNOWN)
}
