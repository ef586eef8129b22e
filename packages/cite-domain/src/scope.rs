use serde::Deserialize;
use serde_json::Value;

/// Identity of the caller a request runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
	pub user_id: String,
}
impl Session {
	pub fn new(user_id: impl Into<String>) -> Self {
		Self { user_id: user_id.into() }
	}

	/// Scope keys for the selected file paths, `"{user_id}/{path}"`.
	pub fn scope_keys(&self, paths: &[String]) -> Vec<String> {
		paths.iter().map(|path| self.scope_key(path)).collect()
	}

	pub fn scope_key(&self, path: &str) -> String {
		format!("{}/{}", self.user_id, path)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionRejection {
	Missing,
	Malformed,
	Empty,
}
impl SelectionRejection {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Missing => "selection_missing",
			Self::Malformed => "selection_malformed",
			Self::Empty => "selection_empty",
		}
	}
}

#[derive(Deserialize)]
struct SelectionEnvelope {
	files: FileSelection,
}

#[derive(Deserialize)]
struct FileSelection {
	selection: Vec<String>,
}

/// Reads the file selection out of request metadata shaped as
/// `{"files": {"selection": ["a.pdf", ...]}}`.
pub fn parse_selection(metadata: Option<&Value>) -> Result<Vec<String>, SelectionRejection> {
	let Some(metadata) = metadata.filter(|value| !value.is_null()) else {
		return Err(SelectionRejection::Missing);
	};
	let envelope = SelectionEnvelope::deserialize(metadata)
		.map_err(|_| SelectionRejection::Malformed)?;

	if envelope.files.selection.is_empty() {
		return Err(SelectionRejection::Empty);
	}

	Ok(envelope.files.selection)
}
