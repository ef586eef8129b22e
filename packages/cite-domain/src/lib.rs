pub mod chunk;
pub mod citation;
pub mod prompt;
pub mod ranking;
pub mod scope;
pub mod usage;

pub use chunk::{Candidate, Chunk, ChunkMetadata};
pub use citation::Citation;
pub use prompt::{ContentPart, Message, PromptParams, Role};
pub use ranking::{RankError, RankOptions};
pub use scope::{SelectionRejection, Session};
pub use usage::{SessionUsage, UsageEntry};
