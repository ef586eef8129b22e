//! Prompt augmentation for the chat pipeline.
//!
//! [`CiteService::transform`] fails open: every skip condition and every stage error hands back
//! the prompt exactly as it came in.

use std::time::Duration;

use uuid::Uuid;

use cite_domain::{
	ContentPart, PromptParams, RankOptions, Role, SelectionRejection, Session, citation, ranking,
	scope,
};

use crate::{CiteService, Error, QueryKind, Result, usage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
	NoSession,
	Selection(SelectionRejection),
	NoUserMessage,
	QueryTooShort,
	NotAQuestion(QueryKind),
	NoMatches,
}
impl SkipReason {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::NoSession => "no_session",
			Self::Selection(rejection) => rejection.as_str(),
			Self::NoUserMessage => "no_user_message",
			Self::QueryTooShort => "query_too_short",
			Self::NotAQuestion(_) => "not_a_question",
			Self::NoMatches => "no_matches",
		}
	}
}

enum Retrieval {
	Skip(SkipReason),
	Augment(Vec<ContentPart>),
}

impl CiteService {
	/// Appends retrieved, citation-annotated context to the last user message.
	pub async fn transform(&self, params: PromptParams, session: Option<&Session>) -> PromptParams {
		let request_id = Uuid::new_v4();
		let outcome = match self.cfg.retrieval.deadline_ms {
			Some(deadline_ms) => tokio::time::timeout(
				Duration::from_millis(deadline_ms),
				self.retrieve(&params, session, request_id),
			)
			.await
			.unwrap_or(Err(Error::Timeout { elapsed_ms: deadline_ms })),
			None => self.retrieve(&params, session, request_id).await,
		};

		match outcome {
			Ok(Retrieval::Augment(parts)) => {
				tracing::info!(
					%request_id,
					parts = parts.len(),
					"Augmented prompt with retrieved context."
				);

				append_to_last_message(params, parts)
			},
			Ok(Retrieval::Skip(reason)) => {
				tracing::debug!(%request_id, reason = reason.as_str(), "Retrieval skipped.");

				params
			},
			Err(err) => {
				tracing::warn!(
					%request_id,
					error = %err,
					"Retrieval failed; forwarding the original prompt."
				);

				params
			},
		}
	}

	async fn retrieve(
		&self,
		params: &PromptParams,
		session: Option<&Session>,
		request_id: Uuid,
	) -> Result<Retrieval> {
		let retrieval = &self.cfg.retrieval;
		let Some(session) = session else {
			return Ok(Retrieval::Skip(SkipReason::NoSession));
		};
		let selection = match scope::parse_selection(params.provider_metadata.as_ref()) {
			Ok(selection) => selection,
			Err(rejection) => return Ok(Retrieval::Skip(SkipReason::Selection(rejection))),
		};
		let Some(last) = params.prompt.last().filter(|message| message.role == Role::User) else {
			return Ok(Retrieval::Skip(SkipReason::NoUserMessage));
		};
		let query = last.text();

		if query.chars().count() < retrieval.min_query_chars as usize {
			return Ok(Retrieval::Skip(SkipReason::QueryTooShort));
		}
		if retrieval.classify {
			let kind = self.classify_query(&query).await?;

			if kind != QueryKind::Question {
				return Ok(Retrieval::Skip(SkipReason::NotAQuestion(kind)));
			}
		}

		let effective = if retrieval.hypothetical_answer {
			self.hypothetical_answer(&query).await?
		} else {
			query
		};
		let query_vec = self.embed_query(&effective).await?;
		let scope_keys = session.scope_keys(&selection);
		let chunks = self.store.chunks_by_scope(&scope_keys).await?;

		if chunks.is_empty() {
			tracing::info!(
				%request_id,
				scopes = scope_keys.len(),
				"No chunks stored for the selected files."
			);

			return Ok(Retrieval::Augment(vec![ContentPart::text(citation::NO_CHUNKS_NOTE)]));
		}

		let candidates_total = chunks.len();
		let opts = RankOptions::new(retrieval.top_k as usize).with_min_score(retrieval.min_score);
		let top = ranking::rank(&query_vec, chunks, opts)?;

		tracing::debug!(
			%request_id,
			candidates = candidates_total,
			selected = top.len(),
			"Ranked candidate chunks."
		);

		if top.is_empty() {
			return Ok(Retrieval::Skip(SkipReason::NoMatches));
		}

		usage::spawn_usage_increments(
			&self.store,
			top.iter().map(|candidate| candidate.chunk.id.clone()).collect(),
			request_id,
		);

		let mut parts = Vec::with_capacity(top.len() + 1);

		parts.push(ContentPart::text(citation::CONTEXT_PREAMBLE));
		parts.extend(top.iter().enumerate().map(|(idx, candidate)| {
			ContentPart::text(citation::format_chunk_block(idx + 1, &candidate.chunk))
		}));

		Ok(Retrieval::Augment(parts))
	}
}

fn append_to_last_message(mut params: PromptParams, parts: Vec<ContentPart>) -> PromptParams {
	if let Some(last) = params.prompt.last_mut() {
		last.content.extend(parts);
	}

	params
}
