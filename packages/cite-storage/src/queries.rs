use serde_json::Value;

use cite_domain::Chunk;

use crate::{Error, Result, db::Db, models::ChunkRow};

const CHUNK_COLUMNS: &str = "\
id, file_path, content, embedding, source_doc_id, chunk_index, section_heading, doi, journal, \
publish_year, usage_count, attributes, link";

/// Chunks owned by any of `scope_keys`, ordered by file and position within the file.
pub async fn chunks_by_scope(db: &Db, scope_keys: &[String]) -> Result<Vec<Chunk>> {
	if scope_keys.is_empty() {
		return Ok(Vec::new());
	}

	let sql = format!(
		"\
SELECT {CHUNK_COLUMNS}
FROM chunks
WHERE file_path = ANY($1)
ORDER BY file_path, chunk_index NULLS LAST, id"
	);
	let rows: Vec<ChunkRow> = sqlx::query_as(&sql).bind(scope_keys).fetch_all(&db.pool).await?;

	Ok(rows.into_iter().map(Chunk::from).collect())
}

pub async fn all_chunks(db: &Db) -> Result<Vec<Chunk>> {
	let sql = format!(
		"\
SELECT {CHUNK_COLUMNS}
FROM chunks
ORDER BY file_path, chunk_index NULLS LAST, id"
	);
	let rows: Vec<ChunkRow> = sqlx::query_as(&sql).fetch_all(&db.pool).await?;

	Ok(rows.into_iter().map(Chunk::from).collect())
}

pub async fn increment_usage(db: &Db, chunk_id: &str) -> Result<()> {
	sqlx::query("UPDATE chunks SET usage_count = usage_count + 1 WHERE id = $1")
		.bind(chunk_id)
		.execute(&db.pool)
		.await?;

	Ok(())
}

/// Replaces the stored chunks of every file the batch touches with the batch.
///
/// Rows of those files whose id is not in the batch are deleted; the rest are upserted with the
/// supplied usage counts.
pub async fn insert_chunks(db: &Db, chunks: &[Chunk]) -> Result<()> {
	let mut scope_keys: Vec<&str> = chunks.iter().map(|chunk| chunk.scope_key.as_str()).collect();

	scope_keys.sort_unstable();
	scope_keys.dedup();

	let ids: Vec<&str> = chunks.iter().map(|chunk| chunk.id.as_str()).collect();
	let mut tx = db.pool.begin().await?;

	sqlx::query("DELETE FROM chunks WHERE file_path = ANY($1) AND NOT (id = ANY($2))")
		.bind(scope_keys.as_slice())
		.bind(ids.as_slice())
		.execute(&mut *tx)
		.await?;

	for chunk in chunks {
		if chunk.embedding.is_empty() {
			return Err(Error::InvalidArgument(format!("Chunk {} has no embedding.", chunk.id)));
		}

		let meta = &chunk.metadata;
		let attributes = if meta.attributes.is_empty() {
			None
		} else {
			Some(Value::from(meta.attributes.clone()))
		};
		let usage_count = i64::try_from(chunk.usage_count).map_err(|_| {
			Error::InvalidArgument(format!("Chunk {} usage count is out of range.", chunk.id))
		})?;

		sqlx::query(
			"\
INSERT INTO chunks (
	id,
	file_path,
	content,
	embedding,
	source_doc_id,
	chunk_index,
	section_heading,
	doi,
	journal,
	publish_year,
	usage_count,
	attributes,
	link
)
VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
ON CONFLICT (id) DO UPDATE
SET
	file_path = EXCLUDED.file_path,
	content = EXCLUDED.content,
	embedding = EXCLUDED.embedding,
	source_doc_id = EXCLUDED.source_doc_id,
	chunk_index = EXCLUDED.chunk_index,
	section_heading = EXCLUDED.section_heading,
	doi = EXCLUDED.doi,
	journal = EXCLUDED.journal,
	publish_year = EXCLUDED.publish_year,
	usage_count = EXCLUDED.usage_count,
	attributes = EXCLUDED.attributes,
	link = EXCLUDED.link",
		)
		.bind(chunk.id.as_str())
		.bind(chunk.scope_key.as_str())
		.bind(chunk.content.as_str())
		.bind(chunk.embedding.as_slice())
		.bind(meta.source_doc_id.as_deref())
		.bind(meta.chunk_index)
		.bind(meta.section_heading.as_deref())
		.bind(meta.doi.as_deref())
		.bind(meta.journal.as_deref())
		.bind(meta.publish_year)
		.bind(usage_count)
		.bind(attributes)
		.bind(meta.link.as_deref())
		.execute(&mut *tx)
		.await?;
	}

	tx.commit().await?;

	Ok(())
}
