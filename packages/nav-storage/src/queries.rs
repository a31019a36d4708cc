use sqlx::PgExecutor;

use crate::{
	Result,
	catalog::CatalogSnapshot,
	db::Db,
	models::{DocumentRow, FamilyRow, GeographyRow},
};

pub async fn list_geographies<'e, E>(executor: E) -> Result<Vec<GeographyRow>>
where
	E: PgExecutor<'e>,
{
	let rows = sqlx::query_as::<_, GeographyRow>(
		"\
SELECT
	id,
	value,
	slug,
	display_value,
	parent_id
FROM geography
ORDER BY id",
	)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn list_documents<'e, E>(
	executor: E,
	document_ids: &[String],
) -> Result<Vec<DocumentRow>>
where
	E: PgExecutor<'e>,
{
	if document_ids.is_empty() {
		return Ok(vec![]);
	}

	let rows = sqlx::query_as::<_, DocumentRow>(
		"\
SELECT
	fd.import_id AS document_import_id,
	fd.family_import_id,
	fd.document_status::text AS document_status,
	fd.variant_name,
	fd.valid_metadata AS document_metadata,
	pd.title AS document_title,
	pd.content_type,
	pd.source_url,
	pd.cdn_object,
	(
		SELECT s.name
		FROM slug s
		WHERE s.family_document_import_id = fd.import_id
		ORDER BY s.created DESC
		LIMIT 1
	) AS document_slug
FROM family_document fd
JOIN physical_document pd ON pd.id = fd.physical_document_id
WHERE fd.import_id = ANY($1::text[])",
	)
	.bind(document_ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn list_families<'e, E>(executor: E, family_ids: &[String]) -> Result<Vec<FamilyRow>>
where
	E: PgExecutor<'e>,
{
	if family_ids.is_empty() {
		return Ok(vec![]);
	}

	let rows = sqlx::query_as::<_, FamilyRow>(
		"\
SELECT
	f.import_id AS family_import_id,
	fm.value AS family_metadata,
	(
		SELECT min(fe.date)
		FROM family_event fe
		WHERE fe.family_import_id = f.import_id
	) AS published_date,
	(
		SELECT max(fe.date)
		FROM family_event fe
		WHERE fe.family_import_id = f.import_id
	) AS last_updated_date,
	count(fd.import_id) AS total_documents,
	count(fd.import_id) FILTER (
		WHERE fd.document_status::text = 'Published'
	) AS published_documents,
	count(fd.import_id) FILTER (
		WHERE fd.document_status::text = 'Deleted'
	) AS deleted_documents
FROM family f
LEFT JOIN family_metadata fm ON fm.family_import_id = f.import_id
LEFT JOIN family_document fd ON fd.family_import_id = f.import_id
WHERE f.import_id = ANY($1::text[])
GROUP BY f.import_id, fm.value",
	)
	.bind(family_ids)
	.fetch_all(executor)
	.await?;

	Ok(rows)
}

pub async fn list_known_corpora<'e, E>(executor: E, corpus_ids: &[String]) -> Result<Vec<String>>
where
	E: PgExecutor<'e>,
{
	if corpus_ids.is_empty() {
		return Ok(vec![]);
	}

	let ids = sqlx::query_scalar::<_, String>(
		"\
SELECT import_id
FROM corpus
WHERE import_id = ANY($1::text[])
ORDER BY import_id",
	)
	.bind(corpus_ids)
	.fetch_all(executor)
	.await?;

	Ok(ids)
}

/// Loads the catalog rows for a set of document import ids and their families.
pub async fn fetch_catalog_snapshot(db: &Db, document_ids: &[String]) -> Result<CatalogSnapshot> {
	let documents = list_documents(&db.pool, document_ids).await?;
	let mut family_ids: Vec<String> =
		documents.iter().map(|row| row.family_import_id.clone()).collect();

	family_ids.sort();
	family_ids.dedup();

	let families = list_families(&db.pool, &family_ids).await?;

	Ok(CatalogSnapshot::from_rows(families, documents))
}
