//! Turns the engine's flat hit list into the Family → Document → Passage response tree.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;
use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::{
	Result,
	cursor::{ContinuationTokens, ResumePoint},
	params::ValidatedParameters,
	response::{DocumentResult, FamilyResult, PassageMatch, SearchResponse},
};
use nav_domain::passage::{self, PassageSortKey};
use nav_engine::{EngineHit, EngineResponse, HitFields, PassageHit};
use nav_storage::catalog::{CatalogSnapshot, DocumentRecord};

pub struct AssemblyContext<'a> {
	pub params: &'a ValidatedParameters,
	pub fingerprint: &'a str,
	pub resume: &'a ResumePoint,
}

pub struct ResultAssembler<'a> {
	documents: &'a nav_config::Documents,
	tokens: &'a ContinuationTokens,
	hidden_source_urls: &'a [Regex],
}
impl<'a> ResultAssembler<'a> {
	pub fn new(
		documents: &'a nav_config::Documents,
		tokens: &'a ContinuationTokens,
		hidden_source_urls: &'a [Regex],
	) -> Self {
		Self { documents, tokens, hidden_source_urls }
	}

	pub fn assemble(
		&self,
		response: EngineResponse,
		snapshot: &CatalogSnapshot,
		ctx: &AssemblyContext<'_>,
	) -> Result<SearchResponse> {
		let EngineResponse { total_family_hits, query_time_ms, passage_totals, hits, .. } =
			response;
		let surviving: Vec<FamilyGroup> = group_hits(hits, snapshot, ctx.params)
			.into_iter()
			.filter(|group| {
				if !group.survives {
					tracing::debug!(
						family_import_id = %group.id,
						"Omitting family without published documents."
					);
				}

				group.survives
			})
			.collect();
		let hits = surviving.len() as u32;
		let mut families = Vec::new();

		for group in surviving
			.into_iter()
			.skip(ctx.params.offset as usize)
			.take(ctx.params.page_size as usize)
		{
			families.push(self.family_result(group, snapshot, &passage_totals, ctx)?);
		}

		let window = ctx.resume.family_offset;
		let step = ctx.params.limit;
		let continuation_token = if window.saturating_add(step) < total_family_hits {
			Some(self.tokens.family_forward(ctx.fingerprint, window, step)?)
		} else {
			None
		};
		let prev_continuation_token = if window > 0 {
			Some(self.tokens.family_backward(ctx.fingerprint, window, step)?)
		} else {
			None
		};

		Ok(SearchResponse {
			hits,
			total_family_hits,
			query_time_ms,
			total_time_ms: 0,
			continuation_token,
			this_continuation_token: Some(self.tokens.family(ctx.fingerprint, window)?),
			prev_continuation_token,
			families,
		})
	}

	fn family_result(
		&self,
		group: FamilyGroup,
		snapshot: &CatalogSnapshot,
		passage_totals: &BTreeMap<String, u32>,
		ctx: &AssemblyContext<'_>,
	) -> Result<FamilyResult> {
		let total_passage_hits =
			passage_totals.get(&group.id).copied().unwrap_or(group.passages_seen);
		let offset = ctx.resume.passage_offset(&group.id);
		let step = ctx.params.max_hits_per_family;
		let continuation_token = if offset.saturating_add(step) < total_passage_hits {
			Some(self.tokens.passage_forward(&group.id, ctx.fingerprint, offset, step)?)
		} else {
			None
		};
		let prev_continuation_token = if offset > 0 {
			Some(self.tokens.passage_backward(&group.id, ctx.fingerprint, offset, step)?)
		} else {
			None
		};
		let record = snapshot.family(&group.id);
		let family_documents = group
			.documents
			.into_iter()
			.filter_map(|document| {
				let record = snapshot.published_document(&document.id)?;

				Some(self.document_result(document, record, ctx.params.sort_within_page))
			})
			.collect();
		let head = group.head;

		Ok(FamilyResult {
			family_slug: head.family_slug.unwrap_or_default(),
			family_name: head.family_name.unwrap_or_default(),
			family_description: head.family_description.unwrap_or_default(),
			family_category: head.family_category.unwrap_or_default(),
			family_date: format_date(record.and_then(|family| family.published_date)),
			family_last_updated_date: format_date(
				record.and_then(|family| family.last_updated_date),
			),
			family_source: head.family_source.unwrap_or_default(),
			family_geographies: head.family_geographies.unwrap_or_default(),
			family_metadata: record
				.map(|family| family.metadata.clone())
				.unwrap_or_else(|| Value::Object(Map::new())),
			corpus_import_id: head.corpus_import_id.unwrap_or_default(),
			corpus_type_name: head.corpus_type_name.unwrap_or_default(),
			family_title_match: group.title_match,
			family_description_match: group.description_match,
			total_passage_hits,
			continuation_token,
			prev_continuation_token,
			family_documents,
		})
	}

	fn document_result(
		&self,
		document: DocumentGroup,
		record: &DocumentRecord,
		sort_within_page: bool,
	) -> DocumentResult {
		let mut passages = document.passages;

		if sort_within_page {
			for hit in &passages {
				if PassageSortKey::new(hit.text_block_page, &hit.text_block_id).is_opaque() {
					tracing::warn!(
						document_import_id = %document.id,
						text_block_id = %hit.text_block_id,
						"Text block id has no block number; ordering it by string."
					);
				}
			}

			passage::sort_in_reading_order(&mut passages, |hit| {
				PassageSortKey::new(hit.text_block_page, &hit.text_block_id)
			});
		}

		let head = document.head;
		let source_url = head
			.document_source_url
			.or_else(|| record.source_url.clone())
			.filter(|url| !self.is_hidden_source(url));
		let document_url = head
			.document_cdn_object
			.or_else(|| record.cdn_object.clone())
			.map(|object| self.cdn_url(&object));

		DocumentResult {
			document_slug: record.slug.clone().or(head.document_slug).unwrap_or_default(),
			document_title: record.title.clone(),
			document_type: record.document_type.clone(),
			document_postfix: record.postfix.clone(),
			document_content_type: record.content_type.clone().or(head.document_content_type),
			document_languages: head.document_languages,
			document_source_url: source_url,
			document_url,
			document_passage_matches: passages.into_iter().map(passage_match).collect(),
		}
	}

	fn is_hidden_source(&self, url: &str) -> bool {
		self.hidden_source_urls.iter().any(|pattern| pattern.is_match(url))
	}

	fn cdn_url(&self, object: &str) -> String {
		let object = object.trim_start_matches('/');

		format!("https://{}/navigator/{object}", self.documents.cdn_domain)
	}
}

struct FamilyGroup {
	id: String,
	head: HitFields,
	survives: bool,
	title_match: bool,
	description_match: bool,
	passages_seen: u32,
	documents: Vec<DocumentGroup>,
}

struct DocumentGroup {
	id: String,
	head: HitFields,
	passages: Vec<PassageHit>,
}

/// Fields a hit must carry to be shown at all.
struct RequiredFields<'h> {
	family_id: &'h str,
	document_id: &'h str,
}
impl<'h> RequiredFields<'h> {
	fn of(fields: &'h HitFields) -> Option<Self> {
		fields.family_slug.as_ref()?;
		fields.family_name.as_ref()?;
		fields.family_category.as_ref()?;
		fields.family_source.as_ref()?;
		fields.family_geographies.as_ref()?;
		fields.corpus_import_id.as_ref()?;
		fields.corpus_type_name.as_ref()?;
		fields.document_slug.as_ref()?;

		Some(Self {
			family_id: fields.family_import_id.as_deref()?,
			document_id: fields.document_import_id.as_deref()?,
		})
	}
}

/// Groups hits by family, then by document, keeping first-seen order at both levels.
fn group_hits(
	hits: Vec<EngineHit>,
	snapshot: &CatalogSnapshot,
	params: &ValidatedParameters,
) -> Vec<FamilyGroup> {
	let mut families: Vec<FamilyGroup> = Vec::new();
	let mut index: HashMap<String, usize> = HashMap::new();

	for hit in hits {
		let fields = hit.fields();
		let Some(required) = RequiredFields::of(fields) else {
			tracing::warn!(
				family_import_id = ?fields.family_import_id,
				document_import_id = ?fields.document_import_id,
				"Skipping hit with missing required family fields."
			);

			continue;
		};

		if !params.admits(required.family_id, required.document_id) {
			tracing::debug!(
				family_import_id = required.family_id,
				document_import_id = required.document_id,
				"Skipping hit outside the requested family and document ids."
			);

			continue;
		}

		let family_id = required.family_id.to_string();
		let document_id = required.document_id.to_string();
		let slot = *index.entry(family_id.clone()).or_insert_with(|| {
			families.push(FamilyGroup {
				id: family_id.clone(),
				head: fields.clone(),
				survives: false,
				title_match: false,
				description_match: false,
				passages_seen: 0,
				documents: Vec::new(),
			});

			families.len() - 1
		});
		let family = &mut families[slot];
		let published = snapshot
			.published_document(&document_id)
			.is_some_and(|record| record.family_import_id == family_id);

		if !published {
			tracing::debug!(
				family_import_id = %family_id,
				document_import_id = %document_id,
				"Dropping hit for a document that is unknown or unpublished."
			);

			continue;
		}

		family.survives = true;

		if matches!(hit, EngineHit::Passage(_)) {
			family.passages_seen += 1;
		}

		match hit {
			EngineHit::Document(_) => {
				family.title_match = true;
				family.description_match = true;
			},
			EngineHit::Passage(passage) => {
				match family.documents.iter_mut().find(|document| document.id == document_id) {
					Some(document) => document.passages.push(passage),
					None => family.documents.push(DocumentGroup {
						id: document_id,
						head: passage.fields.clone(),
						passages: vec![passage],
					}),
				}
			},
		}
	}

	families
}

fn passage_match(hit: PassageHit) -> PassageMatch {
	PassageMatch {
		text: hit.text_block,
		text_block_id: hit.text_block_id,
		text_block_page: hit.text_block_page.map(|page| page.saturating_add(1)),
		text_block_coords: hit.text_block_coords,
		text_block_type: hit.text_block_type,
		concepts: hit.concepts,
	}
}

fn format_date(date: Option<OffsetDateTime>) -> String {
	date.and_then(|date| date.format(&Rfc3339).ok()).unwrap_or_default()
}
