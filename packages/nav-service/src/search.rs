use std::time::Instant;

use crate::{
	Caller, CorpusAccessGate, Error, NavigatorService, Result, SearchRequest, SearchResponse,
	assemble::{AssemblyContext, ResultAssembler},
	filters::{FilterTranslator, Translation},
	params::SearchParameterBuilder,
};
use nav_engine::{EngineHit, EngineQuery};

impl NavigatorService {
	/// Runs one search end to end: validate, translate, authorize, query, enrich, assemble.
	pub async fn search(&self, caller: &Caller, request: SearchRequest) -> Result<SearchResponse> {
		let started = Instant::now();
		let params = SearchParameterBuilder::new(&self.cfg.search).build(&request)?;
		let fingerprint = params.fingerprint()?;
		let resume = self.tokens.resume(&params.continuation_tokens, &fingerprint)?;
		let translation = FilterTranslator::new(&self.geographies).translate(&params.filters)?;
		let authorized = CorpusAccessGate::authorize(
			&caller.allowed_corpora,
			params.requested_corpora.as_deref(),
		)?;

		self.verify_caller(caller).await?;

		let translated = match translation {
			Translation::Filters(filters) => filters,
			Translation::Unsatisfiable { reason } => {
				tracing::info!(
					mode = params.mode.as_str(),
					%reason,
					"Search cannot match anything."
				);

				return Ok(SearchResponse {
					total_time_ms: elapsed_ms(started),
					..Default::default()
				});
			},
		};
		let query = EngineQuery {
			query_string: params.query_string.clone(),
			exact_match: params.exact_match,
			all_results: params.all_results(),
			documents_only: params.documents_only(),
			filters: translated.canonical,
			metadata: translated.metadata,
			concepts: translated.concepts,
			year_range: params.year_range,
			sort: params.sort,
			family_ids: params.family_ids.clone(),
			document_ids: params.document_ids.clone(),
			corpus_type_names: params.corpus_type_names.clone(),
			corpus_import_ids: authorized.into_filter(),
			family_offset: resume.family_offset,
			limit: params.limit,
			max_hits_per_family: params.max_hits_per_family,
			passage_window: resume.passage.clone(),
		};
		let response = self.backends.engine.search(&query).await?;
		let document_ids = hit_document_ids(&response.hits);
		let snapshot = self.backends.catalog.snapshot(&document_ids).await?;

		if snapshot.is_empty() && !document_ids.is_empty() {
			tracing::debug!(
				documents = document_ids.len(),
				"Catalog knows none of the documents the engine returned."
			);
		}

		let ctx = AssemblyContext { params: &params, fingerprint: &fingerprint, resume: &resume };
		let mut assembled =
			ResultAssembler::new(&self.cfg.documents, &self.tokens, &self.hidden_source_urls)
				.assemble(response, &snapshot, &ctx)?;

		assembled.total_time_ms = elapsed_ms(started);

		tracing::info!(
			mode = params.mode.as_str(),
			families = assembled.families.len(),
			total_family_hits = assembled.total_family_hits,
			query_time_ms = assembled.query_time_ms,
			total_time_ms = assembled.total_time_ms,
			"Search completed."
		);

		Ok(assembled)
	}

	/// A restricted caller must name at least one corpus the catalog knows about.
	async fn verify_caller(&self, caller: &Caller) -> Result<()> {
		if caller.allowed_corpora.is_empty() {
			return Ok(());
		}

		let known = self.backends.catalog.known_corpora(&caller.allowed_corpora).await?;

		if known.is_empty() {
			tracing::warn!(
				allowed_corpora = ?caller.allowed_corpora,
				"Caller token names no known corpora."
			);

			return Err(Error::InvalidCaller {
				message: "Error verifying corpora IDs.".to_string(),
			});
		}

		Ok(())
	}
}

fn hit_document_ids(hits: &[EngineHit]) -> Vec<String> {
	let mut ids: Vec<String> =
		hits.iter().filter_map(|hit| hit.fields().document_import_id.clone()).collect();

	ids.sort();
	ids.dedup();

	ids
}

fn elapsed_ms(started: Instant) -> u64 {
	u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
