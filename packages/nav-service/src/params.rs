//! Request validation and normalization.

use serde_json::json;

use crate::{
	Error, Result,
	request::{CONCEPT_FILTER_NAMES, SearchFilter, SearchRequest},
};
use nav_engine::{EngineSort, SortField, YearRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
	/// No query and no concepts: list whole families.
	Browse,
	/// No query, but concept filters select passages.
	BrowseWithConcepts,
	Standard,
}
impl SearchMode {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Browse => "browse",
			Self::BrowseWithConcepts => "browse_with_concepts",
			Self::Standard => "standard",
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedParameters {
	pub query_string: String,
	pub exact_match: bool,
	pub mode: SearchMode,
	pub filters: Vec<SearchFilter>,
	pub year_range: Option<YearRange>,
	pub sort: Option<EngineSort>,
	pub family_ids: Option<Vec<String>>,
	pub document_ids: Option<Vec<String>>,
	pub corpus_type_names: Option<Vec<String>>,
	pub requested_corpora: Option<Vec<String>>,
	pub page_size: u32,
	pub offset: u32,
	pub limit: u32,
	pub max_hits_per_family: u32,
	pub continuation_tokens: Vec<String>,
	pub sort_within_page: bool,
}
impl ValidatedParameters {
	pub fn all_results(&self) -> bool {
		self.mode != SearchMode::Standard
	}

	pub fn documents_only(&self) -> bool {
		self.mode == SearchMode::Browse
	}

	/// Whether a hit falls inside the requested family and document restrictions.
	pub fn admits(&self, family_id: &str, document_id: &str) -> bool {
		let family_ok =
			self.family_ids.as_ref().is_none_or(|ids| ids.iter().any(|id| id == family_id));
		let document_ok =
			self.document_ids.as_ref().is_none_or(|ids| ids.iter().any(|id| id == document_id));

		family_ok && document_ok
	}

	/// Hash of every field that decides which results a query returns.
	///
	/// Paging fields are excluded, so every page of one query shares a fingerprint.
	pub fn fingerprint(&self) -> Result<String> {
		let payload = json!({
			"query_string": self.query_string,
			"exact_match": self.exact_match,
			"filters": self.filters,
			"year_range": self.year_range,
			"sort": self.sort,
			"family_ids": self.family_ids,
			"document_ids": self.document_ids,
			"corpus_type_names": self.corpus_type_names,
			"corpus_import_ids": self.requested_corpora,
		});
		let raw = serde_json::to_vec(&payload).map_err(|err| Error::Internal {
			message: format!("Failed to encode query fingerprint: {err}"),
		})?;

		Ok(blake3::hash(&raw).to_hex()[..32].to_string())
	}
}

pub struct SearchParameterBuilder<'a> {
	limits: &'a nav_config::Search,
}
impl<'a> SearchParameterBuilder<'a> {
	pub fn new(limits: &'a nav_config::Search) -> Self {
		Self { limits }
	}

	pub fn build(&self, request: &SearchRequest) -> Result<ValidatedParameters> {
		let page_size = request.page_size.unwrap_or(self.limits.default_page_size);
		let offset = request.offset.unwrap_or(0);
		let limit = request.limit.unwrap_or(self.limits.default_limit);
		let max_hits_per_family =
			request.max_hits_per_family.unwrap_or(self.limits.default_max_hits_per_family);

		self.check_bounds(page_size, offset, limit, max_hits_per_family)?;

		if request.continuation_tokens.len() > 2 {
			return Err(invalid("At most two continuation tokens may be supplied."));
		}

		let year_range = match request.year_range {
			Some((Some(start), Some(end))) if start > end => {
				return Err(invalid("year_range start must not be after its end."));
			},
			Some((None, None)) | None => None,
			Some((start, end)) => Some(YearRange { start, end }),
		};

		for filter in request.metadata_filters.iter().chain(&request.concept_filters) {
			if filter.name.trim().is_empty() || filter.value.trim().is_empty() {
				return Err(invalid("Metadata and concept filters need a name and a value."));
			}
		}
		for filter in &request.concept_filters {
			if !CONCEPT_FILTER_NAMES.contains(&filter.name.as_str()) {
				return Err(Error::InvalidRequest {
					message: format!(
						"Unsupported concept filter name: {}. Expected one of {}.",
						filter.name,
						CONCEPT_FILTER_NAMES.join(", ")
					),
				});
			}
		}

		let filters = request.filters()?;
		let family_ids = normalize_list(request.family_ids.as_deref());
		let document_ids = normalize_list(request.document_ids.as_deref());

		for ids in [&family_ids, &document_ids].into_iter().flatten() {
			nav_domain::import_id::validate_import_ids(ids)?;
		}

		let query_string = request.query_string.trim().to_string();
		let mode = match (query_string.is_empty(), request.concept_filters.is_empty()) {
			(true, true) => SearchMode::Browse,
			(true, false) => SearchMode::BrowseWithConcepts,
			(false, _) => SearchMode::Standard,
		};
		let exact_match = mode == SearchMode::Standard && request.exact_match;
		let sort = match request.sort_field {
			None | Some(SortField::Relevance) => None,
			Some(field) => Some(EngineSort { field, order: request.sort_order }),
		};

		Ok(ValidatedParameters {
			query_string,
			exact_match,
			mode,
			filters,
			year_range,
			sort,
			family_ids,
			document_ids,
			corpus_type_names: normalize_list(request.corpus_type_names.as_deref()),
			requested_corpora: normalize_list(request.corpus_import_ids.as_deref()),
			page_size,
			offset,
			limit,
			max_hits_per_family,
			continuation_tokens: request.continuation_tokens.clone(),
			sort_within_page: request.sort_within_page,
		})
	}

	fn check_bounds(
		&self,
		page_size: u32,
		offset: u32,
		limit: u32,
		max_hits_per_family: u32,
	) -> Result<()> {
		let limits = self.limits;
		let required = [
			("page_size", page_size),
			("limit", limit),
			("max_hits_per_family", max_hits_per_family),
		];

		for (label, value) in required {
			if value == 0 {
				return Err(Error::InvalidRequest {
					message: format!("{label} must be greater than zero."),
				});
			}
		}

		if page_size.saturating_add(offset) > limits.max_page_window {
			return Err(Error::InvalidRequest {
				message: format!(
					"page_size + offset must not exceed {}.",
					limits.max_page_window
				),
			});
		}
		if limit > limits.max_limit {
			return Err(Error::InvalidRequest {
				message: format!("limit must not exceed {}.", limits.max_limit),
			});
		}
		if max_hits_per_family > limits.max_hits_per_family {
			return Err(Error::InvalidRequest {
				message: format!(
					"max_hits_per_family must not exceed {}.",
					limits.max_hits_per_family
				),
			});
		}
		if offset > limit {
			return Err(invalid("offset must not exceed limit."));
		}
		if page_size > limit {
			return Err(invalid("page_size must not exceed limit."));
		}

		Ok(())
	}
}

fn invalid(message: &str) -> Error {
	Error::InvalidRequest { message: message.to_string() }
}

/// Trims and deduplicates a list. Absent and empty lists both mean "no restriction".
fn normalize_list(values: Option<&[String]>) -> Option<Vec<String>> {
	let mut out: Vec<String> = Vec::new();

	for value in values.unwrap_or_default() {
		let value = value.trim();

		if !value.is_empty() && !out.iter().any(|seen| seen == value) {
			out.push(value.to_string());
		}
	}

	if out.is_empty() { None } else { Some(out) }
}

#[cfg(test)]
mod tests {
	use super::*;

	fn limits() -> nav_config::Search {
		nav_config::Search {
			max_page_window: 500,
			max_limit: 500,
			max_hits_per_family: 500,
			default_page_size: 10,
			default_limit: 100,
			default_max_hits_per_family: 10,
		}
	}

	fn build(request: SearchRequest) -> Result<ValidatedParameters> {
		let limits = limits();

		SearchParameterBuilder::new(&limits).build(&request)
	}

	#[test]
	fn applies_configured_defaults() {
		let params = build(SearchRequest::default()).expect("Expected valid parameters.");

		assert_eq!(params.page_size, 10);
		assert_eq!(params.offset, 0);
		assert_eq!(params.limit, 100);
		assert_eq!(params.max_hits_per_family, 10);
	}

	#[test]
	fn page_window_is_bounded() {
		let request = SearchRequest {
			page_size: Some(250),
			offset: Some(251),
			limit: Some(500),
			..Default::default()
		};
		let err = build(request).expect_err("Expected page window error.");

		assert!(err.to_string().contains("page_size + offset must not exceed 500."));

		let request = SearchRequest {
			page_size: Some(250),
			offset: Some(250),
			limit: Some(500),
			..Default::default()
		};

		assert!(build(request).is_ok());
	}

	#[test]
	fn limit_and_hits_per_family_are_bounded() {
		let err = build(SearchRequest { limit: Some(501), ..Default::default() })
			.expect_err("Expected limit error.");

		assert!(err.to_string().contains("limit must not exceed 500."));

		let err = build(SearchRequest { max_hits_per_family: Some(501), ..Default::default() })
			.expect_err("Expected hits per family error.");

		assert!(err.to_string().contains("max_hits_per_family must not exceed 500."));
	}

	#[test]
	fn offset_and_page_size_must_fit_limit() {
		let err = build(SearchRequest { offset: Some(20), limit: Some(10), ..Default::default() })
			.expect_err("Expected offset error.");

		assert!(err.to_string().contains("offset must not exceed limit."));

		let err =
			build(SearchRequest { page_size: Some(20), limit: Some(10), ..Default::default() })
				.expect_err("Expected page size error.");

		assert!(err.to_string().contains("page_size must not exceed limit."));
	}

	#[test]
	fn empty_and_absent_id_lists_normalize_identically() {
		let absent = build(SearchRequest::default()).expect("Expected valid parameters.");
		let empty = build(SearchRequest {
			family_ids: Some(Vec::new()),
			document_ids: Some(vec![" ".to_string()]),
			..Default::default()
		})
		.expect("Expected valid parameters.");

		assert_eq!(absent, empty);
		assert_eq!(absent.fingerprint().ok(), empty.fingerprint().ok());
	}

	#[test]
	fn malformed_import_ids_are_rejected() {
		let err = build(SearchRequest {
			family_ids: Some(vec!["not-an-id".to_string()]),
			..Default::default()
		})
		.expect_err("Expected import id error.");

		assert!(err.to_string().contains("not-an-id"));
	}

	#[test]
	fn empty_query_switches_to_browse() {
		let params = build(SearchRequest { exact_match: true, ..Default::default() })
			.expect("Expected valid parameters.");

		assert_eq!(params.mode, SearchMode::Browse);
		assert!(!params.exact_match);
		assert!(params.all_results());
		assert!(params.documents_only());

		let params = build(SearchRequest {
			concept_filters: vec![nav_engine::FieldFilter {
				name: "name".to_string(),
				value: "floods".to_string(),
			}],
			..Default::default()
		})
		.expect("Expected valid parameters.");

		assert_eq!(params.mode, SearchMode::BrowseWithConcepts);
		assert!(params.all_results());
		assert!(!params.documents_only());

		let params = build(SearchRequest {
			query_string: " adaptation ".to_string(),
			exact_match: true,
			..Default::default()
		})
		.expect("Expected valid parameters.");

		assert_eq!(params.mode, SearchMode::Standard);
		assert_eq!(params.query_string, "adaptation");
		assert!(params.exact_match);
	}

	#[test]
	fn unsupported_concept_filter_name_is_rejected() {
		let err = build(SearchRequest {
			concept_filters: vec![nav_engine::FieldFilter {
				name: "colour".to_string(),
				value: "green".to_string(),
			}],
			..Default::default()
		})
		.expect_err("Expected concept filter error.");

		assert!(err.to_string().contains("Unsupported concept filter name: colour."));
	}

	#[test]
	fn inverted_year_range_is_rejected() {
		let err = build(SearchRequest {
			year_range: Some((Some(2020), Some(2010))),
			..Default::default()
		})
		.expect_err("Expected year range error.");

		assert!(err.to_string().contains("year_range"));
	}

	#[test]
	fn relevance_sort_leaves_engine_order() {
		let params = build(SearchRequest {
			sort_field: Some(SortField::Relevance),
			..Default::default()
		})
		.expect("Expected valid parameters.");

		assert!(params.sort.is_none());

		let params =
			build(SearchRequest { sort_field: Some(SortField::Date), ..Default::default() })
				.expect("Expected valid parameters.");

		assert_eq!(
			params.sort,
			Some(EngineSort { field: SortField::Date, order: nav_engine::SortOrder::Desc })
		);
	}

	#[test]
	fn fingerprint_ignores_paging() {
		let first = build(SearchRequest {
			query_string: "flood".to_string(),
			..Default::default()
		})
		.expect("Expected valid parameters.");
		let later = build(SearchRequest {
			query_string: "flood".to_string(),
			page_size: Some(5),
			offset: Some(5),
			..Default::default()
		})
		.expect("Expected valid parameters.");
		let other = build(SearchRequest {
			query_string: "drought".to_string(),
			..Default::default()
		})
		.expect("Expected valid parameters.");

		assert_eq!(first.fingerprint().ok(), later.fingerprint().ok());
		assert_ne!(first.fingerprint().ok(), other.fingerprint().ok());
	}
}
