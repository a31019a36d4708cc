use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use nav_engine::{FieldFilter, SortField, SortOrder};

/// Concept fields the engine can filter on.
pub const CONCEPT_FILTER_NAMES: [&str; 5] =
	["id", "name", "parent_concept_ids_flat", "model", "timestamp"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchRequest {
	pub query_string: String,
	pub exact_match: bool,
	/// Keys must be one of `countries`, `regions`, `subdivisions`, `categories`, `sources` or
	/// `languages`.
	pub keyword_filters: BTreeMap<String, Vec<String>>,
	pub metadata_filters: Vec<FieldFilter>,
	pub concept_filters: Vec<FieldFilter>,
	pub year_range: Option<(Option<i32>, Option<i32>)>,
	pub sort_field: Option<SortField>,
	pub sort_order: SortOrder,
	pub family_ids: Option<Vec<String>>,
	pub document_ids: Option<Vec<String>>,
	pub corpus_type_names: Option<Vec<String>>,
	pub corpus_import_ids: Option<Vec<String>>,
	pub page_size: Option<u32>,
	pub offset: Option<u32>,
	pub limit: Option<u32>,
	#[serde(alias = "max_passages_per_doc")]
	pub max_hits_per_family: Option<u32>,
	pub continuation_tokens: Vec<String>,
	pub sort_within_page: bool,
}
impl SearchRequest {
	/// Flattens keyword, metadata and concept filters into a single typed list.
	///
	/// Fails on the first keyword filter key outside the supported set.
	pub fn filters(&self) -> Result<Vec<SearchFilter>> {
		let mut filters = Vec::new();

		for (key, values) in &self.keyword_filters {
			let Some(key) = FilterKey::parse(key) else {
				return Err(Error::InvalidRequest {
					message: format!("Unknown keyword filter key: {key}."),
				});
			};

			filters.extend(values.iter().map(|value| key.filter(value.trim().to_string())));
		}

		filters.extend(self.metadata_filters.iter().cloned().map(SearchFilter::Metadata));
		filters.extend(self.concept_filters.iter().cloned().map(SearchFilter::Concept));

		Ok(filters)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKey {
	Countries,
	Regions,
	Subdivisions,
	Categories,
	Sources,
	Languages,
}
impl FilterKey {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"countries" => Some(Self::Countries),
			"regions" => Some(Self::Regions),
			"subdivisions" => Some(Self::Subdivisions),
			"categories" => Some(Self::Categories),
			"sources" => Some(Self::Sources),
			"languages" => Some(Self::Languages),
			_ => None,
		}
	}

	fn filter(self, value: String) -> SearchFilter {
		match self {
			Self::Countries => SearchFilter::Country(value),
			Self::Regions => SearchFilter::Region(value),
			Self::Subdivisions => SearchFilter::Subdivision(value),
			Self::Categories => SearchFilter::Category(value),
			Self::Sources => SearchFilter::Source(value),
			Self::Languages => SearchFilter::Language(value),
		}
	}
}

/// One user-facing filter constraint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SearchFilter {
	Country(String),
	Region(String),
	Subdivision(String),
	Category(String),
	Source(String),
	Language(String),
	Metadata(FieldFilter),
	Concept(FieldFilter),
}
