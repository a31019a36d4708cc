//! Wire types exchanged with the external search engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Keys of the engine's native filter vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterField {
	FamilyCategory,
	FamilySource,
	FamilyGeographies,
	DocumentLanguages,
}

/// Filters keyed by engine field.
///
/// Values are kept sorted and deduplicated, and a field never maps to an empty list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalFilterSet(BTreeMap<FilterField, Vec<String>>);
impl CanonicalFilterSet {
	pub fn insert<I>(&mut self, field: FilterField, values: I)
	where
		I: IntoIterator<Item = String>,
	{
		let entry = self.0.entry(field).or_default();

		entry.extend(values);
		entry.sort();
		entry.dedup();

		if entry.is_empty() {
			self.0.remove(&field);
		}
	}

	pub fn get(&self, field: FilterField) -> Option<&[String]> {
		self.0.get(&field).map(Vec::as_slice)
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (FilterField, &[String])> {
		self.0.iter().map(|(field, values)| (*field, values.as_slice()))
	}
}

/// A `{name, value}` pair used by metadata and concept filters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldFilter {
	pub name: String,
	pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
	Date,
	Title,
	Relevance,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
	Asc,
	#[default]
	Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSort {
	pub field: SortField,
	pub order: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct YearRange {
	pub start: Option<i32>,
	pub end: Option<i32>,
}

/// Restricts the passages returned for one family to a window starting at `offset`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassageWindow {
	pub family_id: String,
	pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineQuery {
	pub query_string: String,
	pub exact_match: bool,
	/// Browse mode: return everything matching the filters instead of ranking by relevance.
	pub all_results: bool,
	pub documents_only: bool,
	#[serde(skip_serializing_if = "CanonicalFilterSet::is_empty", default)]
	pub filters: CanonicalFilterSet,
	#[serde(skip_serializing_if = "Vec::is_empty", default)]
	pub metadata: Vec<FieldFilter>,
	#[serde(skip_serializing_if = "Vec::is_empty", default)]
	pub concepts: Vec<FieldFilter>,
	pub year_range: Option<YearRange>,
	pub sort: Option<EngineSort>,
	pub family_ids: Option<Vec<String>>,
	pub document_ids: Option<Vec<String>>,
	pub corpus_type_names: Option<Vec<String>>,
	pub corpus_import_ids: Option<Vec<String>>,
	pub family_offset: u32,
	pub limit: u32,
	pub max_hits_per_family: u32,
	pub passage_window: Option<PassageWindow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResponse {
	pub total_family_hits: u32,
	#[serde(default)]
	pub query_time_ms: u64,
	/// Total passage matches per family id, independent of the returned window.
	#[serde(default)]
	pub passage_totals: BTreeMap<String, u32>,
	#[serde(default)]
	pub hits: Vec<EngineHit>,
	#[serde(default)]
	pub continuation_token: Option<String>,
	#[serde(default)]
	pub prev_continuation_token: Option<String>,
}

/// One raw hit. Document hits match family-level text; passage hits match a text block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "hit_type", rename_all = "snake_case")]
pub enum EngineHit {
	Document(HitFields),
	Passage(PassageHit),
}
impl EngineHit {
	pub fn fields(&self) -> &HitFields {
		match self {
			Self::Document(fields) => fields,
			Self::Passage(hit) => &hit.fields,
		}
	}
}

/// Family and document fields carried by every hit. Any of them may be missing in the index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitFields {
	pub family_import_id: Option<String>,
	pub family_slug: Option<String>,
	pub family_name: Option<String>,
	pub family_description: Option<String>,
	pub family_category: Option<String>,
	pub family_source: Option<String>,
	pub family_geographies: Option<Vec<String>>,
	pub corpus_import_id: Option<String>,
	pub corpus_type_name: Option<String>,
	pub document_import_id: Option<String>,
	pub document_slug: Option<String>,
	pub document_title: Option<String>,
	pub document_source_url: Option<String>,
	pub document_cdn_object: Option<String>,
	pub document_content_type: Option<String>,
	pub document_languages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageHit {
	#[serde(flatten)]
	pub fields: HitFields,
	pub text_block: String,
	pub text_block_id: String,
	/// 0-indexed.
	#[serde(default)]
	pub text_block_page: Option<u32>,
	#[serde(default)]
	pub text_block_coords: Option<Vec<(f32, f32)>>,
	#[serde(default)]
	pub text_block_type: String,
	#[serde(default)]
	pub concepts: Vec<Concept>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Concept {
	pub id: String,
	pub name: String,
	pub parent_concepts: Vec<ParentConcept>,
	pub parent_concept_ids_flat: String,
	pub model: String,
	pub start: u32,
	pub end: u32,
	pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentConcept {
	pub id: String,
	pub name: String,
}
