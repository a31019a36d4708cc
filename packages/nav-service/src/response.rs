use serde::{Deserialize, Serialize};
use serde_json::Value;

use nav_engine::Concept;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
	/// Families that survived reconciliation in the current engine window.
	pub hits: u32,
	pub total_family_hits: u32,
	pub query_time_ms: u64,
	pub total_time_ms: u64,
	pub continuation_token: Option<String>,
	pub this_continuation_token: Option<String>,
	pub prev_continuation_token: Option<String>,
	pub families: Vec<FamilyResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyResult {
	pub family_slug: String,
	pub family_name: String,
	pub family_description: String,
	pub family_category: String,
	/// RFC 3339, or empty when the family has no dated events.
	pub family_date: String,
	pub family_last_updated_date: String,
	pub family_source: String,
	pub family_geographies: Vec<String>,
	pub family_metadata: Value,
	pub corpus_import_id: String,
	pub corpus_type_name: String,
	pub family_title_match: bool,
	pub family_description_match: bool,
	pub total_passage_hits: u32,
	/// Passage-level cursors scoped to this family.
	pub continuation_token: Option<String>,
	pub prev_continuation_token: Option<String>,
	pub family_documents: Vec<DocumentResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentResult {
	pub document_slug: String,
	pub document_title: String,
	pub document_type: Option<String>,
	pub document_postfix: Option<String>,
	pub document_content_type: Option<String>,
	pub document_languages: Vec<String>,
	pub document_source_url: Option<String>,
	pub document_url: Option<String>,
	pub document_passage_matches: Vec<PassageMatch>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassageMatch {
	pub text: String,
	pub text_block_id: String,
	/// 1-indexed.
	pub text_block_page: Option<u32>,
	pub text_block_coords: Option<Vec<(f32, f32)>>,
	pub text_block_type: String,
	pub concepts: Vec<Concept>,
}
