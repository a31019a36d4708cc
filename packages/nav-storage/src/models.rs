use serde_json::Value;
use time::OffsetDateTime;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GeographyRow {
	pub id: i32,
	pub value: String,
	pub slug: String,
	pub display_value: String,
	pub parent_id: Option<i32>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
	pub document_import_id: String,
	pub family_import_id: String,
	pub document_status: String,
	pub variant_name: Option<String>,
	pub document_metadata: Option<Value>,
	pub document_title: String,
	pub content_type: Option<String>,
	pub source_url: Option<String>,
	pub cdn_object: Option<String>,
	pub document_slug: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FamilyRow {
	pub family_import_id: String,
	pub family_metadata: Option<Value>,
	pub published_date: Option<OffsetDateTime>,
	pub last_updated_date: Option<OffsetDateTime>,
	pub total_documents: i64,
	pub published_documents: i64,
	pub deleted_documents: i64,
}
