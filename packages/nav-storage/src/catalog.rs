//! In-memory view of the relational catalog for one request.

use std::collections::HashMap;

use serde_json::Value;
use time::OffsetDateTime;

use crate::models::{DocumentRow, FamilyRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationStatus {
	Created,
	Published,
	Deleted,
}
impl PublicationStatus {
	pub fn parse(raw: &str) -> Self {
		if raw.eq_ignore_ascii_case("published") {
			Self::Published
		} else if raw.eq_ignore_ascii_case("deleted") {
			Self::Deleted
		} else {
			Self::Created
		}
	}

	fn from_document_counts(total: i64, published: i64, deleted: i64) -> Self {
		if published > 0 {
			Self::Published
		} else if total > 0 && deleted == total {
			Self::Deleted
		} else {
			Self::Created
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentRecord {
	pub import_id: String,
	pub family_import_id: String,
	pub status: PublicationStatus,
	pub title: String,
	pub slug: Option<String>,
	/// Variant name, e.g. "Translation".
	pub postfix: Option<String>,
	pub content_type: Option<String>,
	pub document_type: Option<String>,
	pub source_url: Option<String>,
	pub cdn_object: Option<String>,
}
impl From<DocumentRow> for DocumentRecord {
	fn from(row: DocumentRow) -> Self {
		let document_type = row.document_metadata.as_ref().and_then(first_type_value);

		Self {
			import_id: row.document_import_id,
			family_import_id: row.family_import_id,
			status: PublicationStatus::parse(&row.document_status),
			title: row.document_title,
			slug: row.document_slug,
			postfix: row.variant_name,
			content_type: row.content_type,
			document_type,
			source_url: row.source_url,
			cdn_object: row.cdn_object,
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct FamilyRecord {
	pub import_id: String,
	pub status: PublicationStatus,
	pub published_date: Option<OffsetDateTime>,
	pub last_updated_date: Option<OffsetDateTime>,
	pub metadata: Value,
}
impl From<FamilyRow> for FamilyRecord {
	fn from(row: FamilyRow) -> Self {
		Self {
			import_id: row.family_import_id,
			status: PublicationStatus::from_document_counts(
				row.total_documents,
				row.published_documents,
				row.deleted_documents,
			),
			published_date: row.published_date,
			last_updated_date: row.last_updated_date,
			metadata: row.family_metadata.unwrap_or_else(|| Value::Object(Default::default())),
		}
	}
}

/// Catalog rows indexed by import id. Built once per request and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
	families: HashMap<String, FamilyRecord>,
	documents: HashMap<String, DocumentRecord>,
}
impl CatalogSnapshot {
	pub fn from_rows(families: Vec<FamilyRow>, documents: Vec<DocumentRow>) -> Self {
		let mut snapshot = Self::default();

		for row in families {
			snapshot.insert_family(row.into());
		}
		for row in documents {
			snapshot.insert_document(row.into());
		}

		snapshot
	}

	pub fn insert_family(&mut self, family: FamilyRecord) {
		self.families.insert(family.import_id.clone(), family);
	}

	pub fn insert_document(&mut self, document: DocumentRecord) {
		self.documents.insert(document.import_id.clone(), document);
	}

	pub fn family(&self, import_id: &str) -> Option<&FamilyRecord> {
		self.families.get(import_id)
	}

	pub fn document(&self, import_id: &str) -> Option<&DocumentRecord> {
		self.documents.get(import_id)
	}

	/// The document, when it and its family are both published.
	pub fn published_document(&self, import_id: &str) -> Option<&DocumentRecord> {
		let document = self.document(import_id)?;
		let family = self.family(&document.family_import_id)?;

		if document.status != PublicationStatus::Published
			|| family.status != PublicationStatus::Published
		{
			return None;
		}

		Some(document)
	}

	pub fn is_empty(&self) -> bool {
		self.documents.is_empty()
	}
}

fn first_type_value(metadata: &Value) -> Option<String> {
	match metadata.get("type")? {
		Value::String(value) => Some(value.clone()),
		Value::Array(values) => values.first().and_then(Value::as_str).map(str::to_string),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn document_row(id: &str, family: &str, status: &str) -> DocumentRow {
		DocumentRow {
			document_import_id: id.to_string(),
			family_import_id: family.to_string(),
			document_status: status.to_string(),
			variant_name: Some("Original Language".to_string()),
			document_metadata: Some(serde_json::json!({ "type": ["Law", "Decree"] })),
			document_title: "Climate Change Act".to_string(),
			content_type: Some("application/pdf".to_string()),
			source_url: None,
			cdn_object: Some("GBR/2008/climate-change-act.pdf".to_string()),
			document_slug: Some("climate-change-act_1a2b".to_string()),
		}
	}

	fn family_row(id: &str, published: i64, deleted: i64, total: i64) -> FamilyRow {
		FamilyRow {
			family_import_id: id.to_string(),
			family_metadata: None,
			published_date: None,
			last_updated_date: None,
			total_documents: total,
			published_documents: published,
			deleted_documents: deleted,
		}
	}

	#[test]
	fn indexes_rows_by_import_id() {
		let snapshot = CatalogSnapshot::from_rows(
			vec![family_row("CCLW.family.1.0", 1, 0, 1)],
			vec![document_row("CCLW.document.1.0", "CCLW.family.1.0", "Published")],
		);
		let document =
			snapshot.published_document("CCLW.document.1.0").expect("Expected a document.");

		assert_eq!(document.document_type.as_deref(), Some("Law"));
		assert_eq!(document.postfix.as_deref(), Some("Original Language"));
		assert_eq!(
			snapshot.family("CCLW.family.1.0").map(|family| family.metadata.clone()),
			Some(serde_json::json!({}))
		);
	}

	#[test]
	fn hides_unpublished_documents_and_families() {
		let snapshot = CatalogSnapshot::from_rows(
			vec![family_row("CCLW.family.1.0", 1, 1, 2), family_row("CCLW.family.2.0", 0, 1, 1)],
			vec![
				document_row("CCLW.document.1.0", "CCLW.family.1.0", "Published"),
				document_row("CCLW.document.1.1", "CCLW.family.1.0", "Deleted"),
				document_row("CCLW.document.2.0", "CCLW.family.2.0", "Published"),
			],
		);

		assert!(snapshot.published_document("CCLW.document.1.0").is_some());
		assert!(snapshot.published_document("CCLW.document.1.1").is_none());
		assert!(snapshot.published_document("CCLW.document.2.0").is_none());
		assert!(snapshot.published_document("CCLW.document.9.9").is_none());
		assert_eq!(
			snapshot.family("CCLW.family.2.0").map(|family| family.status),
			Some(PublicationStatus::Deleted)
		);
	}
}
