use std::sync::LazyLock;

use regex::Regex;

use crate::{Error, Result};

static IMPORT_ID: LazyLock<Regex> = LazyLock::new(|| {
	let element = "[a-zA-Z0-9]+(?:[-_]?[a-zA-Z0-9]+)*";

	Regex::new(&format!(r"^{element}\.{element}\.{element}\.{element}$"))
		.expect("Import id pattern must compile.")
});

/// Import ids have four dot-separated elements, e.g. `CCLW.executive.1234.5678`.
pub fn is_import_id(value: &str) -> bool {
	IMPORT_ID.is_match(value)
}

pub fn validate_import_ids(ids: &[String]) -> Result<()> {
	let invalid: Vec<String> = ids.iter().filter(|id| !is_import_id(id)).cloned().collect();

	if !invalid.is_empty() {
		return Err(Error::InvalidImportId { ids: invalid });
	}

	Ok(())
}
