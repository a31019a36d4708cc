use crate::{Error, Result};

/// The authenticated caller, as described by its app token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
	/// Empty means the caller may read every corpus.
	pub allowed_corpora: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizedCorpora {
	Unrestricted,
	Only(Vec<String>),
}
impl AuthorizedCorpora {
	pub fn into_filter(self) -> Option<Vec<String>> {
		match self {
			Self::Unrestricted => None,
			Self::Only(ids) => Some(ids),
		}
	}
}

pub struct CorpusAccessGate;
impl CorpusAccessGate {
	/// Combines the caller's allowed corpora with the requested ones.
	///
	/// A restricted caller that requests nothing is still limited to its own corpora.
	pub fn authorize(
		allowed: &[String],
		requested: Option<&[String]>,
	) -> Result<AuthorizedCorpora> {
		let requested = requested.filter(|ids| !ids.is_empty());

		if allowed.is_empty() {
			return Ok(match requested {
				Some(ids) => AuthorizedCorpora::Only(sorted(ids.iter())),
				None => AuthorizedCorpora::Unrestricted,
			});
		}

		let Some(requested) = requested else {
			return Ok(AuthorizedCorpora::Only(sorted(allowed.iter())));
		};
		let effective = sorted(requested.iter().filter(|id| allowed.contains(id)));

		if effective.is_empty() {
			return Err(Error::Forbidden {
				message: format!(
					"None of the requested corpora are available to this caller: {}.",
					requested.join(", ")
				),
			});
		}

		Ok(AuthorizedCorpora::Only(effective))
	}
}

fn sorted<'a>(ids: impl Iterator<Item = &'a String>) -> Vec<String> {
	let mut out: Vec<String> = ids.cloned().collect();

	out.sort();
	out.dedup();

	out
}
