//! Signed continuation tokens.
//!
//! A token is `base64url(json(cursor)) "." base64url(mac)`, where the MAC is a keyed BLAKE3 hash
//! of the JSON payload. Tokens are bound to the query fingerprint they were issued for.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};
use nav_engine::PassageWindow;

const TOKEN_VERSION: u8 = 1;
const KEY_CONTEXT: &str = "navigator continuation token signing key v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CursorScope {
	Family,
	Passage,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
	pub v: u8,
	pub scope: CursorScope,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub family_id: Option<String>,
	pub fingerprint: String,
	pub offset: u32,
}

/// Where a request resumes, decoded from its continuation tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResumePoint {
	pub family_offset: u32,
	pub passage: Option<PassageWindow>,
}
impl ResumePoint {
	pub fn passage_offset(&self, family_id: &str) -> u32 {
		self.passage
			.as_ref()
			.filter(|window| window.family_id == family_id)
			.map(|window| window.offset)
			.unwrap_or(0)
	}
}

pub struct ContinuationTokens {
	key: [u8; 32],
}
impl ContinuationTokens {
	pub fn new(secret: &str) -> Self {
		Self { key: blake3::derive_key(KEY_CONTEXT, secret.as_bytes()) }
	}

	pub fn family(&self, fingerprint: &str, offset: u32) -> Result<String> {
		self.encode(&Cursor {
			v: TOKEN_VERSION,
			scope: CursorScope::Family,
			family_id: None,
			fingerprint: fingerprint.to_string(),
			offset,
		})
	}

	pub fn family_forward(&self, fingerprint: &str, offset: u32, step: u32) -> Result<String> {
		self.family(fingerprint, offset.saturating_add(step))
	}

	pub fn family_backward(&self, fingerprint: &str, offset: u32, step: u32) -> Result<String> {
		self.family(fingerprint, offset.saturating_sub(step))
	}

	pub fn passage(&self, family_id: &str, fingerprint: &str, offset: u32) -> Result<String> {
		self.encode(&Cursor {
			v: TOKEN_VERSION,
			scope: CursorScope::Passage,
			family_id: Some(family_id.to_string()),
			fingerprint: fingerprint.to_string(),
			offset,
		})
	}

	pub fn passage_forward(
		&self,
		family_id: &str,
		fingerprint: &str,
		offset: u32,
		step: u32,
	) -> Result<String> {
		self.passage(family_id, fingerprint, offset.saturating_add(step))
	}

	pub fn passage_backward(
		&self,
		family_id: &str,
		fingerprint: &str,
		offset: u32,
		step: u32,
	) -> Result<String> {
		self.passage(family_id, fingerprint, offset.saturating_sub(step))
	}

	pub fn decode(&self, token: &str, fingerprint: &str) -> Result<Cursor> {
		let (payload, mac) = token.split_once('.').ok_or_else(malformed)?;
		let payload = URL_SAFE_NO_PAD.decode(payload).map_err(|_| malformed())?;
		let mac: [u8; 32] = URL_SAFE_NO_PAD
			.decode(mac)
			.map_err(|_| malformed())?
			.try_into()
			.map_err(|_| malformed())?;

		if blake3::keyed_hash(&self.key, &payload) != blake3::Hash::from(mac) {
			return Err(Error::InvalidRequest {
				message: "Continuation token signature does not match.".to_string(),
			});
		}

		let cursor: Cursor = serde_json::from_slice(&payload).map_err(|_| malformed())?;

		if cursor.v != TOKEN_VERSION {
			return Err(Error::InvalidRequest {
				message: format!("Unsupported continuation token version {}.", cursor.v),
			});
		}
		if cursor.fingerprint != fingerprint {
			return Err(Error::InvalidRequest {
				message: "Continuation token was issued for a different query.".to_string(),
			});
		}
		if cursor.scope == CursorScope::Passage && cursor.family_id.is_none() {
			return Err(malformed());
		}

		Ok(cursor)
	}

	/// Decodes up to one family token and one passage token, in any order.
	pub fn resume(&self, tokens: &[String], fingerprint: &str) -> Result<ResumePoint> {
		if tokens.len() > 2 {
			return Err(Error::InvalidRequest {
				message: "At most two continuation tokens may be supplied.".to_string(),
			});
		}

		let mut family = None;
		let mut passage = None;

		for token in tokens {
			let cursor = self.decode(token, fingerprint)?;
			let slot = match cursor.scope {
				CursorScope::Family => &mut family,
				CursorScope::Passage => &mut passage,
			};

			if slot.is_some() {
				return Err(Error::InvalidRequest {
					message: "Only one continuation token per scope may be supplied.".to_string(),
				});
			}

			*slot = Some(cursor);
		}

		Ok(ResumePoint {
			family_offset: family.map(|cursor| cursor.offset).unwrap_or(0),
			passage: passage.and_then(|cursor| {
				cursor.family_id.map(|family_id| PassageWindow { family_id, offset: cursor.offset })
			}),
		})
	}

	fn encode(&self, cursor: &Cursor) -> Result<String> {
		let payload = serde_json::to_vec(cursor).map_err(|err| Error::Internal {
			message: format!("Failed to encode continuation token: {err}"),
		})?;
		let mac = blake3::keyed_hash(&self.key, &payload);

		Ok(format!(
			"{}.{}",
			URL_SAFE_NO_PAD.encode(&payload),
			URL_SAFE_NO_PAD.encode(mac.as_bytes())
		))
	}
}

fn malformed() -> Error {
	Error::InvalidRequest { message: "Continuation token is malformed.".to_string() }
}
