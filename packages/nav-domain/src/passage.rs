//! Reading-order keys for passages.
//!
//! The engine returns passages in relevance order. Readers want them in document order, so each
//! passage gets a key built from its page and the block number encoded in its text block id.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBlockPosition {
	pub page: Option<u32>,
	pub block: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum PageKey {
	Known(u32),
	Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum BlockKey {
	Numeric(u64),
	Opaque(String),
}

/// Sort key for a passage within one document.
///
/// Known pages come first in numeric order. Within a page, numeric block ids precede ids that
/// could not be parsed, which fall back to string order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassageSortKey {
	page: PageKey,
	block: BlockKey,
}
impl PassageSortKey {
	pub fn new(text_block_page: Option<u32>, text_block_id: &str) -> Self {
		let position = parse_text_block_id(text_block_id);
		let page = text_block_page
			.or_else(|| position.and_then(|position| position.page))
			.map(PageKey::Known)
			.unwrap_or(PageKey::Unknown);
		let block = match position {
			Some(position) => BlockKey::Numeric(position.block),
			None => BlockKey::Opaque(text_block_id.to_string()),
		};

		Self { page, block }
	}

	pub fn is_opaque(&self) -> bool {
		matches!(self.block, BlockKey::Opaque(_))
	}
}
impl Ord for PassageSortKey {
	fn cmp(&self, other: &Self) -> Ordering {
		self.page.cmp(&other.page).then_with(|| self.block.cmp(&other.block))
	}
}
impl PartialOrd for PassageSortKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// Parses the block position out of a text block id.
///
/// Accepted shapes are `p{page}_b{block}`, `b{block}`, `block_{block}` and bare digits.
pub fn parse_text_block_id(text_block_id: &str) -> Option<TextBlockPosition> {
	if let Some(rest) = text_block_id.strip_prefix('p')
		&& let Some((page, block)) = rest.split_once("_b")
	{
		let page = parse_digits(page)?;
		let block = parse_digits(block)?;

		return Some(TextBlockPosition { page: Some(page), block });
	}
	if let Some(block) = text_block_id.strip_prefix("block_") {
		return parse_digits(block).map(|block| TextBlockPosition { page: None, block });
	}
	if let Some(block) = text_block_id.strip_prefix('b') {
		return parse_digits(block).map(|block| TextBlockPosition { page: None, block });
	}

	parse_digits(text_block_id).map(|block| TextBlockPosition { page: None, block })
}

/// Sorts items in reading order. The sort is stable, so ties keep their incoming order.
pub fn sort_in_reading_order<T, F>(items: &mut [T], key: F)
where
	F: Fn(&T) -> PassageSortKey,
{
	items.sort_by_cached_key(key);
}

fn parse_digits<T>(raw: &str) -> Option<T>
where
	T: std::str::FromStr,
{
	if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
		return None;
	}

	raw.parse().ok()
}
