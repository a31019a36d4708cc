//! Geography reference tree.
//!
//! Top-level nodes (no parent) are regions. Their children are countries, and children of a
//! country are subdivisions. The tree is loaded once per process and only read afterwards.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geography {
	pub id: i32,
	/// ISO code or custom code.
	pub value: String,
	pub slug: String,
	pub display_value: String,
	pub parent_id: Option<i32>,
}
impl Geography {
	pub fn is_region(&self) -> bool {
		self.parent_id.is_none()
	}
}

#[derive(Debug, Default)]
pub struct GeographyTree {
	nodes: Vec<Geography>,
	by_id: HashMap<i32, usize>,
	by_value: HashMap<String, usize>,
	by_slug: HashMap<String, usize>,
	children: HashMap<i32, Vec<usize>>,
}
impl GeographyTree {
	pub fn new(nodes: Vec<Geography>) -> Self {
		let mut tree = Self { nodes, ..Default::default() };

		for (idx, node) in tree.nodes.iter().enumerate() {
			tree.by_id.insert(node.id, idx);
			tree.by_value.entry(node.value.clone()).or_insert(idx);
			tree.by_slug.entry(node.slug.clone()).or_insert(idx);

			if let Some(parent_id) = node.parent_id {
				tree.children.entry(parent_id).or_default().push(idx);
			}
		}

		tree
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn parent(&self, node: &Geography) -> Option<&Geography> {
		node.parent_id.and_then(|id| self.by_id.get(&id)).map(|idx| &self.nodes[*idx])
	}

	pub fn by_value(&self, value: &str) -> Option<&Geography> {
		self.by_value.get(value).map(|idx| &self.nodes[*idx])
	}

	/// Member countries of the region with this slug.
	///
	/// Returns nothing when the slug is unknown or names a node that is not a region.
	pub fn countries_for_region(&self, slug: &str) -> Vec<&Geography> {
		let Some(region) = self.by_slug.get(slug).map(|idx| &self.nodes[*idx]) else {
			return Vec::new();
		};

		if !region.is_region() {
			return Vec::new();
		}

		self.children
			.get(&region.id)
			.map(|children| children.iter().map(|idx| &self.nodes[*idx]).collect())
			.unwrap_or_default()
	}

	/// Looks up a country or subdivision by slug. Region slugs yield `None`.
	pub fn country_by_slug(&self, slug: &str) -> Option<&Geography> {
		self.by_slug.get(slug).map(|idx| &self.nodes[*idx]).filter(|node| !node.is_region())
	}

	/// A subdivision is a node whose parent is itself a country.
	pub fn subdivision(&self, code: &str) -> Option<&Geography> {
		self.by_value(code)
			.filter(|node| self.parent(node).is_some_and(|parent| !parent.is_region()))
	}

	/// The country a subdivision belongs to, or the node itself when it is a country.
	pub fn owning_country<'a>(&'a self, node: &'a Geography) -> Option<&'a Geography> {
		let parent = self.parent(node)?;

		if parent.is_region() {
			return Some(node);
		}

		Some(parent)
	}

	/// Resolves a mix of ISO codes and slugs to ISO codes.
	///
	/// ISO codes are matched first and slugs only for the identifiers left over. Any identifier
	/// matching neither fails the whole call, and the error names every unresolved identifier.
	pub fn resolve_mixed_identifiers(&self, identifiers: &[String]) -> Result<Vec<String>> {
		let mut resolved = Vec::new();
		let mut seen = HashSet::new();
		let mut remainder = Vec::new();

		for identifier in identifiers {
			match self.by_value(identifier).filter(|node| !node.is_region()) {
				Some(node) => {
					if seen.insert(node.value.as_str()) {
						resolved.push(node.value.clone());
					}
				},
				None => remainder.push(identifier),
			}
		}

		let mut unresolved = Vec::new();

		for identifier in remainder {
			match self.country_by_slug(identifier) {
				Some(node) => {
					if seen.insert(node.value.as_str()) {
						resolved.push(node.value.clone());
					}
				},
				None => unresolved.push(identifier.clone()),
			}
		}

		if !unresolved.is_empty() {
			return Err(Error::UnresolvedGeography { kind: "country", identifiers: unresolved });
		}

		Ok(resolved)
	}

	/// Expands region slugs into the ISO codes of their member countries.
	pub fn expand_regions(&self, slugs: &[String]) -> Result<Vec<String>> {
		let mut codes = Vec::new();
		let mut unresolved = Vec::new();

		for slug in slugs {
			let members = self.countries_for_region(slug);

			if members.is_empty() {
				unresolved.push(slug.clone());

				continue;
			}

			codes.extend(members.into_iter().map(|node| node.value.clone()));
		}

		if !unresolved.is_empty() {
			return Err(Error::UnresolvedGeography { kind: "region", identifiers: unresolved });
		}

		codes.sort();
		codes.dedup();

		Ok(codes)
	}

	/// Validates subdivision codes, returning them deduplicated in input order.
	pub fn validate_subdivisions(&self, codes: &[String]) -> Result<Vec<String>> {
		let mut valid = Vec::new();
		let mut unresolved = Vec::new();

		for code in codes {
			match self.subdivision(code) {
				Some(node) => {
					if !valid.contains(&node.value) {
						valid.push(node.value.clone());
					}
				},
				None => unresolved.push(code.clone()),
			}
		}

		if !unresolved.is_empty() {
			return Err(Error::UnresolvedGeography { kind: "subdivision", identifiers: unresolved });
		}

		Ok(valid)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn node(id: i32, value: &str, slug: &str, parent_id: Option<i32>) -> Geography {
		Geography {
			id,
			value: value.to_string(),
			slug: slug.to_string(),
			display_value: slug.to_string(),
			parent_id,
		}
	}

	fn tree() -> GeographyTree {
		GeographyTree::new(vec![
			node(1, "Europe & Central Asia", "europe-central-asia", None),
			node(2, "ITA", "italy", Some(1)),
			node(3, "FRA", "france", Some(1)),
			node(4, "North America", "north-america", None),
			node(5, "USA", "united-states-of-america", Some(4)),
			node(6, "US-CA", "california", Some(5)),
		])
	}

	#[test]
	fn region_members_are_direct_children() {
		let tree = tree();
		let mut codes: Vec<&str> = tree
			.countries_for_region("europe-central-asia")
			.into_iter()
			.map(|node| node.value.as_str())
			.collect();

		codes.sort();

		assert_eq!(codes, vec!["FRA", "ITA"]);
	}

	#[test]
	fn non_region_slug_has_no_members() {
		let tree = tree();

		assert!(tree.countries_for_region("italy").is_empty());
		assert!(tree.countries_for_region("atlantis").is_empty());
	}

	#[test]
	fn country_lookup_skips_regions() {
		let tree = tree();

		assert!(tree.country_by_slug("north-america").is_none());
		assert_eq!(tree.country_by_slug("france").map(|node| node.value.as_str()), Some("FRA"));
	}

	#[test]
	fn subdivision_requires_country_parent() {
		let tree = tree();

		assert!(tree.subdivision("US-CA").is_some());
		assert!(tree.subdivision("USA").is_none());

		let owner = tree.subdivision("US-CA").and_then(|node| tree.owning_country(node));

		assert_eq!(owner.map(|node| node.value.as_str()), Some("USA"));
	}
}
