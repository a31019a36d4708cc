//! Translation of user-facing filters into the engine's filter vocabulary.

use std::collections::BTreeSet;

use crate::{Result, request::SearchFilter};
use nav_domain::geography::GeographyTree;
use nav_engine::{CanonicalFilterSet, FieldFilter, FilterField};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslatedFilters {
	pub canonical: CanonicalFilterSet,
	pub metadata: Vec<FieldFilter>,
	pub concepts: Vec<FieldFilter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
	Filters(TranslatedFilters),
	/// The geography constraints exclude every geography, so no family can match.
	Unsatisfiable { reason: String },
}

enum GeographyScope {
	Codes(BTreeSet<String>),
	Unsatisfiable(String),
}

#[derive(Default)]
struct Collected {
	regions: Vec<String>,
	countries: Vec<String>,
	subdivisions: Vec<String>,
	categories: Vec<String>,
	sources: Vec<String>,
	languages: Vec<String>,
	metadata: Vec<FieldFilter>,
	concepts: Vec<FieldFilter>,
}

pub struct FilterTranslator<'a> {
	geographies: &'a GeographyTree,
}
impl<'a> FilterTranslator<'a> {
	pub fn new(geographies: &'a GeographyTree) -> Self {
		Self { geographies }
	}

	pub fn translate(&self, filters: &[SearchFilter]) -> Result<Translation> {
		let mut collected = Collected::default();

		for filter in filters {
			match filter {
				SearchFilter::Region(value) => collected.regions.push(value.clone()),
				SearchFilter::Country(value) => collected.countries.push(value.clone()),
				SearchFilter::Subdivision(value) => collected.subdivisions.push(value.clone()),
				SearchFilter::Category(value) => collected.categories.push(value.clone()),
				SearchFilter::Source(value) => collected.sources.push(value.clone()),
				SearchFilter::Language(value) => collected.languages.push(value.clone()),
				SearchFilter::Metadata(field) => collected.metadata.push(field.clone()),
				SearchFilter::Concept(field) => collected.concepts.push(field.clone()),
			}
		}

		let geographies = match self.geography_scope(&collected)? {
			GeographyScope::Codes(codes) => codes,
			GeographyScope::Unsatisfiable(reason) => {
				return Ok(Translation::Unsatisfiable { reason });
			},
		};
		let mut canonical = CanonicalFilterSet::default();

		canonical.insert(FilterField::FamilyGeographies, geographies);
		canonical.insert(FilterField::FamilyCategory, collected.categories);
		canonical.insert(FilterField::FamilySource, collected.sources);
		canonical.insert(FilterField::DocumentLanguages, collected.languages);

		Ok(Translation::Filters(TranslatedFilters {
			canonical,
			metadata: collected.metadata,
			concepts: collected.concepts,
		}))
	}

	/// Resolves the final geography code set. An empty set means no geography restriction.
	fn geography_scope(&self, collected: &Collected) -> Result<GeographyScope> {
		let tree = self.geographies;
		let region_members: Option<BTreeSet<String>> = if collected.regions.is_empty() {
			None
		} else {
			Some(tree.expand_regions(&collected.regions)?.into_iter().collect())
		};
		let mut countries: BTreeSet<String> =
			tree.resolve_mixed_identifiers(&collected.countries)?.into_iter().collect();
		let mut subdivisions: Vec<String> = tree.validate_subdivisions(&collected.subdivisions)?;

		if countries.is_empty() && subdivisions.is_empty() {
			return Ok(GeographyScope::Codes(region_members.unwrap_or_default()));
		}

		let owner_of = |code: &str| {
			tree.subdivision(code)
				.and_then(|node| tree.owning_country(node))
				.map(|country| country.value.clone())
		};

		if let Some(members) = &region_members {
			countries.retain(|code| members.contains(code));
			subdivisions
				.retain(|code| owner_of(code).is_some_and(|country| members.contains(&country)));

			if countries.is_empty() && subdivisions.is_empty() {
				return Ok(GeographyScope::Unsatisfiable(format!(
					"No requested country or subdivision lies within regions {}.",
					collected.regions.join(", ")
				)));
			}
		}

		// A country with requested subdivisions is narrowed to those subdivisions.
		for code in &subdivisions {
			if let Some(country) = owner_of(code) {
				countries.remove(&country);
			}
		}

		countries.extend(subdivisions);

		Ok(GeographyScope::Codes(countries))
	}
}
