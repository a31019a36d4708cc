use nav_domain::{
	Error,
	geography::{Geography, GeographyTree},
	passage::{self, PassageSortKey},
};

fn node(id: i32, value: &str, slug: &str, parent_id: Option<i32>) -> Geography {
	Geography {
		id,
		value: value.to_string(),
		slug: slug.to_string(),
		display_value: slug.replace('-', " "),
		parent_id,
	}
}

fn sample_tree() -> GeographyTree {
	GeographyTree::new(vec![
		node(1, "Europe & Central Asia", "europe-central-asia", None),
		node(2, "ITA", "italy", Some(1)),
		node(3, "DEU", "germany", Some(1)),
		node(4, "East Asia & Pacific", "east-asia-pacific", None),
		node(5, "AUS", "australia", Some(4)),
		node(6, "AU-NSW", "new-south-wales", Some(5)),
		node(7, "AU-VIC", "victoria", Some(5)),
	])
}

fn strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|value| value.to_string()).collect()
}

#[test]
fn mixed_identifiers_resolve_iso_then_slug() {
	let tree = sample_tree();
	let codes = tree
		.resolve_mixed_identifiers(&strings(&["ITA", "germany", "italy"]))
		.expect("Expected identifiers to resolve.");

	assert_eq!(codes, strings(&["ITA", "DEU"]));
}

#[test]
fn mixed_identifiers_name_every_unresolved_identifier() {
	let tree = sample_tree();
	let err = tree
		.resolve_mixed_identifiers(&strings(&["ITA", "atlantis", "XXX"]))
		.expect_err("Expected unresolved identifiers.");

	assert_eq!(
		err,
		Error::UnresolvedGeography { kind: "country", identifiers: strings(&["atlantis", "XXX"]) }
	);
	assert!(err.to_string().contains("atlantis, XXX"));
}

#[test]
fn region_slugs_do_not_resolve_as_countries() {
	let tree = sample_tree();

	assert!(tree.resolve_mixed_identifiers(&strings(&["east-asia-pacific"])).is_err());
}

#[test]
fn regions_expand_to_member_countries() {
	let tree = sample_tree();
	let codes = tree
		.expand_regions(&strings(&["europe-central-asia", "east-asia-pacific"]))
		.expect("Expected regions to expand.");

	assert_eq!(codes, strings(&["AUS", "DEU", "ITA"]));
}

#[test]
fn unknown_region_fails() {
	let tree = sample_tree();
	let err = tree.expand_regions(&strings(&["italy"])).expect_err("Expected unknown region.");

	assert_eq!(
		err,
		Error::UnresolvedGeography { kind: "region", identifiers: strings(&["italy"]) }
	);
}

#[test]
fn subdivisions_must_belong_to_a_country() {
	let tree = sample_tree();

	assert_eq!(
		tree.validate_subdivisions(&strings(&["AU-NSW", "AU-NSW"])).expect("Expected valid."),
		strings(&["AU-NSW"])
	);
	assert!(tree.validate_subdivisions(&strings(&["AUS"])).is_err());
}

#[test]
fn passages_sort_numerically_by_page() {
	let mut pages =
		vec![(Some(11), "p11_b1"), (Some(2), "p2_b1"), (Some(14), "p14_b1"), (Some(1), "p1_b1")];

	passage::sort_in_reading_order(&mut pages, |(page, id)| PassageSortKey::new(*page, id));

	let ordered: Vec<Option<u32>> = pages.iter().map(|(page, _)| *page).collect();

	assert_eq!(ordered, vec![Some(1), Some(2), Some(11), Some(14)]);
}

#[test]
fn derived_pages_and_blocks_order_numerically() {
	let mut ids = vec!["p10_b2", "p2_b10", "p2_b9", "p1_b100"];

	passage::sort_in_reading_order(&mut ids, |id| PassageSortKey::new(None, id));

	assert_eq!(ids, vec!["p1_b100", "p2_b9", "p2_b10", "p10_b2"]);
}

#[test]
fn opaque_ids_follow_numeric_ids_in_string_order() {
	let mut ids = vec!["zeta", "b12", "alpha", "3"];

	passage::sort_in_reading_order(&mut ids, |id| PassageSortKey::new(Some(0), id));

	assert_eq!(ids, vec!["3", "b12", "alpha", "zeta"]);
	assert!(PassageSortKey::new(None, "alpha").is_opaque());
}

#[test]
fn passages_without_page_sort_last() {
	let mut passages = vec![(None, "1"), (Some(5), "7"), (Some(0), "9")];

	passage::sort_in_reading_order(&mut passages, |(page, id)| PassageSortKey::new(*page, id));

	assert_eq!(passages, vec![(Some(0), "9"), (Some(5), "7"), (None, "1")]);
}
