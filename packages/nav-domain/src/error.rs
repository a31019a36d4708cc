pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
	#[error("Could not resolve {kind} identifier(s): {}.", identifiers.join(", "))]
	UnresolvedGeography { kind: &'static str, identifiers: Vec<String> },
	#[error("Invalid import id(s): {}.", ids.join(", "))]
	InvalidImportId { ids: Vec<String> },
}
