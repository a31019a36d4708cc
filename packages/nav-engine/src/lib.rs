pub mod client;
pub mod types;

mod error;

pub use client::EngineClient;
pub use error::{Error, Result};
pub use types::{
	CanonicalFilterSet, Concept, EngineHit, EngineQuery, EngineResponse, EngineSort, FieldFilter,
	FilterField, HitFields, ParentConcept, PassageHit, PassageWindow, SortField, SortOrder,
	YearRange,
};
