pub mod geography;
pub mod import_id;
pub mod passage;

mod error;

pub use error::{Error, Result};
