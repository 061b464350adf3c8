//! Declarations Module
//!
//! Loading connections classes, config classes and tasks from TOML.

pub mod catalog;
pub mod loader;
pub mod types;
pub mod validation;

pub use catalog::Catalog;
pub use loader::{load_declarations, load_declarations_from_string};
pub use types::Declarations;
pub use validation::validate_declarations;
