//! factdrill-core: Attempt log, mastery aggregation, and question selection.
//!
//! This crate defines the fact model, the store traits, and the selection
//! policies that the rest of factdrill builds on.

pub mod coverage;
pub mod engine;
pub mod error;
pub mod mastery;
pub mod memory;
pub mod model;
pub mod random;
pub mod selector;
pub mod traits;
pub mod universe;

pub use engine::{Coverage, DrillEngine};
pub use error::{DrillError, DrillResult};
pub use model::{Fact, FactKey, Mode};
pub use selector::Selection;
