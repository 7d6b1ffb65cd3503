//! Model artifact handling: quoting cleanup, symbol discovery, and the
//! minimal document check applied to externally supplied models.
//!
//! None of this parses the full model grammar. The learner and refiner own
//! that format; the pipeline only needs names and canonical quoting.
mod document;
mod normalize;
mod symbols;

pub use document::check_document_start;
pub use normalize::{normalize, NormalizeOutcome};
pub use symbols::{extract, Extraction, SymbolSet};
