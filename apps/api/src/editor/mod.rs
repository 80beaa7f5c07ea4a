// Resume editing engine.
// Implements: typed section/field addressing, copy-on-write mutations, field validation.
// Nothing here does I/O; the session layer owns the record and decides when to persist.

pub mod mutator;
pub mod section;
pub mod validation;

use thiserror::Error;

pub use mutator::{apply, Edit, FieldUpdate};
pub use section::{FieldPath, SectionKind};
pub use validation::{validate, ValidationReport};

/// Structural edit errors. These indicate a bug in the calling code, not
/// something the end user can fix.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MutationError {
    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("index {index} out of range for section '{section}' (length {len})")]
    IndexOutOfRange {
        section: SectionKind,
        index: usize,
        len: usize,
    },

    #[error("'{0}' is not a repeated section")]
    UnknownSection(String),
}
