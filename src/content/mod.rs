//! Block schema and the normalizer every consumer reads through.

pub mod normalize;
pub mod options;
pub mod schema;

pub use normalize::{NormalizeError, canonicalize, normalize, normalize_as};
pub use options::{McqOption, NormalizedOptions, normalize_options};
pub use schema::{BlockContent, BlockKind, ListType, UnknownKind};
