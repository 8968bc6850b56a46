//! Author name handling: canonical capitalization, misspelling correction,
//! and the single author-equality relation used across the crate.

pub mod matcher;
pub mod normalize;

pub use matcher::{
    AuthorCandidate, AuthorMatcher, AuthorVerification, default_matcher, names_match,
    strip_generational_suffix, verify_author,
};
pub use normalize::{
    BUILTIN_TABLE_VERSION, CorrectionTable, NameNormalizer, capitalize_name, default_normalizer,
    normalize,
};
