//! Core of the bookcase library: author name normalization and matching,
//! catalog record cleanup, edition deduplication, and the user's shelf.

pub mod collection;
pub mod config;
pub mod dedup;
pub mod error;
pub mod export;
pub mod filter;
pub mod identifiers;
pub mod models;
pub mod names;
pub mod recommend;
pub mod search;

pub use collection::{CollectionQuery, SortKey, SortOrder, StatusFilter};
pub use config::AppConfig;
pub use dedup::{
    DedupOutcome, DedupPolicy, Deduplicator, DuplicateGroup, TieBreak, deduplicate,
    region_language,
};
pub use error::{BookcaseError, Result};
pub use export::{ExportFormat, export};
pub use filter::{RecordFilter, Rejection};
pub use identifiers::Isbn;
pub use models::*;
pub use names::{
    AuthorMatcher, AuthorVerification, CorrectionTable, NameNormalizer, names_match, normalize,
    verify_author,
};
pub use recommend::{Recommendation, Recommender};
pub use search::BookSearcher;
