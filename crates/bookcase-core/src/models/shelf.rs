use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::book::Book;
use crate::error::{BookcaseError, Result};
use crate::names::AuthorMatcher;

pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShelfStatus {
    Read,
    Want,
    Pass,
}

impl std::fmt::Display for ShelfStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read => write!(f, "read"),
            Self::Want => write!(f, "want"),
            Self::Pass => write!(f, "pass"),
        }
    }
}

impl std::str::FromStr for ShelfStatus {
    type Err = BookcaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "want" | "want-to-read" | "want_to_read" => Ok(Self::Want),
            "pass" => Ok(Self::Pass),
            _ => Err(BookcaseError::InvalidStatus(s.to_string())),
        }
    }
}

/// The user's reading state. Per-book entries are keyed by
/// [`Book::status_key`]; a book holds at most one status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shelf {
    #[serde(default)]
    pub favorite_authors: Vec<String>,

    #[serde(default)]
    pub statuses: BTreeMap<String, ShelfStatus>,

    #[serde(default)]
    pub ratings: BTreeMap<String, u8>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ShelfCounts {
    pub read: usize,
    pub want: usize,
    pub pass: usize,
    pub rated: usize,
}

impl Shelf {
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Authors ───────────────────────────────────────────

    /// Add `name` in normalized form. Returns `false` when an author that
    /// matches it is already listed.
    pub fn add_author(&mut self, name: &str, matcher: &AuthorMatcher) -> bool {
        let normalized = matcher.normalizer().normalize(name);
        if normalized.is_empty()
            || matcher.matches_any(&normalized, self.favorite_authors.as_slice())
        {
            return false;
        }
        self.favorite_authors.push(normalized);
        true
    }

    /// Remove every listed author matching `name`; returns how many went.
    pub fn remove_author(&mut self, name: &str, matcher: &AuthorMatcher) -> usize {
        let before = self.favorite_authors.len();
        self.favorite_authors
            .retain(|listed| !matcher.matches(listed, name));
        before - self.favorite_authors.len()
    }

    pub fn is_favorite(&self, name: &str, matcher: &AuthorMatcher) -> bool {
        matcher.matches_any(name, self.favorite_authors.as_slice())
    }

    // ─── Status ────────────────────────────────────────────

    pub fn set_status(&mut self, book: &Book, status: ShelfStatus) {
        self.statuses.insert(book.status_key(), status);
    }

    pub fn clear_status(&mut self, book: &Book) -> Option<ShelfStatus> {
        self.statuses.remove(&book.status_key())
    }

    pub fn status_of(&self, book: &Book) -> Option<ShelfStatus> {
        self.statuses.get(&book.status_key()).copied()
    }

    // ─── Ratings ───────────────────────────────────────────

    pub fn rate(&mut self, book: &Book, stars: u8) -> Result<()> {
        if !(1..=MAX_RATING).contains(&stars) {
            return Err(BookcaseError::InvalidRating(stars));
        }
        self.ratings.insert(book.status_key(), stars);
        Ok(())
    }

    pub fn clear_rating(&mut self, book: &Book) -> Option<u8> {
        self.ratings.remove(&book.status_key())
    }

    pub fn rating_of(&self, book: &Book) -> Option<u8> {
        self.ratings.get(&book.status_key()).copied()
    }

    pub fn counts(&self) -> ShelfCounts {
        let mut counts = ShelfCounts {
            rated: self.ratings.len(),
            ..Default::default()
        };
        for status in self.statuses.values() {
            match status {
                ShelfStatus::Read => counts.read += 1,
                ShelfStatus::Want => counts.want += 1,
                ShelfStatus::Pass => counts.pass += 1,
            }
        }
        counts
    }

    // ─── Load / Save ───────────────────────────────────────

    /// Load a shelf from a JSON file; a missing file is an empty shelf.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}
