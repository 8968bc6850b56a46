use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::normalize::NameNormalizer;
use crate::models::CatalogRecord;

const SAMPLE_TITLES: usize = 3;

static GENERATIONAL_SUFFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)[\s,]+(?:jr|sr|ii|iii|iv|v)\.?$").expect("valid generational suffix regex")
});

static DEFAULT_MATCHER: Lazy<AuthorMatcher> = Lazy::new(AuthorMatcher::default);

/// Author equality: exact after normalization, or exact once a trailing
/// generational suffix is dropped. No fuzzy matching.
#[derive(Debug, Clone, Default)]
pub struct AuthorMatcher {
    normalizer: NameNormalizer,
}

impl AuthorMatcher {
    pub fn new(normalizer: NameNormalizer) -> Self {
        Self { normalizer }
    }

    pub fn normalizer(&self) -> &NameNormalizer {
        &self.normalizer
    }

    pub fn matches(&self, a: &str, b: &str) -> bool {
        let left = self.normalizer.normalize(a).to_lowercase();
        let right = self.normalizer.normalize(b).to_lowercase();

        if left == right {
            return true;
        }

        let left_base = strip_generational_suffix(&left);
        let right_base = strip_generational_suffix(&right);
        !left_base.is_empty() && left_base == right_base
    }

    /// Any of `names` matches `query`.
    pub fn matches_any<S: AsRef<str>>(&self, query: &str, names: &[S]) -> bool {
        names.iter().any(|name| self.matches(query, name.as_ref()))
    }

    /// Group the records whose primary author matches `query` by their exact
    /// normalized author string. More than one group means the catalog knows
    /// several distinct authors under that name; the caller must choose.
    pub fn verify(&self, query: &str, records: &[CatalogRecord]) -> AuthorVerification {
        let mut candidates: Vec<AuthorCandidate> = Vec::new();

        for record in records {
            let Some(primary) = record.primary_author() else {
                continue;
            };
            if !self.matches(query, primary) {
                continue;
            }

            let name = self.normalizer.normalize(primary);
            let idx = match candidates.iter().position(|c| c.name == name) {
                Some(idx) => idx,
                None => {
                    candidates.push(AuthorCandidate::new(name));
                    candidates.len() - 1
                }
            };
            candidates[idx].absorb(record);
        }

        match candidates.len() {
            0 => AuthorVerification::NotFound,
            1 => AuthorVerification::Confirmed(candidates.remove(0)),
            _ => {
                tracing::debug!(
                    query,
                    groups = candidates.len(),
                    "author name is shared by several catalog authors"
                );
                AuthorVerification::Ambiguous(candidates)
            }
        }
    }
}

/// One distinct catalog author behind a queried name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorCandidate {
    pub name: String,
    pub record_count: usize,
    pub sample_titles: Vec<String>,
    pub categories: Vec<String>,
}

impl AuthorCandidate {
    fn new(name: String) -> Self {
        Self {
            name,
            record_count: 0,
            sample_titles: Vec::new(),
            categories: Vec::new(),
        }
    }

    fn absorb(&mut self, record: &CatalogRecord) {
        self.record_count += 1;

        let title = record.title.trim();
        if !title.is_empty()
            && self.sample_titles.len() < SAMPLE_TITLES
            && !self.sample_titles.iter().any(|t| t == title)
        {
            self.sample_titles.push(title.to_string());
        }

        for category in &record.categories {
            if !self.categories.contains(category) {
                self.categories.push(category.clone());
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "candidates", rename_all = "snake_case")]
pub enum AuthorVerification {
    NotFound,
    Confirmed(AuthorCandidate),
    Ambiguous(Vec<AuthorCandidate>),
}

impl AuthorVerification {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous(_))
    }
}

/// Matcher backed by the built-in correction table.
pub fn default_matcher() -> &'static AuthorMatcher {
    &DEFAULT_MATCHER
}

pub fn names_match(a: &str, b: &str) -> bool {
    DEFAULT_MATCHER.matches(a, b)
}

pub fn verify_author(query: &str, records: &[CatalogRecord]) -> AuthorVerification {
    DEFAULT_MATCHER.verify(query, records)
}

/// Drop one trailing `jr`/`sr`/`ii`/`iii`/`iv`/`v` token (optional period),
/// then trim and lowercase.
pub fn strip_generational_suffix(name: &str) -> String {
    let stripped: Cow<'_, str> = GENERATIONAL_SUFFIX_RE.replace(name, "");
    stripped.trim().to_lowercase()
}
