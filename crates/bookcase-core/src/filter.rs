//! Upstream cleanup of raw catalog records before deduplication: drop
//! entries without a usable identity, placeholder authors, and re-release
//! editions, then convert the rest into [`Book`]s.

use std::fmt;

use crate::models::{Book, CatalogRecord};
use crate::names::AuthorMatcher;

pub const DEFAULT_PLACEHOLDER_AUTHORS: &[&str] = &[
    "Unknown Author",
    "Unknown",
    "Author Unknown",
    "Anonymous",
    "Various",
    "Various Authors",
    "N/A",
];

pub const DEFAULT_RERELEASE_KEYWORDS: &[&str] = &[
    "movie tie-in",
    "tv tie-in",
    "anniversary edition",
    "collector's edition",
    "deluxe edition",
    "special edition",
    "box set",
    "boxed set",
    "large print",
    "summary of",
    "study guide",
    "sparknotes",
    "cliffsnotes",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    MissingTitle,
    MissingAuthor,
    PlaceholderAuthor(String),
    Rerelease(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "missing title"),
            Self::MissingAuthor => write!(f, "missing author"),
            Self::PlaceholderAuthor(name) => write!(f, "placeholder author {name:?}"),
            Self::Rerelease(keyword) => write!(f, "re-release ({keyword})"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecordFilter {
    placeholder_authors: Vec<String>,
    rerelease_keywords: Vec<String>,
    matcher: AuthorMatcher,
}

impl Default for RecordFilter {
    fn default() -> Self {
        Self::new(
            DEFAULT_PLACEHOLDER_AUTHORS.iter().copied(),
            DEFAULT_RERELEASE_KEYWORDS.iter().copied(),
            AuthorMatcher::default(),
        )
    }
}

impl RecordFilter {
    pub fn new<'a>(
        placeholder_authors: impl IntoIterator<Item = &'a str>,
        rerelease_keywords: impl IntoIterator<Item = &'a str>,
        matcher: AuthorMatcher,
    ) -> Self {
        let placeholder_authors = placeholder_authors
            .into_iter()
            .map(|name| matcher.normalizer().normalize(name).to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();
        let rerelease_keywords = rerelease_keywords
            .into_iter()
            .map(|kw| kw.trim().to_lowercase())
            .filter(|kw| !kw.is_empty())
            .collect();

        Self {
            placeholder_authors,
            rerelease_keywords,
            matcher,
        }
    }

    pub fn matcher(&self) -> &AuthorMatcher {
        &self.matcher
    }

    pub fn check(&self, record: &CatalogRecord) -> Result<(), Rejection> {
        if record.title.trim().is_empty() {
            return Err(Rejection::MissingTitle);
        }

        let Some(author) = record.primary_author() else {
            return Err(Rejection::MissingAuthor);
        };
        let normalized = self.matcher.normalizer().normalize(author).to_lowercase();
        if self.placeholder_authors.contains(&normalized) {
            return Err(Rejection::PlaceholderAuthor(author.to_string()));
        }

        let title = record.title.to_lowercase();
        if let Some(keyword) = self
            .rerelease_keywords
            .iter()
            .find(|kw| title.contains(kw.as_str()))
        {
            return Err(Rejection::Rerelease(keyword.clone()));
        }

        Ok(())
    }

    /// Convert every accepted record into a [`Book`], in input order.
    pub fn prepare(&self, records: &[CatalogRecord]) -> Vec<Book> {
        let books: Vec<Book> = records
            .iter()
            .filter(|record| match self.check(record) {
                Ok(()) => true,
                Err(reason) => {
                    tracing::debug!(
                        id = %record.id,
                        title = %record.title,
                        %reason,
                        "dropping catalog record"
                    );
                    false
                }
            })
            .map(to_book)
            .collect();

        tracing::info!(
            input = records.len(),
            kept = books.len(),
            "filtered catalog records"
        );
        books
    }

    /// Records with any author matching `name`.
    pub fn by_author(&self, records: &[CatalogRecord], name: &str) -> Vec<CatalogRecord> {
        records
            .iter()
            .filter(|record| self.matcher.matches_any(name, record.author_names.as_slice()))
            .cloned()
            .collect()
    }
}

fn to_book(record: &CatalogRecord) -> Book {
    let mut book = Book::from_record(record);
    book.thumbnail_url = book.thumbnail_url.as_deref().map(ensure_https);

    let mut categories: Vec<String> = Vec::with_capacity(book.categories.len());
    for category in book.categories.drain(..) {
        let category = category.trim().to_string();
        if !category.is_empty()
            && !categories
                .iter()
                .any(|seen| seen.eq_ignore_ascii_case(&category))
        {
            categories.push(category);
        }
    }
    book.categories = categories;
    book
}

/// Upgrade `http://` and protocol-relative URLs to `https://`.
pub fn ensure_https(url: &str) -> String {
    let url = url.trim();
    if let Some(rest) = url.strip_prefix("http://") {
        format!("https://{rest}")
    } else if let Some(rest) = url.strip_prefix("//") {
        format!("https://{rest}")
    } else {
        url.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, authors: &[&str]) -> CatalogRecord {
        CatalogRecord {
            id: title.to_lowercase(),
            title: title.to_string(),
            author_names: authors.iter().map(|a| a.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_missing_identity() {
        let filter = RecordFilter::default();
        assert_eq!(
            filter.check(&record("  ", &["Ann Leckie"])),
            Err(Rejection::MissingTitle)
        );
        assert_eq!(
            filter.check(&record("Provenance", &[])),
            Err(Rejection::MissingAuthor)
        );
        assert_eq!(
            filter.check(&record("Provenance", &[" "])),
            Err(Rejection::MissingAuthor)
        );
    }

    #[test]
    fn rejects_placeholder_authors_case_insensitively() {
        let filter = RecordFilter::default();
        assert_eq!(
            filter.check(&record("Beowulf", &["UNKNOWN AUTHOR"])),
            Err(Rejection::PlaceholderAuthor("UNKNOWN AUTHOR".into()))
        );
        assert!(filter.check(&record("Beowulf", &["Seamus Heaney"])).is_ok());
    }

    #[test]
    fn rejects_rereleases() {
        let filter = RecordFilter::default();
        assert_eq!(
            filter.check(&record("Dune (Movie Tie-In)", &["Frank Herbert"])),
            Err(Rejection::Rerelease("movie tie-in".into()))
        );
        assert!(filter.check(&record("Dune Messiah", &["Frank Herbert"])).is_ok());
    }

    #[test]
    fn prepare_converts_and_cleans() {
        let mut dune = record("Dune", &["Frank Herbert"]);
        dune.thumbnail_url = Some("http://covers.example/dune.jpg".into());
        dune.categories = vec!["Fiction".into(), "fiction".into(), " ".into(), "Sci-Fi".into()];
        let records = vec![dune, record("Unknown", &["Unknown"])];

        let books = RecordFilter::default().prepare(&records);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].author, "Frank Herbert");
        assert_eq!(
            books[0].thumbnail_url.as_deref(),
            Some("https://covers.example/dune.jpg")
        );
        assert_eq!(books[0].categories, vec!["Fiction", "Sci-Fi"]);
    }

    #[test]
    fn by_author_uses_matcher_on_every_author() {
        let records = vec![
            record("Good Omens", &["Terry Pratchett", "Neil Gaiman"]),
            record("Coraline", &["neil gaiman"]),
            record("Mort", &["Terry Pratchett"]),
        ];

        let found = RecordFilter::default().by_author(&records, "Neil Gaimen");
        let titles: Vec<_> = found.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Good Omens", "Coraline"]);
    }

    #[test]
    fn custom_lists_replace_defaults() {
        let filter = RecordFilter::new(["Staff"], ["abridged"], AuthorMatcher::default());
        assert!(filter.check(&record("Dune (Movie Tie-In)", &["Frank Herbert"])).is_ok());
        assert!(filter.check(&record("Dune, Abridged", &["Frank Herbert"])).is_err());
        assert!(filter.check(&record("Almanac", &["staff"])).is_err());
    }

    #[test]
    fn ensure_https_upgrades_plain_urls() {
        assert_eq!(ensure_https("http://a.example/x"), "https://a.example/x");
        assert_eq!(ensure_https("//a.example/x"), "https://a.example/x");
        assert_eq!(ensure_https("https://a.example/x"), "https://a.example/x");
    }
}
