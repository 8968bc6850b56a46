use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::record::{CatalogRecord, default_language};
use crate::error::{BookcaseError, Result};

/// Namespace for [`Book::stable_id`] name-based UUIDs.
const BOOK_ID_NAMESPACE: Uuid = Uuid::from_u128(0x6d79_626f_6f6b_6361_7365_0000_0000_0001);

/// The canonical, de-duplicated unit that is stored and displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Catalog id of the record this book came from. Not an identity.
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Primary author display name.
    #[serde(default)]
    pub author: String,

    #[serde(default)]
    pub authors: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default)]
    pub page_count: u32,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn13: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn10: Option<String>,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        let author = author.into();
        Self {
            id: String::new(),
            title: title.into(),
            authors: vec![author.clone()],
            author,
            published_date: None,
            description: String::new(),
            language: default_language(),
            page_count: 0,
            categories: Vec::new(),
            thumbnail_url: None,
            isbn13: None,
            isbn10: None,
        }
    }

    pub fn from_record(record: &CatalogRecord) -> Self {
        Self {
            id: record.id.clone(),
            title: record.title.trim().to_string(),
            author: record.primary_author().unwrap_or_default().to_string(),
            authors: record.author_names.clone(),
            published_date: record.published_date.clone(),
            description: record.description.clone(),
            language: record.language.clone(),
            page_count: record.page_count,
            categories: record.categories.clone(),
            thumbnail_url: record.thumbnail_url.clone(),
            isbn13: record.isbn13.clone(),
            isbn10: record.isbn10.clone(),
        }
    }

    /// The singular `author` field, falling back to the first of `authors`.
    pub fn primary_author(&self) -> Option<&str> {
        Some(self.author.trim())
            .filter(|a| !a.is_empty())
            .or_else(|| {
                self.authors
                    .first()
                    .map(|a| a.trim())
                    .filter(|a| !a.is_empty())
            })
    }

    /// `lowercase(trim(title)) :: lowercase(trim(primary author))`.
    pub fn identity_key(&self) -> Result<IdentityKey> {
        let title = self.title.trim();
        match self.primary_author() {
            Some(author) if !title.is_empty() => Ok(IdentityKey(format!(
                "{}::{}",
                title.to_lowercase(),
                author.to_lowercase()
            ))),
            _ => Err(BookcaseError::InvalidRecord {
                title: self.title.clone(),
                author: self.author.clone(),
            }),
        }
    }

    /// Name-based UUID of the identity key. Editions that collapse to the
    /// same key share the id.
    pub fn stable_id(&self) -> Result<Uuid> {
        let key = self.identity_key()?;
        Ok(Uuid::new_v5(&BOOK_ID_NAMESPACE, key.as_str().as_bytes()))
    }

    /// The `title-author` string under which shelf status and ratings are
    /// recorded. Un-normalized on purpose: lookups must match it exactly.
    pub fn status_key(&self) -> String {
        format!("{}-{}", self.title, self.primary_author().unwrap_or_default())
    }

    pub fn published_on(&self) -> Option<NaiveDate> {
        self.published_date.as_deref().and_then(parse_published_date)
    }
}

/// Deduplication identity of a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct IdentityKey(String);

impl IdentityKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Parse the catalog's free-text date: `YYYY`, `YYYY-MM`, `YYYY-MM-DD`, or
/// an RFC 3339 timestamp. Partial dates resolve to their first day.
pub fn parse_published_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let date_part = raw.split_once('T').map_or(raw, |(date, _)| date);

    let mut parts = date_part.splitn(3, '-');
    let year = parts.next().filter(|y| y.len() == 4)?.parse::<i32>().ok()?;
    let month = match parts.next() {
        Some(m) => m.parse::<u32>().ok()?,
        None => 1,
    };
    let day = match parts.next() {
        Some(d) => d.parse::<u32>().ok()?,
        None => 1,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_key_lowercases_and_trims() {
        let book = Book::new("  Dune ", "Frank HERBERT");
        assert_eq!(book.identity_key().unwrap().as_str(), "dune::frank herbert");
    }

    #[test]
    fn primary_author_falls_back_to_authors_list() {
        let mut book = Book::new("Good Omens", "");
        book.authors = vec!["Terry Pratchett".into(), "Neil Gaiman".into()];
        assert_eq!(book.primary_author(), Some("Terry Pratchett"));
        assert_eq!(
            book.identity_key().unwrap().as_str(),
            "good omens::terry pratchett"
        );
    }

    #[test]
    fn missing_identity_fields_are_rejected() {
        let mut no_author = Book::new("Untitled", "");
        no_author.authors.clear();
        assert!(matches!(
            no_author.identity_key(),
            Err(BookcaseError::InvalidRecord { .. })
        ));

        let no_title = Book::new("   ", "Ann Leckie");
        assert!(no_title.identity_key().is_err());
    }

    #[test]
    fn stable_id_follows_identity_key() {
        let a = Book::new("Dune", "Frank Herbert");
        let b = Book::new("dune", "frank herbert");
        let c = Book::new("Dune Messiah", "Frank Herbert");

        assert_eq!(a.stable_id().unwrap(), b.stable_id().unwrap());
        assert_ne!(a.stable_id().unwrap(), c.stable_id().unwrap());
    }

    #[test]
    fn status_key_is_raw_title_dash_author() {
        let book = Book::new("The Left Hand of Darkness", "Ursula K. Le Guin");
        assert_eq!(
            book.status_key(),
            "The Left Hand of Darkness-Ursula K. Le Guin"
        );
    }

    #[test]
    fn parses_partial_dates() {
        assert_eq!(
            parse_published_date("1965"),
            NaiveDate::from_ymd_opt(1965, 1, 1)
        );
        assert_eq!(
            parse_published_date("2015-06"),
            NaiveDate::from_ymd_opt(2015, 6, 1)
        );
        assert_eq!(
            parse_published_date(" 1999-01-31 "),
            NaiveDate::from_ymd_opt(1999, 1, 31)
        );
        assert_eq!(
            parse_published_date("2004-03-02T00:00:00Z"),
            NaiveDate::from_ymd_opt(2004, 3, 2)
        );
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert_eq!(parse_published_date(""), None);
        assert_eq!(parse_published_date("circa 1900"), None);
        assert_eq!(parse_published_date("1999-13-01"), None);
        assert_eq!(parse_published_date("99"), None);
    }

    #[test]
    fn from_record_keeps_primary_author() {
        let record = CatalogRecord {
            id: "vol-1".into(),
            title: " Piranesi ".into(),
            author_names: vec!["Susanna Clarke".into()],
            ..Default::default()
        };
        let book = Book::from_record(&record);
        assert_eq!(book.title, "Piranesi");
        assert_eq!(book.author, "Susanna Clarke");
        assert_eq!(book.language, "en");
    }
}
