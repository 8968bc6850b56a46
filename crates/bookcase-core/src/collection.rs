use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{BookcaseError, Result};
use crate::models::{Book, Shelf, ShelfStatus};
use crate::names::AuthorMatcher;
use crate::search::BookSearcher;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    Is(ShelfStatus),
    Uncategorized,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Title,
    Author,
    PublishedDate,
    Rating,
    PageCount,
}

impl std::str::FromStr for SortKey {
    type Err = BookcaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "published_date" | "date" => Ok(Self::PublishedDate),
            "rating" => Ok(Self::Rating),
            "page_count" | "pages" => Ok(Self::PageCount),
            _ => Err(BookcaseError::ConfigError(format!("unknown sort key: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Filter + sort over a book list and the user's shelf. Every set field
/// must hold for a book to be kept.
#[derive(Debug, Clone, Default)]
pub struct CollectionQuery {
    pub status: Option<StatusFilter>,
    pub author: Option<String>,
    pub min_rating: Option<u8>,
    pub category: Option<String>,
    pub text: Option<String>,
    pub sort: Option<(SortKey, SortOrder)>,
}

impl CollectionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn with_min_rating(mut self, stars: u8) -> Self {
        self.min_rating = Some(stars);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn sorted_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort = Some((key, order));
        self
    }

    /// Matching books. With a text query and no explicit sort the result is
    /// in relevance order; otherwise input order before sorting.
    pub fn apply<'a>(
        &self,
        books: &'a [Book],
        shelf: &Shelf,
        matcher: &AuthorMatcher,
    ) -> Vec<&'a Book> {
        let order: Vec<usize> = match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => BookSearcher::new()
                .search(text, books)
                .into_iter()
                .map(|hit| hit.index)
                .collect(),
            _ => (0..books.len()).collect(),
        };

        let mut selected: Vec<&Book> = order
            .into_iter()
            .map(|idx| &books[idx])
            .filter(|book| self.keeps(book, shelf, matcher))
            .collect();

        if let Some((key, sort_order)) = self.sort {
            selected.sort_by(|a, b| compare(a, b, key, sort_order, shelf));
        }
        selected
    }

    fn keeps(&self, book: &Book, shelf: &Shelf, matcher: &AuthorMatcher) -> bool {
        if let Some(filter) = self.status {
            let status = shelf.status_of(book);
            let ok = match filter {
                StatusFilter::Is(wanted) => status == Some(wanted),
                StatusFilter::Uncategorized => status.is_none(),
            };
            if !ok {
                return false;
            }
        }

        if let Some(author) = self.author.as_deref()
            && !matcher.matches_any(author, book.authors.as_slice())
            && !matcher.matches(author, &book.author)
        {
            return false;
        }

        if let Some(min) = self.min_rating
            && shelf.rating_of(book).is_none_or(|stars| stars < min)
        {
            return false;
        }

        if let Some(category) = self.category.as_deref() {
            let category = category.trim();
            if !book
                .categories
                .iter()
                .any(|c| c.trim().eq_ignore_ascii_case(category))
            {
                return false;
            }
        }

        true
    }
}

fn compare(a: &Book, b: &Book, key: SortKey, order: SortOrder, shelf: &Shelf) -> Ordering {
    match key {
        SortKey::Title => directed(
            a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            order,
        ),
        SortKey::Author => {
            let left = a.primary_author().unwrap_or_default().to_lowercase();
            let right = b.primary_author().unwrap_or_default().to_lowercase();
            directed(left.cmp(&right), order)
        }
        SortKey::PublishedDate => missing_last(a.published_on(), b.published_on(), order),
        SortKey::Rating => missing_last(shelf.rating_of(a), shelf.rating_of(b), order),
        SortKey::PageCount => directed(a.page_count.cmp(&b.page_count), order),
    }
}

fn directed(ord: Ordering, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Ascending => ord,
        SortOrder::Descending => ord.reverse(),
    }
}

/// Absent values sort after present ones in both directions.
fn missing_last<T: Ord>(left: Option<T>, right: Option<T>, order: SortOrder) -> Ordering {
    match (left, right) {
        (Some(l), Some(r)) => directed(l.cmp(&r), order),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, date: Option<&str>) -> Book {
        let mut b = Book::new(title, author);
        b.published_date = date.map(ToOwned::to_owned);
        b
    }

    fn library() -> (Vec<Book>, Shelf) {
        let books = vec![
            book("Kindred", "Octavia E. Butler", Some("1979")),
            book("Dune", "Frank Herbert", Some("1965")),
            book("Piranesi", "Susanna Clarke", None),
            book("Parable of the Sower", "Octavia E. Butler", Some("1993")),
        ];
        let mut shelf = Shelf::new();
        shelf.set_status(&books[0], ShelfStatus::Read);
        shelf.rate(&books[0], 5).unwrap();
        shelf.set_status(&books[1], ShelfStatus::Read);
        shelf.rate(&books[1], 3).unwrap();
        shelf.set_status(&books[2], ShelfStatus::Want);
        (books, shelf)
    }

    fn titles(books: &[&Book]) -> Vec<String> {
        books.iter().map(|b| b.title.clone()).collect()
    }

    #[test]
    fn filters_by_status() {
        let (books, shelf) = library();
        let matcher = AuthorMatcher::default();

        let read = CollectionQuery::new()
            .with_status(StatusFilter::Is(ShelfStatus::Read))
            .apply(&books, &shelf, &matcher);
        assert_eq!(titles(&read), vec!["Kindred", "Dune"]);

        let fresh = CollectionQuery::new()
            .with_status(StatusFilter::Uncategorized)
            .apply(&books, &shelf, &matcher);
        assert_eq!(titles(&fresh), vec!["Parable of the Sower"]);
    }

    #[test]
    fn filters_by_author_and_rating() {
        let (books, shelf) = library();
        let matcher = AuthorMatcher::default();

        let butler = CollectionQuery::new()
            .with_author("octavia e. butler")
            .apply(&books, &shelf, &matcher);
        assert_eq!(titles(&butler), vec!["Kindred", "Parable of the Sower"]);

        let loved = CollectionQuery::new()
            .with_min_rating(4)
            .apply(&books, &shelf, &matcher);
        assert_eq!(titles(&loved), vec!["Kindred"]);
    }

    #[test]
    fn filters_by_category() {
        let (mut books, shelf) = library();
        books[2].categories = vec!["Fantasy".into()];
        let hits = CollectionQuery::new()
            .with_category("fantasy")
            .apply(&books, &shelf, &AuthorMatcher::default());
        assert_eq!(titles(&hits), vec!["Piranesi"]);
    }

    #[test]
    fn sorts_dates_with_missing_last() {
        let (books, shelf) = library();
        let matcher = AuthorMatcher::default();

        let asc = CollectionQuery::new()
            .sorted_by(SortKey::PublishedDate, SortOrder::Ascending)
            .apply(&books, &shelf, &matcher);
        assert_eq!(
            titles(&asc),
            vec!["Dune", "Kindred", "Parable of the Sower", "Piranesi"]
        );

        let desc = CollectionQuery::new()
            .sorted_by(SortKey::PublishedDate, SortOrder::Descending)
            .apply(&books, &shelf, &matcher);
        assert_eq!(
            titles(&desc),
            vec!["Parable of the Sower", "Kindred", "Dune", "Piranesi"]
        );
    }

    #[test]
    fn sorts_by_rating_and_title() {
        let (books, shelf) = library();
        let matcher = AuthorMatcher::default();

        let by_rating = CollectionQuery::new()
            .sorted_by(SortKey::Rating, SortOrder::Descending)
            .apply(&books, &shelf, &matcher);
        assert_eq!(titles(&by_rating)[..2], ["Kindred", "Dune"]);

        let by_title = CollectionQuery::new()
            .sorted_by(SortKey::Title, SortOrder::Ascending)
            .apply(&books, &shelf, &matcher);
        assert_eq!(
            titles(&by_title),
            vec!["Dune", "Kindred", "Parable of the Sower", "Piranesi"]
        );
    }

    #[test]
    fn text_search_narrows_results() {
        let (books, shelf) = library();
        let hits = CollectionQuery::new()
            .with_text("sower")
            .apply(&books, &shelf, &AuthorMatcher::default());
        assert_eq!(titles(&hits), vec!["Parable of the Sower"]);
    }

    #[test]
    fn sort_keys_parse() {
        assert_eq!("date".parse::<SortKey>().unwrap(), SortKey::PublishedDate);
        assert_eq!("page-count".parse::<SortKey>().unwrap(), SortKey::PageCount);
        assert!("shelf".parse::<SortKey>().is_err());
    }
}
