use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::models::Book;

/// A scored search hit; `index` points into the searched slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchHit {
    pub index: usize,
    pub score: u32,
}

/// Fuzzy text search over title, authors and categories.
pub struct BookSearcher {
    matcher: Matcher,
}

impl BookSearcher {
    pub fn new() -> Self {
        Self {
            matcher: Matcher::new(Config::DEFAULT),
        }
    }

    /// Hits sorted by descending score; equal scores keep input order.
    /// A blank query matches everything with score 0.
    pub fn search(&mut self, query: &str, books: &[Book]) -> Vec<SearchHit> {
        let query = query.trim();
        if query.is_empty() {
            return (0..books.len())
                .map(|index| SearchHit { index, score: 0 })
                .collect();
        }

        let pattern = Pattern::new(
            query,
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );
        let mut buf = Vec::new();
        let mut hits = Vec::new();

        for (index, book) in books.iter().enumerate() {
            let searchable = format!(
                "{} {} {}",
                book.title,
                book.authors.join(" "),
                book.categories.join(" ")
            );
            let haystack = Utf32Str::new(&searchable, &mut buf);
            if let Some(score) = pattern.score(haystack, &mut self.matcher) {
                hits.push(SearchHit { index, score });
            }
        }

        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits
    }
}

impl Default for BookSearcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(title: &str, author: &str, categories: &[&str]) -> Book {
        let mut b = Book::new(title, author);
        b.categories = categories.iter().map(|s| s.to_string()).collect();
        b
    }

    #[test]
    fn finds_by_title_author_and_category() {
        let books = vec![
            book("Ancillary Justice", "Ann Leckie", &["Science Fiction"]),
            book("Bel Canto", "Ann Patchett", &["Literary Fiction"]),
            book("Piranesi", "Susanna Clarke", &["Fantasy"]),
        ];

        let mut searcher = BookSearcher::new();
        let by_author = searcher.search("leckie", &books);
        assert_eq!(by_author.len(), 1);
        assert_eq!(by_author[0].index, 0);

        let by_category = searcher.search("fantasy", &books);
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category[0].index, 2);
    }

    #[test]
    fn tolerates_typos() {
        let books = vec![book("The Left Hand of Darkness", "Ursula K. Le Guin", &[])];
        let mut searcher = BookSearcher::new();
        assert!(!searcher.search("lft hand", &books).is_empty());
    }

    #[test]
    fn blank_query_returns_everything_in_order() {
        let books = vec![book("A", "X", &[]), book("B", "Y", &[])];
        let hits = BookSearcher::new().search("  ", &books);
        let indexes: Vec<_> = hits.iter().map(|h| h.index).collect();
        assert_eq!(indexes, vec![0, 1]);
    }
}
