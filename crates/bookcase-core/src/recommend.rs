use std::collections::HashSet;

use serde::Serialize;

use crate::models::{Book, IdentityKey, Shelf};
use crate::names::AuthorMatcher;

/// Seed weight of an author on the favorites list.
pub const FAVORITE_WEIGHT: u8 = 2;
/// Lowest rating whose author counts as liked.
pub const LIKED_RATING: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub book: Book,
    pub matched_author: String,
    pub score: u8,
}

struct Seed {
    author: String,
    weight: u8,
}

/// Suggests unseen books by authors the user already follows or rated
/// highly.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    matcher: AuthorMatcher,
}

impl Recommender {
    pub fn new(matcher: AuthorMatcher) -> Self {
        Self { matcher }
    }

    pub fn recommend(
        &self,
        library: &[Book],
        candidates: &[Book],
        shelf: &Shelf,
        limit: usize,
    ) -> Vec<Recommendation> {
        let seeds = self.seeds(library, shelf);
        if seeds.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut seen: HashSet<IdentityKey> = library
            .iter()
            .filter_map(|book| book.identity_key().ok())
            .collect();

        let mut picks: Vec<Recommendation> = Vec::new();
        for candidate in candidates {
            let Ok(key) = candidate.identity_key() else {
                continue;
            };
            if shelf.status_of(candidate).is_some() || shelf.rating_of(candidate).is_some() {
                continue;
            }
            let Some(author) = candidate.primary_author() else {
                continue;
            };

            let best = seeds
                .iter()
                .filter(|seed| self.matcher.matches(&seed.author, author))
                .max_by_key(|seed| seed.weight);
            let Some(seed) = best else {
                continue;
            };
            if !seen.insert(key) {
                continue;
            }

            picks.push(Recommendation {
                book: candidate.clone(),
                matched_author: seed.author.clone(),
                score: seed.weight,
            });
        }

        picks.sort_by(|a, b| b.score.cmp(&a.score));
        picks.truncate(limit);
        tracing::debug!(
            seeds = seeds.len(),
            candidates = candidates.len(),
            picked = picks.len(),
            "built recommendations"
        );
        picks
    }

    fn seeds(&self, library: &[Book], shelf: &Shelf) -> Vec<Seed> {
        let mut seeds: Vec<Seed> = Vec::new();
        let mut add = |author: &str, weight: u8| {
            match seeds
                .iter_mut()
                .find(|seed| self.matcher.matches(&seed.author, author))
            {
                Some(seed) => seed.weight = seed.weight.max(weight),
                None => seeds.push(Seed {
                    author: self.matcher.normalizer().normalize(author),
                    weight,
                }),
            }
        };

        for author in &shelf.favorite_authors {
            add(author, FAVORITE_WEIGHT);
        }
        for book in library {
            if let (Some(stars), Some(author)) = (shelf.rating_of(book), book.primary_author())
                && stars >= LIKED_RATING
            {
                add(author, stars);
            }
        }
        seeds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Vec<Book>, Shelf, AuthorMatcher) {
        let matcher = AuthorMatcher::default();
        let library = vec![
            Book::new("Kindred", "Octavia E. Butler"),
            Book::new("Dune", "Frank Herbert"),
        ];
        let mut shelf = Shelf::new();
        shelf.rate(&library[0], 5).unwrap();
        shelf.rate(&library[1], 2).unwrap();
        shelf.add_author("ann leckie", &matcher);
        (library, shelf, matcher)
    }

    #[test]
    fn ranks_liked_authors_above_favorites() {
        let (library, shelf, matcher) = setup();
        let candidates = vec![
            Book::new("Provenance", "Ann Leckie"),
            Book::new("Dawn", "octavia e. butler"),
            Book::new("Dune Messiah", "Frank Herbert"),
            Book::new("Piranesi", "Susanna Clarke"),
        ];

        let picks = Recommender::new(matcher).recommend(&library, &candidates, &shelf, 10);
        let titles: Vec<_> = picks.iter().map(|p| p.book.title.as_str()).collect();
        assert_eq!(titles, vec!["Dawn", "Provenance"]);
        assert_eq!(picks[0].score, 5);
        assert_eq!(picks[0].matched_author, "Octavia E. Butler");
        assert_eq!(picks[1].score, FAVORITE_WEIGHT);
    }

    #[test]
    fn skips_owned_categorized_and_repeated_books() {
        let (library, mut shelf, matcher) = setup();
        let want = Book::new("Ancillary Sword", "Ann Leckie");
        shelf.set_status(&want, crate::models::ShelfStatus::Want);

        let candidates = vec![
            Book::new("KINDRED", "Octavia E. Butler"),
            want,
            Book::new("Provenance", "Ann Leckie"),
            Book::new("provenance", "ann leckie"),
        ];

        let picks = Recommender::new(matcher).recommend(&library, &candidates, &shelf, 10);
        assert_eq!(picks.len(), 1);
        assert_eq!(picks[0].book.title, "Provenance");
    }

    #[test]
    fn respects_limit_and_empty_seeds() {
        let (library, shelf, matcher) = setup();
        let candidates = vec![
            Book::new("Dawn", "Octavia E. Butler"),
            Book::new("Imago", "Octavia E. Butler"),
        ];
        let recommender = Recommender::new(matcher);

        assert_eq!(recommender.recommend(&library, &candidates, &shelf, 1).len(), 1);
        assert!(
            recommender
                .recommend(&[], &candidates, &Shelf::new(), 5)
                .is_empty()
        );
    }
}
