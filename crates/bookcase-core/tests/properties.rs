use std::collections::HashSet;

use bookcase_core::{Book, deduplicate, names_match, normalize};

const NAMES: &[&str] = &[
    "",
    "   ",
    "o'farrell",
    "O'FARRELL",
    "steven king",
    "Stephen King",
    "stephen king jr.",
    "j.k. rowling",
    "J K Rowling",
    "jk rowling",
    "george r.r. martin",
    "  ursula   le guinn ",
    "ann leckie",
    "Ann Patchett",
    "mary-kate o’neil",
    "élodie durand",
    "İlhan",
    "ß",
    "Frank Herbert, Jr",
    "tolkien",
];

fn edition(title: &str, author: &str, language: &str, date: Option<&str>) -> Book {
    let mut book = Book::new(title, author);
    book.language = language.to_string();
    book.published_date = date.map(ToOwned::to_owned);
    book
}

fn distinct_keys(books: &[Book]) -> usize {
    books
        .iter()
        .map(|b| b.identity_key().unwrap())
        .collect::<HashSet<_>>()
        .len()
}

#[test]
fn normalize_is_idempotent() {
    for name in NAMES {
        let once = normalize(name);
        assert_eq!(normalize(&once), once, "input {name:?}");
    }
}

#[test]
fn normalize_examples() {
    assert_eq!(normalize("o'farrell"), "O'Farrell");
    assert_eq!(normalize("steven king"), "Stephen King");
    assert_eq!(normalize(""), "");
}

#[test]
fn names_match_is_symmetric() {
    for a in NAMES {
        for b in NAMES {
            assert_eq!(names_match(a, b), names_match(b, a), "{a:?} vs {b:?}");
        }
    }
}

#[test]
fn names_match_examples() {
    assert!(names_match("Stephen King Jr.", "Stephen King"));
    assert!(names_match("Stephen King", "Steven King"));
    assert!(!names_match("Ann Leckie", "Ann Patchett"));
}

#[test]
fn deduplicate_is_idempotent_and_never_adds_keys() {
    let input = vec![
        edition("Dune", "Frank Herbert", "en", Some("1965")),
        edition("Kindred", "Octavia E. Butler", "en", Some("1979")),
        edition("dune", "frank herbert", "de", Some("1967")),
        edition("KINDRED", "octavia e. butler", "fr", None),
        edition("Piranesi", "Susanna Clarke", "en", Some("2020")),
    ];

    let once = deduplicate(&input, "US").unwrap();
    let twice = deduplicate(&once, "US").unwrap();
    assert_eq!(twice, once);
    assert!(distinct_keys(&once) <= distinct_keys(&input));
    assert_eq!(once.len(), distinct_keys(&input));
}

#[test]
fn language_beats_description() {
    let mut french = edition("Le Petit Prince", "Antoine de Saint-Exupéry", "fr", None);
    french.description = String::new();
    let mut english = edition("le petit prince", "antoine de saint-exupéry", "en", None);
    english.description = "A pilot meets a prince.".into();

    let out = deduplicate(&[french, english.clone()], "US").unwrap();
    assert_eq!(out, vec![english]);
}

#[test]
fn earlier_publication_wins() {
    let later = edition("Cryptonomicon", "Neal Stephenson", "en", Some("2015-06-01"));
    let earlier = edition("Cryptonomicon", "Neal Stephenson", "en", Some("1999-01-01"));

    let out = deduplicate(&[later, earlier.clone()], "US").unwrap();
    assert_eq!(out, vec![earlier]);
}

#[test]
fn dune_end_to_end() {
    let english = edition("Dune", "Frank Herbert", "en", Some("1965"));
    let german = edition("dune", "frank herbert", "de", Some("1965"));

    let out = deduplicate(&[english.clone(), german], "US").unwrap();
    assert_eq!(out, vec![english]);
}
