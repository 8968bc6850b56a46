use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// Version of the correction table compiled into the crate.
pub const BUILTIN_TABLE_VERSION: u32 = 1;

const BUILTIN_CORRECTIONS: &[(&str, &str)] = &[
    ("Phillip Pullman", "Philip Pullman"),
    ("Steven King", "Stephen King"),
    ("J K Rowling", "J.K. Rowling"),
    ("Jk Rowling", "J.K. Rowling"),
    ("J. K. Rowling", "J.K. Rowling"),
    ("J R R Tolkien", "J.R.R. Tolkien"),
    ("Jrr Tolkien", "J.R.R. Tolkien"),
    ("J. R. R. Tolkien", "J.R.R. Tolkien"),
    ("George Rr Martin", "George R.R. Martin"),
    ("George R. R. Martin", "George R.R. Martin"),
    ("Agatha Christy", "Agatha Christie"),
    ("Margret Atwood", "Margaret Atwood"),
    ("Terry Prachett", "Terry Pratchett"),
    ("Neil Gaimen", "Neil Gaiman"),
    ("Ursula Le Guinn", "Ursula K. Le Guin"),
];

static DEFAULT_NORMALIZER: Lazy<NameNormalizer> = Lazy::new(NameNormalizer::default);

/// Misspelling → canonical author name mapping.
///
/// Keys are stored in the capitalized form produced by [`capitalize_name`],
/// which is the form the normalizer looks up. When a canonical value would
/// not survive capitalization unchanged (`J.K. Rowling` becomes
/// `J.k. Rowling`), the capitalized variant is registered as well so that
/// normalizing an already-normalized name is a no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrectionTable {
    pub version: u32,
    entries: BTreeMap<String, String>,
}

impl CorrectionTable {
    pub fn empty(version: u32) -> Self {
        Self {
            version,
            entries: BTreeMap::new(),
        }
    }

    pub fn builtin() -> Self {
        let mut table = Self::empty(BUILTIN_TABLE_VERSION);
        for (misspelling, canonical) in BUILTIN_CORRECTIONS {
            table.insert(misspelling, canonical);
        }
        table
    }

    pub fn insert(&mut self, misspelling: &str, canonical: &str) {
        let key = capitalize_name(misspelling);
        let canonical = canonical.trim();
        if key.is_empty() || canonical.is_empty() || key == canonical {
            return;
        }

        self.entries.insert(key, canonical.to_string());

        let capitalized = capitalize_name(canonical);
        if capitalized != canonical {
            self.entries
                .entry(capitalized)
                .or_insert_with(|| canonical.to_string());
        }
    }

    pub fn extend<'a, I>(&mut self, corrections: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (misspelling, canonical) in corrections {
            self.insert(misspelling, canonical);
        }
    }

    /// Exact, case-sensitive lookup. A correction whose capitalized value is
    /// itself a key is followed to the end of the chain; a chain that loops
    /// resolves to the smallest value on the loop.
    pub fn lookup(&self, capitalized: &str) -> Option<&str> {
        let mut chain: Vec<&str> = vec![self.entries.get(capitalized)?.as_str()];
        loop {
            let current = *chain.last()?;
            let Some(next) = self.entries.get(&capitalize_name(current)) else {
                return Some(current);
            };
            if next == current {
                return Some(current);
            }
            if let Some(pos) = chain.iter().position(|seen| *seen == next) {
                return chain[pos..].iter().copied().min();
            }
            chain.push(next.as_str());
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CorrectionTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Canonicalizes free-text author names against a [`CorrectionTable`].
#[derive(Debug, Clone, Default)]
pub struct NameNormalizer {
    table: CorrectionTable,
}

impl NameNormalizer {
    pub fn new(table: CorrectionTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &CorrectionTable {
        &self.table
    }

    pub fn normalize(&self, raw: &str) -> String {
        let capitalized = capitalize_name(raw);
        match self.table.lookup(&capitalized) {
            Some(canonical) => canonical.to_string(),
            None => capitalized,
        }
    }
}

/// Normalizer backed by the built-in correction table.
pub fn default_normalizer() -> &'static NameNormalizer {
    &DEFAULT_NORMALIZER
}

/// Normalize with the built-in correction table.
pub fn normalize(raw: &str) -> String {
    DEFAULT_NORMALIZER.normalize(raw)
}

/// Trim, then capitalize every space-separated word. Apostrophes split a
/// word into independently capitalized parts (`o'farrell` → `O'Farrell`).
pub fn capitalize_name(raw: &str) -> String {
    raw.trim()
        .split(' ')
        .map(capitalize_word)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize_word(word: &str) -> String {
    word.split_inclusive(is_apostrophe)
        .map(capitalize_part)
        .collect()
}

fn capitalize_part(part: &str) -> String {
    let mut chars = part.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    let mut upper = first.to_uppercase();
    // Multi-char uppercase mappings (ß → SS) would not be stable under a
    // second pass, so those leave the first letter alone.
    let head = match (upper.next(), upper.next()) {
        (Some(single), None) => single,
        _ => first,
    };

    let mut out = String::with_capacity(part.len());
    out.push(head);
    out.push_str(&chars.as_str().to_lowercase());
    out
}

fn is_apostrophe(c: char) -> bool {
    c == '\'' || c == '\u{2019}'
}
