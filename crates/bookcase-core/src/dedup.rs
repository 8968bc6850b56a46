use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{BookcaseError, Result};
use crate::models::{Book, DEFAULT_LANGUAGE, IdentityKey};

/// One axis of the survivor choice between two editions sharing a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Language matches the one implied by the user's region.
    Language,
    /// Non-empty description.
    Description,
    /// Cover thumbnail present.
    Thumbnail,
    /// Earlier publication; missing or unparseable dates count as latest.
    PublishedDate,
}

impl std::str::FromStr for TieBreak {
    type Err = BookcaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "language" => Ok(Self::Language),
            "description" => Ok(Self::Description),
            "thumbnail" => Ok(Self::Thumbnail),
            "published_date" | "date" => Ok(Self::PublishedDate),
            _ => Err(BookcaseError::UnknownTieBreak(s.to_string())),
        }
    }
}

pub const DEFAULT_TIE_BREAKS: [TieBreak; 4] = [
    TieBreak::Language,
    TieBreak::Description,
    TieBreak::Thumbnail,
    TieBreak::PublishedDate,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Preference {
    Survivor,
    Newcomer,
    Tie,
}

impl Preference {
    fn from_flags(survivor: bool, newcomer: bool) -> Self {
        match (survivor, newcomer) {
            (true, false) => Self::Survivor,
            (false, true) => Self::Newcomer,
            _ => Self::Tie,
        }
    }
}

impl TieBreak {
    fn compare(self, survivor: &Book, newcomer: &Book, language: &str) -> Preference {
        match self {
            Self::Language => Preference::from_flags(
                language_matches(&survivor.language, language),
                language_matches(&newcomer.language, language),
            ),
            Self::Description => Preference::from_flags(
                !survivor.description.trim().is_empty(),
                !newcomer.description.trim().is_empty(),
            ),
            Self::Thumbnail => Preference::from_flags(
                has_thumbnail(survivor),
                has_thumbnail(newcomer),
            ),
            Self::PublishedDate => match (survivor.published_on(), newcomer.published_on()) {
                (Some(old), Some(new)) if new < old => Preference::Newcomer,
                (Some(old), Some(new)) if old < new => Preference::Survivor,
                (None, Some(_)) => Preference::Newcomer,
                (Some(_), None) => Preference::Survivor,
                _ => Preference::Tie,
            },
        }
    }
}

/// Ordered tie-break criteria. The first criterion on which two editions
/// differ decides; a full tie keeps the first-seen record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupPolicy {
    tie_breaks: Vec<TieBreak>,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            tie_breaks: DEFAULT_TIE_BREAKS.to_vec(),
        }
    }
}

impl DedupPolicy {
    /// Repeated criteria are kept once, at their first position.
    pub fn new(order: impl IntoIterator<Item = TieBreak>) -> Self {
        let mut tie_breaks = Vec::new();
        for criterion in order {
            if !tie_breaks.contains(&criterion) {
                tie_breaks.push(criterion);
            }
        }
        Self { tie_breaks }
    }

    pub fn tie_breaks(&self) -> &[TieBreak] {
        &self.tie_breaks
    }

    fn prefers_newcomer(&self, survivor: &Book, newcomer: &Book, language: &str) -> bool {
        for criterion in &self.tie_breaks {
            match criterion.compare(survivor, newcomer, language) {
                Preference::Survivor => return false,
                Preference::Newcomer => return true,
                Preference::Tie => {}
            }
        }
        false
    }
}

/// Records that collapsed onto one identity key. Indexes point into the
/// deduplicated input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateGroup {
    pub key: IdentityKey,
    pub survivor: usize,
    pub discarded: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupOutcome {
    pub books: Vec<Book>,
    pub groups: Vec<DuplicateGroup>,
}

struct Slot {
    key: IdentityKey,
    survivor: usize,
    members: Vec<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Deduplicator {
    policy: DedupPolicy,
}

impl Deduplicator {
    pub fn new(policy: DedupPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &DedupPolicy {
        &self.policy
    }

    /// Collapse editions of the same work to one survivor per identity key,
    /// in first-seen key order.
    pub fn deduplicate(&self, records: &[Book], user_region: &str) -> Result<Vec<Book>> {
        Ok(self.deduplicate_with_report(records, user_region)?.books)
    }

    pub fn deduplicate_with_report(
        &self,
        records: &[Book],
        user_region: &str,
    ) -> Result<DedupOutcome> {
        let language = region_language(user_region);
        let mut slots: Vec<Slot> = Vec::new();
        let mut by_key: HashMap<IdentityKey, usize> = HashMap::new();

        for (idx, record) in records.iter().enumerate() {
            let key = record.identity_key()?;

            if let Some(&slot_idx) = by_key.get(&key) {
                let slot = &mut slots[slot_idx];
                slot.members.push(idx);
                if self
                    .policy
                    .prefers_newcomer(&records[slot.survivor], record, language)
                {
                    tracing::debug!(
                        key = %slot.key,
                        replaced = slot.survivor,
                        by = idx,
                        "replacing duplicate survivor"
                    );
                    slot.survivor = idx;
                }
            } else {
                by_key.insert(key.clone(), slots.len());
                slots.push(Slot {
                    key,
                    survivor: idx,
                    members: vec![idx],
                });
            }
        }

        let books: Vec<Book> = slots
            .iter()
            .map(|slot| records[slot.survivor].clone())
            .collect();

        let groups: Vec<DuplicateGroup> = slots
            .into_iter()
            .filter(|slot| slot.members.len() > 1)
            .map(|slot| DuplicateGroup {
                discarded: slot
                    .members
                    .iter()
                    .copied()
                    .filter(|idx| *idx != slot.survivor)
                    .collect(),
                survivor: slot.survivor,
                key: slot.key,
            })
            .collect();

        tracing::info!(
            input = records.len(),
            output = books.len(),
            groups = groups.len(),
            language,
            "deduplicated books"
        );

        Ok(DedupOutcome { books, groups })
    }
}

/// Deduplicate with the default tie-break order.
pub fn deduplicate(records: &[Book], user_region: &str) -> Result<Vec<Book>> {
    Deduplicator::default().deduplicate(records, user_region)
}

/// Default reading language for a region code. Accepts `US`, `gb`,
/// `en-US`, `pt_BR`; unknown or empty regions mean English.
pub fn region_language(region: &str) -> &'static str {
    let region = region.trim();
    let code = region
        .rsplit(['-', '_'])
        .next()
        .unwrap_or(region)
        .to_ascii_uppercase();

    match code.as_str() {
        "FR" => "fr",
        "DE" | "AT" => "de",
        "ES" | "MX" | "AR" | "CO" | "CL" | "PE" => "es",
        "IT" => "it",
        "PT" | "BR" => "pt",
        "NL" => "nl",
        "SE" => "sv",
        "DK" => "da",
        "FI" => "fi",
        "PL" => "pl",
        "RU" => "ru",
        "JP" => "ja",
        "CN" | "TW" => "zh",
        "KR" => "ko",
        _ => DEFAULT_LANGUAGE,
    }
}

/// Compare on the primary language subtag; a blank language counts as the
/// catalog default.
fn language_matches(record_language: &str, preferred: &str) -> bool {
    let trimmed = record_language.trim();
    let primary = trimmed
        .split(['-', '_'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_LANGUAGE);
    primary.eq_ignore_ascii_case(preferred)
}

fn has_thumbnail(book: &Book) -> bool {
    book.thumbnail_url
        .as_deref()
        .is_some_and(|url| !url.trim().is_empty())
}
