use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dedup::{DEFAULT_TIE_BREAKS, DedupPolicy, Deduplicator, TieBreak};
use crate::error::Result;
use crate::export::ExportFormat;
use crate::filter::{DEFAULT_PLACEHOLDER_AUTHORS, DEFAULT_RERELEASE_KEYWORDS, RecordFilter};
use crate::names::{AuthorMatcher, BUILTIN_TABLE_VERSION, CorrectionTable, NameNormalizer};

/// Root configuration, loaded from `~/.config/bookcase/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub names: NamesConfig,
    pub dedup: DedupConfig,
    pub filter: FilterConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub data_dir: String,
    pub shelf_file: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamesConfig {
    pub use_builtin_corrections: bool,
    /// Extra misspelling to canonical spelling pairs, applied on top of the
    /// built-in table.
    pub corrections: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub region: String,
    pub tie_breaks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub placeholder_authors: Vec<String>,
    pub rerelease_keywords: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub format: ExportFormat,
}

// ─── Defaults ──────────────────────────────────────────────

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("bookcase");

        Self {
            data_dir: data_dir.to_string_lossy().to_string(),
            shelf_file: "shelf.json".to_string(),
        }
    }
}

impl Default for NamesConfig {
    fn default() -> Self {
        Self {
            use_builtin_corrections: true,
            corrections: BTreeMap::new(),
        }
    }
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            region: "US".to_string(),
            tie_breaks: DEFAULT_TIE_BREAKS
                .iter()
                .map(|tb| tie_break_name(*tb).to_string())
                .collect(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            placeholder_authors: DEFAULT_PLACEHOLDER_AUTHORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            rerelease_keywords: DEFAULT_RERELEASE_KEYWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

fn tie_break_name(tie_break: TieBreak) -> &'static str {
    match tie_break {
        TieBreak::Language => "language",
        TieBreak::Description => "description",
        TieBreak::Thumbnail => "thumbnail",
        TieBreak::PublishedDate => "published_date",
    }
}

// ─── Load / Save ───────────────────────────────────────────

impl AppConfig {
    /// Standard config file path; `BOOKCASE_CONFIG` overrides it.
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("BOOKCASE_CONFIG") {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("bookcase")
            .join("config.toml")
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        Self::load_from(&path)
    }

    /// Missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let toml_str = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    // ─── Derived components ────────────────────────────────

    pub fn shelf_path(&self) -> PathBuf {
        PathBuf::from(&self.core.data_dir).join(&self.core.shelf_file)
    }

    pub fn correction_table(&self) -> CorrectionTable {
        let mut table = if self.names.use_builtin_corrections {
            CorrectionTable::builtin()
        } else {
            CorrectionTable::empty(BUILTIN_TABLE_VERSION)
        };
        table.extend(
            self.names
                .corrections
                .iter()
                .map(|(misspelling, canonical)| (misspelling.as_str(), canonical.as_str())),
        );
        table
    }

    pub fn matcher(&self) -> AuthorMatcher {
        AuthorMatcher::new(NameNormalizer::new(self.correction_table()))
    }

    /// Fails on an unknown criterion name. An empty list falls back to the
    /// default order.
    pub fn dedup_policy(&self) -> Result<DedupPolicy> {
        if self.dedup.tie_breaks.is_empty() {
            tracing::warn!("dedup.tie_breaks is empty, using the default order");
            return Ok(DedupPolicy::default());
        }

        let order = self
            .dedup
            .tie_breaks
            .iter()
            .map(|name| name.parse::<TieBreak>())
            .collect::<Result<Vec<_>>>()?;
        Ok(DedupPolicy::new(order))
    }

    pub fn deduplicator(&self) -> Result<Deduplicator> {
        Ok(Deduplicator::new(self.dedup_policy()?))
    }

    pub fn record_filter(&self) -> RecordFilter {
        RecordFilter::new(
            self.filter.placeholder_authors.iter().map(String::as_str),
            self.filter.rerelease_keywords.iter().map(String::as_str),
            self.matcher(),
        )
    }
}
