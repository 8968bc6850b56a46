use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::Isbn;

pub const DEFAULT_LANGUAGE: &str = "en";

/// One raw result from the books catalog. Never mutated; converted into a
/// [`Book`](super::Book) once it passes upstream filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    /// Catalog-assigned, not stable across queries or editions.
    #[serde(default)]
    pub id: String,

    #[serde(default)]
    pub title: String,

    /// Ordered; the first entry is the primary author.
    #[serde(default)]
    pub author_names: Vec<String>,

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

pub(crate) fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for CatalogRecord {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            author_names: Vec::new(),
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
}

impl CatalogRecord {
    pub fn primary_author(&self) -> Option<&str> {
        self.author_names
            .first()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
    }

    /// Build a record from one catalog volume (`{ "id", "volumeInfo": {...} }`).
    pub fn from_volume_json(v: &Value) -> Self {
        let id = v
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let info = v.get("volumeInfo").unwrap_or(v);

        let str_field = |key: &str| {
            info.get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToOwned::to_owned)
        };
        let str_list = |key: &str| {
            info.get(key)
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(ToOwned::to_owned)
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };

        let thumbnail_url = info
            .get("imageLinks")
            .and_then(Value::as_object)
            .and_then(|links| links.get("thumbnail").or_else(|| links.get("smallThumbnail")))
            .and_then(Value::as_str)
            .map(ToOwned::to_owned);

        let mut isbn13 = None;
        let mut isbn10 = None;
        if let Some(ids) = info.get("industryIdentifiers").and_then(Value::as_array) {
            for entry in ids {
                let Some(raw) = entry.get("identifier").and_then(Value::as_str) else {
                    continue;
                };
                match Isbn::parse(raw) {
                    Ok(parsed) => {
                        isbn13.get_or_insert(parsed.isbn13);
                        if let Some(ten) = parsed.isbn10 {
                            isbn10.get_or_insert(ten);
                        }
                    }
                    Err(_) => tracing::debug!(id = %id, raw, "dropping invalid ISBN"),
                }
            }
        }

        let page_count = info
            .get("pageCount")
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0);

        Self {
            title: str_field("title").unwrap_or_default(),
            author_names: str_list("authors"),
            published_date: str_field("publishedDate"),
            description: str_field("description").unwrap_or_default(),
            language: str_field("language").unwrap_or_else(default_language),
            page_count,
            categories: str_list("categories"),
            thumbnail_url,
            isbn13,
            isbn10,
            id,
        }
    }

    /// Accept either a search response (`{ "items": [...] }`) or a bare
    /// array of volumes. Anything else yields no records.
    pub fn from_volumes_response(v: &Value) -> Vec<Self> {
        let items: &[Value] = match v {
            Value::Array(items) => items.as_slice(),
            Value::Object(_) => v
                .get("items")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            _ => &[],
        };
        items.iter().map(Self::from_volume_json).collect()
    }
}
