use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BookcaseError, Result};
use crate::models::{Book, Shelf, ShelfStatus};

const CSV_HEADER: [&str; 7] = [
    "title",
    "author",
    "published_date",
    "language",
    "status",
    "rating",
    "isbn13",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = BookcaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            _ => Err(BookcaseError::UnknownExportFormat(s.to_string())),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportDocument<'a> {
    exported_at: DateTime<Utc>,
    favorite_authors: &'a [String],
    books: Vec<ExportedBook<'a>>,
}

#[derive(Serialize)]
struct ExportedBook<'a> {
    #[serde(flatten)]
    book: &'a Book,
    status: Option<ShelfStatus>,
    rating: Option<u8>,
}

/// Render the collection together with the shelf state.
pub fn export(books: &[Book], shelf: &Shelf, format: ExportFormat) -> Result<String> {
    export_at(books, shelf, format, Utc::now())
}

/// Same as [`export`] with a fixed export timestamp.
pub fn export_at(
    books: &[Book],
    shelf: &Shelf,
    format: ExportFormat,
    exported_at: DateTime<Utc>,
) -> Result<String> {
    let out = match format {
        ExportFormat::Json => to_json(books, shelf, exported_at)?,
        ExportFormat::Csv => to_csv(books, shelf)?,
    };
    tracing::info!(books = books.len(), %format, "exported collection");
    Ok(out)
}

fn to_json(books: &[Book], shelf: &Shelf, exported_at: DateTime<Utc>) -> Result<String> {
    let document = ExportDocument {
        exported_at,
        favorite_authors: &shelf.favorite_authors,
        books: books
            .iter()
            .map(|book| ExportedBook {
                book,
                status: shelf.status_of(book),
                rating: shelf.rating_of(book),
            })
            .collect(),
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

fn to_csv(books: &[Book], shelf: &Shelf) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for book in books {
        let status = shelf.status_of(book).map(|s| s.to_string());
        let rating = shelf.rating_of(book).map(|r| r.to_string());
        writer.write_record([
            book.title.as_str(),
            book.primary_author().unwrap_or_default(),
            book.published_date.as_deref().unwrap_or_default(),
            book.language.as_str(),
            status.as_deref().unwrap_or_default(),
            rating.as_deref().unwrap_or_default(),
            book.isbn13.as_deref().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| BookcaseError::Io(err.into_error()))?;
    String::from_utf8(bytes).map_err(|err| BookcaseError::Export(err.to_string()))
}
