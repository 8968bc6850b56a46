use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use bookcase_core::{
    AppConfig, AuthorVerification, Book, CatalogRecord, ExportFormat, Recommender, Shelf,
    ShelfStatus,
};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bookcase",
    about = "Author matching and edition deduplication for a personal bookcase",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format. Also enabled by setting BOOKCASE_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the canonical form of author names.
    Normalize {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Check whether two author names refer to the same author.
    Match { a: String, b: String },

    /// Collapse editions of the same book into one record.
    Dedup {
        /// JSON file with a list of books.
        input: PathBuf,
        /// Region the language preference is derived from.
        #[arg(long)]
        region: Option<String>,
        /// Input is a raw volumes search response.
        #[arg(long)]
        volumes: bool,
    },

    /// Check an author name against catalog records.
    Verify {
        author: String,
        input: PathBuf,
        #[arg(long)]
        volumes: bool,
    },

    /// Suggest books by liked and favorite authors.
    Recommend {
        library: PathBuf,
        candidates: PathBuf,
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Favorite authors, statuses and ratings.
    Shelf {
        #[command(subcommand)]
        action: ShelfAction,
    },

    /// Export books with their shelf state.
    Export {
        input: PathBuf,
        #[arg(long)]
        format: Option<String>,
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

// ─── Shelf Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ShelfAction {
    /// Favorite author management.
    Author {
        #[command(subcommand)]
        action: AuthorAction,
    },
    /// Set a book's status: read, want, pass, or clear.
    Status {
        title: String,
        author: String,
        status: String,
    },
    /// Rate a book from 1 to 5 stars; 0 clears the rating.
    Rate {
        title: String,
        author: String,
        stars: u8,
    },
}

#[derive(Subcommand)]
enum AuthorAction {
    Add { name: String },
    Remove { name: String },
    List,
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the config file path.
    Path,
}

// ─── Main ────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bookcase=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let start = Instant::now();
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("BOOKCASE_JSON").as_deref() == Ok("1");

    let config_path = AppConfig::config_path();
    let config = AppConfig::load_from(&config_path).context("failed to load config")?;
    tracing::debug!(path = %config_path.display(), "config loaded");
    let matcher = config.matcher();

    match cli.command {
        Commands::Normalize { names } => {
            let normalized: Vec<String> = names
                .iter()
                .map(|name| matcher.normalizer().normalize(name))
                .collect();

            if json_output {
                let items: Vec<_> = names
                    .iter()
                    .zip(&normalized)
                    .map(|(raw, canonical)| {
                        serde_json::json!({ "input": raw, "normalized": canonical })
                    })
                    .collect();
                print_ok(serde_json::json!({ "items": items }), &start)?;
            } else {
                for name in &normalized {
                    println!("{name}");
                }
            }
        }

        Commands::Match { a, b } => {
            let matched = matcher.matches(&a, &b);
            if json_output {
                print_ok(serde_json::json!({ "a": a, "b": b, "match": matched }), &start)?;
            } else if matched {
                println!(
                    "match: {} = {}",
                    matcher.normalizer().normalize(&a),
                    matcher.normalizer().normalize(&b)
                );
            } else {
                println!("no match");
            }
        }

        Commands::Dedup {
            input,
            region,
            volumes,
        } => {
            let books = load_books(&input, volumes, &config)?;
            let region = region.unwrap_or_else(|| config.dedup.region.clone());
            let outcome = config
                .deduplicator()?
                .deduplicate_with_report(&books, &region)?;

            if json_output {
                print_ok(
                    serde_json::json!({
                        "items": outcome.books,
                        "total": outcome.books.len(),
                        "input": books.len(),
                        "groups": outcome.groups,
                    }),
                    &start,
                )?;
            } else {
                for book in &outcome.books {
                    print_book_line(book);
                }
                println!(
                    "{} books ({} editions collapsed)",
                    outcome.books.len(),
                    books.len() - outcome.books.len()
                );
            }
        }

        Commands::Verify {
            author,
            input,
            volumes,
        } => {
            let records = load_records(&input, volumes)?;
            let verdict = matcher.verify(&author, &records);

            if json_output {
                print_ok(serde_json::to_value(&verdict)?, &start)?;
            } else {
                match &verdict {
                    AuthorVerification::NotFound => println!("No author matching {author:?}"),
                    AuthorVerification::Confirmed(candidate) => println!(
                        "Confirmed: {} ({} records)",
                        candidate.name, candidate.record_count
                    ),
                    AuthorVerification::Ambiguous(candidates) => {
                        println!("Ambiguous, {} candidates:", candidates.len());
                        for candidate in candidates {
                            println!(
                                "  {:<30} {:>3} records  {}",
                                candidate.name,
                                candidate.record_count,
                                candidate.sample_titles.join("; ")
                            );
                        }
                    }
                }
            }
        }

        Commands::Recommend {
            library,
            candidates,
            limit,
        } => {
            let library = load_books(&library, false, &config)?;
            let candidates = load_books(&candidates, false, &config)?;
            let shelf = Shelf::load_from(&config.shelf_path())?;
            let picks = Recommender::new(matcher).recommend(&library, &candidates, &shelf, limit);

            if json_output {
                print_ok(
                    serde_json::json!({ "items": picks, "total": picks.len(), "limit": limit }),
                    &start,
                )?;
            } else if picks.is_empty() {
                println!("No recommendations. Add favorite authors or rate books first.");
            } else {
                for pick in &picks {
                    println!(
                        "{score}  {title:<40}  {author}",
                        score = pick.score,
                        title = pick.book.title,
                        author = pick.matched_author,
                    );
                }
            }
        }

        Commands::Shelf { action } => {
            let path = config.shelf_path();
            let mut shelf = Shelf::load_from(&path)?;

            match action {
                ShelfAction::Author { action } => match action {
                    AuthorAction::Add { name } => {
                        let added = shelf.add_author(&name, &matcher);
                        shelf.save_to(&path)?;
                        if json_output {
                            print_ok(
                                serde_json::json!({
                                    "added": added,
                                    "favoriteAuthors": shelf.favorite_authors,
                                }),
                                &start,
                            )?;
                        } else if added {
                            println!("Added: {}", matcher.normalizer().normalize(&name));
                        } else {
                            println!("Already a favorite: {name}");
                        }
                    }
                    AuthorAction::Remove { name } => {
                        let removed = shelf.remove_author(&name, &matcher);
                        shelf.save_to(&path)?;
                        if json_output {
                            print_ok(
                                serde_json::json!({
                                    "removed": removed,
                                    "favoriteAuthors": shelf.favorite_authors,
                                }),
                                &start,
                            )?;
                        } else {
                            println!("Removed {removed} author(s)");
                        }
                    }
                    AuthorAction::List => {
                        if json_output {
                            print_ok(
                                serde_json::json!({ "items": shelf.favorite_authors }),
                                &start,
                            )?;
                        } else if shelf.favorite_authors.is_empty() {
                            println!("No favorite authors.");
                        } else {
                            for name in &shelf.favorite_authors {
                                println!("{name}");
                            }
                        }
                    }
                },

                ShelfAction::Status {
                    title,
                    author,
                    status,
                } => {
                    let book = Book::new(title, author);
                    let status = match status.trim().to_ascii_lowercase().as_str() {
                        "clear" | "none" => {
                            shelf.clear_status(&book);
                            None
                        }
                        other => {
                            let status: ShelfStatus = other.parse()?;
                            shelf.set_status(&book, status);
                            Some(status)
                        }
                    };
                    shelf.save_to(&path)?;

                    if json_output {
                        print_ok(
                            serde_json::json!({
                                "key": book.status_key(),
                                "status": status,
                                "counts": shelf.counts(),
                            }),
                            &start,
                        )?;
                    } else {
                        match status {
                            Some(status) => println!("{}: {status}", book.title),
                            None => println!("{}: cleared", book.title),
                        }
                    }
                }

                ShelfAction::Rate {
                    title,
                    author,
                    stars,
                } => {
                    let book = Book::new(title, author);
                    if stars == 0 {
                        shelf.clear_rating(&book);
                    } else {
                        shelf.rate(&book, stars)?;
                    }
                    shelf.save_to(&path)?;

                    if json_output {
                        print_ok(
                            serde_json::json!({
                                "key": book.status_key(),
                                "rating": shelf.rating_of(&book),
                            }),
                            &start,
                        )?;
                    } else if stars == 0 {
                        println!("{}: rating cleared", book.title);
                    } else {
                        println!("{}: {stars}/5", book.title);
                    }
                }
            }
        }

        Commands::Export {
            input,
            format,
            output,
        } => {
            let books = load_books(&input, false, &config)?;
            let shelf = Shelf::load_from(&config.shelf_path())?;
            let format = match format {
                Some(name) => name.parse::<ExportFormat>()?,
                None => config.export.format,
            };
            let rendered = bookcase_core::export(&books, &shelf, format)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, &rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    if json_output {
                        print_ok(
                            serde_json::json!({
                                "path": path,
                                "format": format,
                                "total": books.len(),
                            }),
                            &start,
                        )?;
                    } else {
                        println!("Exported {} books to {}", books.len(), path.display());
                    }
                }
                None => print!("{rendered}"),
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    print_ok(serde_json::to_value(&config)?, &start)?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                let path = AppConfig::config_path();
                if json_output {
                    print_ok(serde_json::json!({ "path": path, "exists": path.exists() }), &start)?;
                } else {
                    println!("{}", path.display());
                }
            }
        },
    }

    Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn print_ok(data: serde_json::Value, start: &Instant) -> Result<()> {
    print_json(&serde_json::json!({
        "status": "ok",
        "data": data,
        "meta": { "duration_ms": start.elapsed().as_millis() }
    }))
}

fn print_book_line(book: &Book) {
    println!(
        "{title:<40}  {author:<25}  {date:<10}  {lang}",
        title = book.title,
        author = book.primary_author().unwrap_or("-"),
        date = book.published_date.as_deref().unwrap_or(""),
        lang = book.language,
    );
}

fn read_json(path: &Path) -> Result<serde_json::Value> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Books from a JSON list, or from a volumes response run through the
/// configured record filter.
fn load_books(path: &Path, volumes: bool, config: &AppConfig) -> Result<Vec<Book>> {
    let value = read_json(path)?;
    if volumes {
        let records = CatalogRecord::from_volumes_response(&value);
        return Ok(config.record_filter().prepare(&records));
    }
    Ok(serde_json::from_value(value)?)
}

fn load_records(path: &Path, volumes: bool) -> Result<Vec<CatalogRecord>> {
    let value = read_json(path)?;
    if volumes {
        return Ok(CatalogRecord::from_volumes_response(&value));
    }
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_is_global() {
        let cli = Cli::try_parse_from(["bookcase", "match", "a", "b", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Match { .. }));
    }

    #[test]
    fn shelf_rate_parses_stars() {
        let cli =
            Cli::try_parse_from(["bookcase", "shelf", "rate", "Dune", "Frank Herbert", "4"])
                .unwrap();
        match cli.command {
            Commands::Shelf {
                action: ShelfAction::Rate { stars, .. },
            } => assert_eq!(stars, 4),
            _ => panic!("expected shelf rate"),
        }
    }

    #[test]
    fn normalize_requires_a_name() {
        assert!(Cli::try_parse_from(["bookcase", "normalize"]).is_err());
    }
}
