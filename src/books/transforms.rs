//! Page-specific pure functions applied to a fetched collection.

use std::cmp::Reverse;

use rand::seq::SliceRandom;
use rand::Rng;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use super::models::Book;

/// How many books the storefront features.
pub const FEATURED_COUNT: usize = 3;

/// How many books the "new arrivals" strip shows.
pub const NEWEST_COUNT: usize = 5;

/// Random sample of up to [`FEATURED_COUNT`] distinct books.
pub fn featured<R: Rng + ?Sized>(mut books: Vec<Book>, rng: &mut R) -> Vec<Book> {
    books.shuffle(rng);
    books.truncate(FEATURED_COUNT);
    books
}

/// Newest [`NEWEST_COUNT`] books by `created_at`, newest first.
///
/// Missing or unparseable timestamps count as the Unix epoch. Books with
/// equal timestamps keep their input order.
pub fn newest(mut books: Vec<Book>) -> Vec<Book> {
    books.sort_by_cached_key(|book| Reverse(created_at(book)));
    books.truncate(NEWEST_COUNT);
    books
}

/// Parsed creation time, falling back to the epoch.
pub fn created_at(book: &Book) -> OffsetDateTime {
    book.created_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .ok()
        .map(|date| date.midnight().assume_utc())
}
