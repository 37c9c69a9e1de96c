//! Form input for creating and editing books, with field-level validation.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use super::models::{Book, NewBook};

/// Categories offered by the add form.
pub const CATEGORIES: &[&str] = &["Fiction", "Comics", "Academic", "Psychology", "Sports"];

/// Editable fields of a book form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Title,
    Author,
    Isbn,
    Year,
    Price,
    Category,
    Pages,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Title,
        Field::Author,
        Field::Isbn,
        Field::Year,
        Field::Price,
        Field::Category,
        Field::Pages,
    ];

    /// Wire and form name.
    pub const fn name(self) -> &'static str {
        match self {
            Field::Title => "title",
            Field::Author => "author",
            Field::Isbn => "isbn",
            Field::Year => "year",
            Field::Price => "price",
            Field::Category => "category",
            Field::Pages => "pages",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Field::Title => "Title",
            Field::Author => "Author",
            Field::Isbn => "ISBN",
            Field::Year => "Publication year",
            Field::Price => "Price (THB)",
            Field::Category => "Category",
            Field::Pages => "Pages",
        }
    }

    const fn missing_message(self) -> &'static str {
        match self {
            Field::Title => "Please enter the book title",
            Field::Author => "Please enter the author",
            Field::Isbn => "Please enter the ISBN",
            Field::Year => "Please enter the publication year",
            Field::Price => "Please enter the price",
            Field::Category => "Please choose a category",
            Field::Pages => "Please enter the number of pages",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("unknown book field '{0}'")]
pub struct UnknownFieldError(String);

impl FromStr for Field {
    type Err = UnknownFieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| UnknownFieldError(s.to_string()))
    }
}

/// One message per offending field.
pub type FieldErrors = BTreeMap<Field, String>;

/// Raw form input, kept as typed text until submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub year: String,
    pub price: String,
    pub category: String,
    pub pages: String,
}

impl BookDraft {
    /// Prefill from an existing record.
    pub fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
            year: book.year.to_string(),
            price: book.price.to_string(),
            category: book.category.clone().unwrap_or_default(),
            pages: book.pages.map(|p| p.to_string()).unwrap_or_default(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Author => &self.author,
            Field::Isbn => &self.isbn,
            Field::Year => &self.year,
            Field::Price => &self.price,
            Field::Category => &self.category,
            Field::Pages => &self.pages,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Title => &mut self.title,
            Field::Author => &mut self.author,
            Field::Isbn => &mut self.isbn,
            Field::Year => &mut self.year,
            Field::Price => &mut self.price,
            Field::Category => &mut self.category,
            Field::Pages => &mut self.pages,
        };
        *slot = value.into();
    }

    /// Validate for a create request. Every field is required.
    pub fn validate(&self) -> Result<NewBook, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required_text(self, Field::Title, &mut errors);
        let author = required_text(self, Field::Author, &mut errors);
        let isbn = required_text(self, Field::Isbn, &mut errors);
        let year = required_number::<i32>(self, Field::Year, &mut errors);
        let price = required_price(self, &mut errors);
        let category = required_text(self, Field::Category, &mut errors);
        let pages = required_number::<u32>(self, Field::Pages, &mut errors);

        match (title, author, isbn, year, price, category, pages) {
            (Some(title), Some(author), Some(isbn), Some(year), Some(price), Some(category), Some(pages))
                if errors.is_empty() =>
            {
                Ok(NewBook {
                    title,
                    author,
                    isbn,
                    year,
                    price,
                    category,
                    pages,
                })
            }
            _ => Err(errors),
        }
    }

    /// Validate edits to `original`. Category and page count stay optional
    /// because older records may not have them.
    pub fn apply_to(&self, original: &Book) -> Result<Book, FieldErrors> {
        let mut errors = FieldErrors::new();

        let title = required_text(self, Field::Title, &mut errors);
        let author = required_text(self, Field::Author, &mut errors);
        let isbn = required_text(self, Field::Isbn, &mut errors);
        let year = required_number::<i32>(self, Field::Year, &mut errors);
        let price = required_price(self, &mut errors);
        let category = optional_text(self, Field::Category);
        let pages = optional_number::<u32>(self, Field::Pages, &mut errors);

        match (title, author, isbn, year, price) {
            (Some(title), Some(author), Some(isbn), Some(year), Some(price)) if errors.is_empty() => {
                Ok(Book {
                    id: original.id,
                    title,
                    author,
                    isbn,
                    year,
                    price,
                    category,
                    pages,
                    created_at: original.created_at.clone(),
                })
            }
            _ => Err(errors),
        }
    }
}

fn required_text(draft: &BookDraft, field: Field, errors: &mut FieldErrors) -> Option<String> {
    let value = draft.get(field).trim();
    if value.is_empty() {
        errors.insert(field, field.missing_message().to_string());
        None
    } else {
        Some(value.to_string())
    }
}

fn optional_text(draft: &BookDraft, field: Field) -> Option<String> {
    let value = draft.get(field).trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn required_number<T: FromStr>(
    draft: &BookDraft,
    field: Field,
    errors: &mut FieldErrors,
) -> Option<T> {
    if draft.get(field).trim().is_empty() {
        errors.insert(field, field.missing_message().to_string());
        return None;
    }
    optional_number(draft, field, errors)
}

fn optional_number<T: FromStr>(
    draft: &BookDraft,
    field: Field,
    errors: &mut FieldErrors,
) -> Option<T> {
    let value = draft.get(field).trim();
    if value.is_empty() {
        return None;
    }
    match value.parse::<T>() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            errors.insert(field, format!("{} must be a number", field.label()));
            None
        }
    }
}

fn required_price(draft: &BookDraft, errors: &mut FieldErrors) -> Option<f64> {
    let price = required_number::<f64>(draft, Field::Price, errors)?;
    if price.is_finite() && price >= 0.0 {
        Some(price)
    } else {
        errors.insert(Field::Price, format!("{} must be a number", Field::Price.label()));
        None
    }
}
