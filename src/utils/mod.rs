//! Plain-text rendering helpers shared by the pages.

use bookstore_kernel::ViewState;

use crate::books::Book;

/// Price as shown to customers.
pub fn format_price(price: f64) -> String {
    format!("฿{price:.2}")
}

pub fn error_line(message: &str) -> String {
    format!("Error: {message}")
}

/// Storefront card for one book.
pub fn book_card(book: &Book) -> String {
    let mut card = format!(
        "#{} {}\n    by {} ({}) {}",
        book.id,
        book.title,
        book.author,
        book.year,
        format_price(book.price)
    );
    if let Some(category) = &book.category {
        card.push_str(&format!(" [{category}]"));
    }
    card
}

pub fn book_cards(books: &[Book]) -> String {
    books
        .iter()
        .map(book_card)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render a collection view: loading placeholder, error, empty-state
/// message, or the items.
pub fn render_collection<F>(
    state: &ViewState<Vec<Book>>,
    loading: &str,
    empty: &str,
    items: F,
) -> String
where
    F: FnOnce(&[Book]) -> String,
{
    match state {
        ViewState::Loading => loading.to_string(),
        ViewState::Failed(message) => error_line(message),
        ViewState::Ready(books) if books.is_empty() => empty.to_string(),
        ViewState::Ready(books) => items(books),
    }
}

/// Left-aligned text table.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| {
                let pad = width.saturating_sub(cell.chars().count());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}
