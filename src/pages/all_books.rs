use async_trait::async_trait;
use bookstore_kernel::{Lifecycle, Page, PageCtx, PageOutcome, ViewState};

use crate::books::{Book, BooksApi};
use crate::pages::{self, newest};
use crate::utils;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const DELETE_PROMPT: &str = "Are you sure you want to delete this book?";
pub const DELETED_ALERT: &str = "Book deleted successfully!";

/// Result of a delete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    Deleted { alert: String },
    Failed { alert: String },
}

/// Back-office table of every book with edit and delete actions.
pub struct AllBooks {
    api: BooksApi,
    view: Lifecycle<Vec<Book>>,
}

impl AllBooks {
    pub fn new(api: BooksApi) -> Self {
        Self {
            api,
            view: Lifecycle::new(),
        }
    }

    pub async fn mount(&mut self) {
        let api = self.api.clone();
        self.view
            .load(async move {
                api.list().await.map_err(|err| {
                    tracing::error!(error = %err, "error fetching books");
                    err.user_message()
                })
            })
            .await;
    }

    pub fn state(&self) -> &ViewState<Vec<Book>> {
        self.view.state()
    }

    /// Books currently shown, once loaded.
    pub fn books(&self) -> Option<&[Book]> {
        self.state().data().map(Vec::as_slice)
    }

    /// Delete `id` after `confirm` accepts [`DELETE_PROMPT`].
    ///
    /// The row leaves the in-memory list only once the backend confirmed the
    /// delete; a failure leaves the list as it was.
    pub async fn delete<C>(&mut self, id: u64, confirm: C) -> DeleteOutcome
    where
        C: FnOnce(&str) -> bool,
    {
        if !confirm(DELETE_PROMPT) {
            tracing::debug!(id, "delete cancelled");
            return DeleteOutcome::Cancelled;
        }

        match self.api.delete(id).await {
            Ok(()) => {
                if let Some(books) = self.view.data_mut() {
                    books.retain(|book| book.id != id);
                }
                DeleteOutcome::Deleted {
                    alert: DELETED_ALERT.to_string(),
                }
            }
            Err(err) => {
                tracing::error!(id, error = %err, "error deleting book");
                DeleteOutcome::Failed {
                    alert: format!("An error occurred: {}", err.user_message()),
                }
            }
        }
    }

    pub fn render(&self) -> String {
        let body = utils::render_collection(
            self.state(),
            LOADING_MESSAGE,
            newest::EMPTY_MESSAGE,
            render_rows,
        );
        format!(
            "BookStore - All books\nAdd a new book: {}\n\n{}",
            pages::ADD_BOOK_ROUTE,
            body
        )
    }
}

fn render_rows(books: &[Book]) -> String {
    let rows: Vec<Vec<String>> = books
        .iter()
        .map(|book| {
            vec![
                book.id.to_string(),
                book.title.clone(),
                book.author.clone(),
                book.isbn.clone(),
                book.year.to_string(),
                utils::format_price(book.price),
                pages::edit_book_path(book.id),
            ]
        })
        .collect();
    utils::render_table(
        &["ID", "Title", "Author", "ISBN", "Year", "Price", "Edit"],
        &rows,
    )
}

pub struct AllBooksPage;

#[async_trait]
impl Page for AllBooksPage {
    fn name(&self) -> &'static str {
        "all-books"
    }

    fn route(&self) -> &'static str {
        pages::ALL_BOOKS_ROUTE
    }

    async fn open(&self, ctx: &PageCtx<'_>) -> anyhow::Result<PageOutcome> {
        let mut table = AllBooks::new(BooksApi::new(ctx.api.clone()));
        table.mount().await;
        Ok(table.render().into())
    }
}
