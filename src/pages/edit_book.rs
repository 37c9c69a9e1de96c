use async_trait::async_trait;
use bookstore_kernel::{Lifecycle, Page, PageCtx, PageOutcome, ViewState};

use crate::books::{Book, BookDraft, BooksApi, Field, FieldErrors};
use crate::pages::{self, add_book::render_fields};
use crate::utils;

pub const LOADING_MESSAGE: &str = "Loading...";
pub const NOT_FOUND_ALERT: &str = "Book not found";
pub const SAVED_ALERT: &str = "Book updated successfully!";
pub const SAVE_FAILED_ALERT: &str = "Failed to update the book";

/// Result of loading the record to edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditLoad {
    Loaded,
    /// The record could not be loaded; show `alert` and go to `redirect`.
    Missing {
        alert: String,
        redirect: &'static str,
    },
}

/// Result of pressing "save".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Local validation failed; no request was sent.
    Invalid,
    Saved {
        alert: String,
        redirect: &'static str,
    },
    Failed {
        alert: String,
    },
}

/// Edit form for an existing book.
pub struct EditBookForm {
    api: BooksApi,
    id: u64,
    view: Lifecycle<Book>,
    draft: BookDraft,
    errors: FieldErrors,
}

impl EditBookForm {
    pub fn new(api: BooksApi, id: u64) -> Self {
        Self {
            api,
            id,
            view: Lifecycle::new(),
            draft: BookDraft::default(),
            errors: FieldErrors::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> &ViewState<Book> {
        self.view.state()
    }

    pub fn draft(&self) -> &BookDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Fetch the record and prefill the form.
    pub async fn load(&mut self) -> EditLoad {
        let api = self.api.clone();
        let id = self.id;
        self.view
            .load(async move {
                api.get(id).await.map_err(|err| {
                    tracing::error!(id, error = %err, "error fetching book to edit");
                    err.user_message()
                })
            })
            .await;

        match self.view.state().data() {
            Some(book) => {
                self.draft = BookDraft::from_book(book);
                EditLoad::Loaded
            }
            None => EditLoad::Missing {
                alert: NOT_FOUND_ALERT.to_string(),
                redirect: pages::ALL_BOOKS_ROUTE,
            },
        }
    }

    /// Update one field and clear its error.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.remove(&field);
    }

    /// Send the full edited record.
    pub async fn save(&mut self) -> SaveOutcome {
        let Some(original) = self.view.state().data() else {
            return SaveOutcome::Failed {
                alert: NOT_FOUND_ALERT.to_string(),
            };
        };

        let updated = match self.draft.apply_to(original) {
            Ok(updated) => updated,
            Err(errors) => {
                self.errors = errors;
                return SaveOutcome::Invalid;
            }
        };
        self.errors.clear();

        match self.api.update(&updated).await {
            Ok(()) => {
                if let Some(book) = self.view.data_mut() {
                    *book = updated;
                }
                SaveOutcome::Saved {
                    alert: SAVED_ALERT.to_string(),
                    redirect: pages::ALL_BOOKS_ROUTE,
                }
            }
            Err(err) => {
                tracing::error!(id = self.id, error = %err, "error updating book");
                SaveOutcome::Failed {
                    alert: SAVE_FAILED_ALERT.to_string(),
                }
            }
        }
    }

    pub fn render(&self) -> String {
        match self.state() {
            ViewState::Loading => LOADING_MESSAGE.to_string(),
            ViewState::Failed(message) => format!(
                "{}\n{}\nBack to {}",
                NOT_FOUND_ALERT,
                utils::error_line(message),
                pages::ALL_BOOKS_ROUTE
            ),
            ViewState::Ready(_) => {
                let mut lines = vec![format!("Edit book #{}", self.id), String::new()];
                lines.extend(render_fields(&self.draft, &self.errors, false));
                lines.join("\n")
            }
        }
    }
}

pub struct EditBookPage;

#[async_trait]
impl Page for EditBookPage {
    fn name(&self) -> &'static str {
        "edit-book"
    }

    fn route(&self) -> &'static str {
        pages::EDIT_BOOK_ROUTE
    }

    async fn open(&self, ctx: &PageCtx<'_>) -> anyhow::Result<PageOutcome> {
        let Some(id) = ctx.param("id").and_then(|raw| raw.parse::<u64>().ok()) else {
            return Ok(PageOutcome::Redirect {
                to: pages::ALL_BOOKS_ROUTE.to_string(),
                alert: Some(NOT_FOUND_ALERT.to_string()),
            });
        };

        let mut form = EditBookForm::new(BooksApi::new(ctx.api.clone()), id);
        match form.load().await {
            EditLoad::Loaded => Ok(form.render().into()),
            EditLoad::Missing { alert, redirect } => Ok(PageOutcome::Redirect {
                to: redirect.to_string(),
                alert: Some(alert),
            }),
        }
    }
}
