use std::time::{Duration, Instant};

use async_trait::async_trait;
use bookstore_kernel::{Page, PageCtx, PageOutcome};

use crate::books::form::CATEGORIES;
use crate::books::{Book, BookDraft, BooksApi, Field, FieldErrors};
use crate::pages;

/// How long the success banner stays up.
pub const SUCCESS_MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Result of pressing "add book".
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Local validation failed; no request was sent.
    Invalid,
    Created(Book),
    Failed,
}

/// Create form with local validation.
pub struct AddBookForm {
    api: BooksApi,
    draft: BookDraft,
    errors: FieldErrors,
    submit_error: Option<String>,
    success: Option<(String, Instant)>,
}

impl AddBookForm {
    pub fn new(api: BooksApi) -> Self {
        Self {
            api,
            draft: BookDraft::default(),
            errors: FieldErrors::new(),
            submit_error: None,
            success: None,
        }
    }

    pub fn draft(&self) -> &BookDraft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.submit_error.as_deref()
    }

    /// Update one field and clear its error.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.draft.set(field, value);
        self.errors.remove(&field);
    }

    pub fn success_message(&self) -> Option<&str> {
        self.success_message_at(Instant::now())
    }

    /// Success banner as it would show at `now`.
    pub fn success_message_at(&self, now: Instant) -> Option<&str> {
        self.success
            .as_ref()
            .filter(|(_, shown_at)| now.saturating_duration_since(*shown_at) < SUCCESS_MESSAGE_TTL)
            .map(|(message, _)| message.as_str())
    }

    /// Validate and, when valid, create the book.
    pub async fn submit(&mut self) -> SubmitOutcome {
        self.success = None;

        let new_book = match self.draft.validate() {
            Ok(new_book) => new_book,
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "add form rejected by validation");
                self.errors = errors;
                self.submit_error = None;
                return SubmitOutcome::Invalid;
            }
        };
        self.errors.clear();
        self.submit_error = None;

        match self.api.create(&new_book).await {
            Ok(created) => {
                self.success = Some((
                    format!("Added \"{}\" successfully!", created.title),
                    Instant::now(),
                ));
                self.draft = BookDraft::default();
                SubmitOutcome::Created(created)
            }
            Err(err) => {
                tracing::error!(error = %err, "error adding book");
                self.submit_error = Some(format!(
                    "An error occurred while adding the book: {}",
                    err.user_message()
                ));
                SubmitOutcome::Failed
            }
        }
    }

    pub fn render(&self) -> String {
        let mut lines = vec!["Add a new book".to_string(), String::new()];
        if let Some(message) = self.success_message() {
            lines.push(message.to_string());
        }
        if let Some(message) = self.submit_error() {
            lines.push(message.to_string());
        }
        lines.extend(render_fields(&self.draft, &self.errors, true));
        lines.push(String::new());
        lines.push(format!("Categories: {}", CATEGORIES.join(", ")));
        lines.join("\n")
    }
}

/// One line per field, each followed by its error if any.
pub(crate) fn render_fields(draft: &BookDraft, errors: &FieldErrors, all_required: bool) -> Vec<String> {
    let mut lines = Vec::new();
    for field in Field::ALL {
        let required = all_required || !matches!(field, Field::Category | Field::Pages);
        let marker = if required { " *" } else { "" };
        lines.push(format!("{}{}: {}", field.label(), marker, draft.get(field)));
        if let Some(error) = errors.get(&field) {
            lines.push(format!("  ! {error}"));
        }
    }
    lines
}

pub struct AddBookPage;

#[async_trait]
impl Page for AddBookPage {
    fn name(&self) -> &'static str {
        "add-book"
    }

    fn route(&self) -> &'static str {
        pages::ADD_BOOK_ROUTE
    }

    async fn open(&self, ctx: &PageCtx<'_>) -> anyhow::Result<PageOutcome> {
        Ok(AddBookForm::new(BooksApi::new(ctx.api.clone())).render().into())
    }
}
