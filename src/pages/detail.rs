use async_trait::async_trait;
use bookstore_kernel::{Lifecycle, Lifetime, Page, PageCtx, PageOutcome, ViewState};

use crate::books::{Book, BooksApi};
use crate::pages;
use crate::utils;

pub const LOADING_MESSAGE: &str = "Loading book details...";
pub const NOT_FOUND_MESSAGE: &str = "Book not found";
pub const BACK_LINK: &str = "<- Back to all books (/books)";

/// Navigation-state key under which a caller may hand over the record.
pub const STATE_KEY: &str = "book";

/// One book, fetched by id unless the caller already had it.
pub struct BookDetail {
    api: BooksApi,
    id: u64,
    preloaded: bool,
    view: Lifecycle<Book>,
}

impl BookDetail {
    pub fn new(api: BooksApi, id: u64) -> Self {
        Self {
            api,
            id,
            preloaded: false,
            view: Lifecycle::new(),
        }
    }

    /// Detail page for a record the previous page already holds.
    pub fn preloaded(api: BooksApi, book: Book) -> Self {
        Self {
            api,
            id: book.id,
            preloaded: true,
            view: Lifecycle::preloaded(book),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Fetch the record unless it was handed over.
    pub async fn mount(&mut self) {
        if self.preloaded {
            return;
        }

        let api = self.api.clone();
        let id = self.id;
        self.view
            .load(async move {
                api.get(id).await.map_err(|err| {
                    tracing::error!(id, error = %err, "error fetching book");
                    err.user_message()
                })
            })
            .await;
    }

    /// Switch to another record. Any answer still pending for the old id is
    /// discarded.
    pub async fn set_id(&mut self, id: u64) {
        if id == self.id && self.view.state().data().is_some() {
            return;
        }
        self.id = id;
        self.preloaded = false;
        self.mount().await;
    }

    pub fn teardown(&mut self) {
        self.view.teardown();
    }

    /// Generation handle for requests issued on this page's behalf.
    pub fn lifetime(&self) -> &Lifetime {
        self.view.lifetime()
    }

    pub fn state(&self) -> &ViewState<Book> {
        self.view.state()
    }

    pub fn render(&self) -> String {
        match self.state() {
            ViewState::Loading => LOADING_MESSAGE.to_string(),
            ViewState::Failed(message) => {
                format!("{}\n{}", utils::error_line(message), BACK_LINK)
            }
            ViewState::Ready(book) => render_book(book),
        }
    }
}

fn render_book(book: &Book) -> String {
    let mut lines = vec![
        BACK_LINK.to_string(),
        String::new(),
        book.title.clone(),
        format!("Author: {}", book.author),
        format!("ISBN: {}", book.isbn),
        format!("Year: {}", book.year),
        format!("Price: {}", utils::format_price(book.price)),
    ];
    if let Some(category) = &book.category {
        lines.push(format!("Category: {category}"));
    }
    if let Some(pages) = book.pages {
        lines.push(format!("Pages: {pages}"));
    }
    lines.join("\n")
}

pub struct BookDetailPage;

#[async_trait]
impl Page for BookDetailPage {
    fn name(&self) -> &'static str {
        "book-detail"
    }

    fn route(&self) -> &'static str {
        pages::BOOK_DETAIL_ROUTE
    }

    async fn open(&self, ctx: &PageCtx<'_>) -> anyhow::Result<PageOutcome> {
        let api = BooksApi::new(ctx.api.clone());
        let Some(id) = ctx.param("id").and_then(|raw| raw.parse::<u64>().ok()) else {
            return Ok(format!("{NOT_FOUND_MESSAGE}\n{BACK_LINK}").into());
        };

        let handed_over = ctx
            .state
            .and_then(|state| state.get(STATE_KEY))
            .and_then(|value| serde_json::from_value::<Book>(value.clone()).ok())
            .filter(|book| book.id == id);

        let mut detail = match handed_over {
            Some(book) => BookDetail::preloaded(api, book),
            None => BookDetail::new(api, id),
        };
        detail.mount().await;
        Ok(detail.render().into())
    }
}
