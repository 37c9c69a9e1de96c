use async_trait::async_trait;
use bookstore_kernel::{Lifecycle, Page, PageCtx, PageOutcome, ViewState};

use crate::books::{Book, BooksApi};
use crate::pages::{self, newest};
use crate::utils;

pub const LOADING_MESSAGE: &str = "Loading books...";

/// Every book, in the order the backend returns them.
pub struct BookList {
    api: BooksApi,
    view: Lifecycle<Vec<Book>>,
}

impl BookList {
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

    pub fn render(&self) -> String {
        utils::render_collection(
            self.state(),
            LOADING_MESSAGE,
            newest::EMPTY_MESSAGE,
            utils::book_cards,
        )
    }
}

pub struct BookListPage;

#[async_trait]
impl Page for BookListPage {
    fn name(&self) -> &'static str {
        "book-list"
    }

    fn route(&self) -> &'static str {
        pages::BOOKS_ROUTE
    }

    async fn open(&self, ctx: &PageCtx<'_>) -> anyhow::Result<PageOutcome> {
        let mut list = BookList::new(BooksApi::new(ctx.api.clone()));
        list.mount().await;
        Ok(format!("All books\n\n{}", list.render()).into())
    }
}
