use bookstore_kernel::{Lifecycle, ViewState};

use crate::books::{transforms, Book, BooksApi};
use crate::utils;

pub const EMPTY_MESSAGE: &str = "No books in the store yet";

/// The five most recently added books.
pub struct NewBooks {
    api: BooksApi,
    view: Lifecycle<Vec<Book>>,
}

impl NewBooks {
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
                api.list().await.map(transforms::newest).map_err(|err| {
                    tracing::error!(error = %err, "error fetching new books");
                    err.user_message()
                })
            })
            .await;
    }

    pub fn teardown(&mut self) {
        self.view.teardown();
    }

    pub fn state(&self) -> &ViewState<Vec<Book>> {
        self.view.state()
    }

    pub fn render(&self) -> String {
        // One placeholder row per card slot.
        let placeholder = vec!["[ .......... ]"; transforms::NEWEST_COUNT].join("\n");
        utils::render_collection(self.state(), &placeholder, EMPTY_MESSAGE, utils::book_cards)
    }
}
