use bookstore_kernel::{Lifecycle, ViewState};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::books::{transforms, Book, BooksApi};
use crate::utils;

pub const LOADING_MESSAGE: &str = "Loading books...";
pub const EMPTY_MESSAGE: &str = "No featured books available";

/// Three random books from the catalog.
pub struct FeaturedBooks {
    api: BooksApi,
    rng: StdRng,
    view: Lifecycle<Vec<Book>>,
}

impl FeaturedBooks {
    pub fn new(api: BooksApi) -> Self {
        Self::with_rng(api, StdRng::from_entropy())
    }

    /// Deterministic sampling, for tests.
    pub fn with_rng(api: BooksApi, rng: StdRng) -> Self {
        Self {
            api,
            rng,
            view: Lifecycle::new(),
        }
    }

    pub async fn mount(&mut self) {
        let token = self.view.begin();
        let outcome = match self.api.list().await {
            Ok(books) => Ok(transforms::featured(books, &mut self.rng)),
            Err(err) => {
                tracing::error!(error = %err, "error fetching featured books");
                Err(err.user_message())
            }
        };
        self.view.settle(&token, outcome);
    }

    pub fn teardown(&mut self) {
        self.view.teardown();
    }

    pub fn state(&self) -> &ViewState<Vec<Book>> {
        self.view.state()
    }

    pub fn render(&self) -> String {
        utils::render_collection(
            self.state(),
            LOADING_MESSAGE,
            EMPTY_MESSAGE,
            utils::book_cards,
        )
    }
}
