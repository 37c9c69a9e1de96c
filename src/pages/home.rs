use async_trait::async_trait;
use bookstore_kernel::{Page, PageCtx, PageOutcome};

use crate::books::BooksApi;
use crate::pages::{self, featured::FeaturedBooks, newest::NewBooks};

/// Storefront landing page: featured books, then new arrivals.
pub struct HomePage;

#[async_trait]
impl Page for HomePage {
    fn name(&self) -> &'static str {
        "home"
    }

    fn route(&self) -> &'static str {
        pages::HOME_ROUTE
    }

    async fn open(&self, ctx: &PageCtx<'_>) -> anyhow::Result<PageOutcome> {
        let api = BooksApi::new(ctx.api.clone());
        let mut featured = FeaturedBooks::new(api.clone());
        let mut newest = NewBooks::new(api);

        // Each section owns its request; neither waits for the other.
        tokio::join!(featured.mount(), newest.mount());

        Ok(format!(
            "Featured books\n\n{}\n\nNew arrivals\n\n{}",
            featured.render(),
            newest.render()
        )
        .into())
    }
}
