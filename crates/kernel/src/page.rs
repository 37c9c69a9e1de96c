use std::collections::BTreeMap;

use async_trait::async_trait;
use bookstore_authz::Session;
use bookstore_http::ApiClient;

use crate::settings::Settings;

/// Values captured from `{name}` segments of a route pattern.
pub type RouteParams = BTreeMap<String, String>;

/// Long-lived handles every page visit needs.
#[derive(Clone, Copy)]
pub struct Services<'a> {
    pub settings: &'a Settings,
    pub api: &'a ApiClient,
    pub session: &'a Session,
}

/// Context provided to a page when it is opened
pub struct PageCtx<'a> {
    pub settings: &'a Settings,
    pub api: &'a ApiClient,
    pub session: &'a Session,
    pub params: &'a RouteParams,
    /// Data handed over by the page that navigated here, if any.
    pub state: Option<&'a serde_json::Value>,
}

impl PageCtx<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// What opening a page produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Rendered body to show.
    Render(String),
    /// The page cannot be shown; go to `to`, showing `alert` first if set.
    Redirect { to: String, alert: Option<String> },
}

impl From<String> for PageOutcome {
    fn from(body: String) -> Self {
        PageOutcome::Render(body)
    }
}

/// A page of the storefront or back office
#[async_trait]
pub trait Page: Sync + Send {
    /// Unique name for this page
    fn name(&self) -> &'static str;

    /// Route pattern such as `/books/{id}`
    fn route(&self) -> &'static str;

    /// Mount the page, run its fetch lifecycle to completion and render it.
    async fn open(&self, ctx: &PageCtx<'_>) -> anyhow::Result<PageOutcome>;
}
