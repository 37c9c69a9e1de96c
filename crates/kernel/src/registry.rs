use std::sync::Arc;

use anyhow::Context;
use bookstore_authz::{Session, LOGIN_ROUTE};
use thiserror::Error;

use crate::page::{Page, PageCtx, PageOutcome, RouteParams, Services};

/// Redirects followed by a single [`PageRegistry::open`] call.
const MAX_REDIRECTS: usize = 3;

#[derive(Error, Debug)]
pub enum NavigationError {
    #[error("no page is registered for '{path}'")]
    NotFound { path: String },

    #[error("too many redirects while opening '{path}'")]
    TooManyRedirects { path: String },
}

/// Where a path leads for a given session.
pub enum Navigation {
    Page {
        page: Arc<dyn Page>,
        params: RouteParams,
    },
    /// Back-office page requested without an admin session.
    Redirect { from: String, to: String },
}

/// Result of opening a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    /// Path that was finally rendered.
    pub path: String,
    /// Set when a guard or a page sent the visitor elsewhere.
    pub redirected_from: Option<String>,
    /// Message a redirecting page asked to show.
    pub alert: Option<String>,
    pub body: String,
}

/// Page registry with storefront/back-office separation.
///
/// Storefront pages are open to everyone. Back-office pages need an admin
/// session and otherwise redirect to the login route.
pub struct PageRegistry {
    storefront_pages: Vec<Arc<dyn Page>>,
    back_office_pages: Vec<Arc<dyn Page>>,
}

impl PageRegistry {
    pub fn new() -> Self {
        Self {
            storefront_pages: Vec::new(),
            back_office_pages: Vec::new(),
        }
    }

    /// Register a page anyone may open
    pub fn register_storefront(&mut self, page: Arc<dyn Page>) {
        self.storefront_pages.push(page);
    }

    /// Register a page that requires an admin session
    pub fn register_back_office(&mut self, page: Arc<dyn Page>) {
        self.back_office_pages.push(page);
    }

    /// All registered pages (storefront first)
    pub fn pages(&self) -> Vec<&Arc<dyn Page>> {
        let mut all_pages = Vec::new();
        all_pages.extend(self.storefront_pages.iter());
        all_pages.extend(self.back_office_pages.iter());
        all_pages
    }

    pub fn storefront_page_count(&self) -> usize {
        self.storefront_pages.len()
    }

    pub fn back_office_page_count(&self) -> usize {
        self.back_office_pages.len()
    }

    /// Match `path` against the registered routes and apply the admin guard.
    pub fn resolve(&self, path: &str, session: &Session) -> Result<Navigation, NavigationError> {
        for page in &self.storefront_pages {
            if let Some(params) = match_route(page.route(), path) {
                return Ok(Navigation::Page {
                    page: Arc::clone(page),
                    params,
                });
            }
        }

        for page in &self.back_office_pages {
            if let Some(params) = match_route(page.route(), path) {
                if session.require_admin().is_err() {
                    return Ok(Navigation::Redirect {
                        from: path.to_string(),
                        to: LOGIN_ROUTE.to_string(),
                    });
                }
                return Ok(Navigation::Page {
                    page: Arc::clone(page),
                    params,
                });
            }
        }

        Err(NavigationError::NotFound {
            path: path.to_string(),
        })
    }

    /// Resolve `path` and open the page, following guard redirects and
    /// redirects requested by the pages themselves.
    pub async fn open(
        &self,
        path: &str,
        services: Services<'_>,
        state: Option<&serde_json::Value>,
    ) -> anyhow::Result<Visit> {
        let mut target = path.to_string();
        let mut redirected_from: Option<String> = None;
        let mut alert = None;
        // Navigation state belongs to the page that was asked for.
        let mut state = state;

        for _ in 0..=MAX_REDIRECTS {
            let (page, params) = match self.resolve(&target, services.session)? {
                Navigation::Page { page, params } => (page, params),
                Navigation::Redirect { from, to } => {
                    tracing::info!(from = %from, to = %to, "admin session required; redirecting");
                    if redirected_from.is_none() {
                        redirected_from = Some(from);
                    }
                    target = to;
                    state = None;
                    continue;
                }
            };

            tracing::info!(page = page.name(), path = %target, "opening page");

            let ctx = PageCtx {
                settings: services.settings,
                api: services.api,
                session: services.session,
                params: &params,
                state,
            };

            let outcome = page
                .open(&ctx)
                .await
                .with_context(|| format!("failed to open page '{}'", page.name()))?;

            match outcome {
                PageOutcome::Render(body) => {
                    return Ok(Visit {
                        path: target,
                        redirected_from,
                        alert,
                        body,
                    })
                }
                PageOutcome::Redirect { to, alert: message } => {
                    tracing::info!(page = page.name(), from = %target, to = %to, "page redirected");
                    if message.is_some() {
                        alert = message;
                    }
                    if redirected_from.is_none() {
                        redirected_from = Some(target);
                    }
                    target = to;
                    state = None;
                }
            }
        }

        Err(NavigationError::TooManyRedirects {
            path: path.to_string(),
        }
        .into())
    }
}

impl Default for PageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Match a path like `/books/7` against a pattern like `/books/{id}`.
///
/// Trailing slashes are ignored and captured segments must be non-empty.
pub fn match_route(pattern: &str, path: &str) -> Option<RouteParams> {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let pattern_segments: Vec<&str> = segments(pattern).collect();
    let path_segments: Vec<&str> = segments(path).collect();

    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = RouteParams::new();
    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match expected
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
        {
            Some(name) => {
                params.insert(name.to_string(), actual.to_string());
            }
            None if expected == actual => {}
            None => return None,
        }
    }

    Some(params)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}
