//! Fetch-render lifecycle shared by every page.
//!
//! A page starts in [`ViewState::Loading`], issues one request per mount (or
//! per parameter change) and settles into either [`ViewState::Ready`] or
//! [`ViewState::Failed`]. Each request is tied to a [`LifetimeToken`]; once
//! the page is torn down or starts a newer request, answers carrying the old
//! token are dropped instead of overwriting fresher state.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// What a page renders.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Generation counter shared between a page and the requests it issued.
#[derive(Debug, Clone, Default)]
pub struct Lifetime {
    generation: Arc<AtomicU64>,
}

impl Lifetime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle for the current generation.
    pub fn token(&self) -> LifetimeToken {
        LifetimeToken {
            issued: self.generation.load(Ordering::SeqCst),
            generation: Arc::clone(&self.generation),
        }
    }

    /// Make every outstanding token stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

/// Proof that a response belongs to the page's current generation.
#[derive(Debug, Clone)]
pub struct LifetimeToken {
    issued: u64,
    generation: Arc<AtomicU64>,
}

impl LifetimeToken {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.issued
    }
}

/// View state plus the lifetime that guards it.
#[derive(Debug)]
pub struct Lifecycle<T> {
    state: ViewState<T>,
    lifetime: Lifetime,
}

impl<T> Lifecycle<T> {
    /// Fresh page: loading, nothing fetched yet.
    pub fn new() -> Self {
        Self {
            state: ViewState::Loading,
            lifetime: Lifetime::new(),
        }
    }

    /// Page that received its data up front and needs no request.
    pub fn preloaded(value: T) -> Self {
        Self {
            state: ViewState::Ready(value),
            lifetime: Lifetime::new(),
        }
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.state.data_mut()
    }

    /// Shared handle, for requests running outside the page.
    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    /// Start a request: older tokens go stale and the page shows loading.
    pub fn begin(&mut self) -> LifetimeToken {
        self.lifetime.invalidate();
        self.state = ViewState::Loading;
        self.lifetime.token()
    }

    /// Apply a request outcome. Returns `false` when the token is stale and
    /// the outcome was dropped.
    pub fn settle(&mut self, token: &LifetimeToken, outcome: Result<T, String>) -> bool {
        if !token.is_current() {
            tracing::debug!("dropping response for a stale page lifetime");
            return false;
        }

        self.state = match outcome {
            Ok(value) => ViewState::Ready(value),
            Err(message) => ViewState::Failed(message),
        };
        true
    }

    /// `begin`, await `fetch`, `settle`.
    pub async fn load<F>(&mut self, fetch: F) -> bool
    where
        F: Future<Output = Result<T, String>>,
    {
        let token = self.begin();
        let outcome = fetch.await;
        self.settle(&token, outcome)
    }

    /// Page is going away; any response still in flight is ignored.
    pub fn teardown(&mut self) {
        self.lifetime.invalidate();
    }
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self::new()
    }
}
