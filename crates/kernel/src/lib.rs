//! Core types shared by every bookstore page: layered settings, the
//! fetch-render lifecycle, the page trait and the page registry.

pub mod lifecycle;
pub mod page;
pub mod registry;
pub mod settings;

pub use lifecycle::{Lifecycle, Lifetime, LifetimeToken, ViewState};
pub use page::{Page, PageCtx, PageOutcome, RouteParams, Services};
pub use registry::{match_route, Navigation, NavigationError, PageRegistry, Visit};
pub use settings::Settings;
