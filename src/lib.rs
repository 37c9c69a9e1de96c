//! Bookstore application library
//!
//! Book records, the typed books client and the storefront/back-office pages
//! built on the kernel's page registry.

pub mod books;
pub mod pages;
pub mod utils;

pub use books::{Book, BooksApi, NewBook};
pub use pages::{register_all, registry};
