//! Storefront and back-office pages.
//!
//! Every page is registered with the kernel's [`PageRegistry`] under its
//! route. Back-office pages sit behind the admin session guard.

pub mod add_book;
pub mod all_books;
pub mod book_list;
pub mod detail;
pub mod edit_book;
pub mod featured;
pub mod home;
pub mod login;
pub mod newest;

use std::sync::Arc;

use bookstore_kernel::PageRegistry;

pub const HOME_ROUTE: &str = "/";
pub const BOOKS_ROUTE: &str = "/books";
pub const BOOK_DETAIL_ROUTE: &str = "/books/{id}";
pub const ALL_BOOKS_ROUTE: &str = "/store-manager/all-book";
pub const ADD_BOOK_ROUTE: &str = "/store-manager/add-book";
pub const EDIT_BOOK_ROUTE: &str = "/store-manager/edit-book/{id}";

pub fn book_detail_path(id: u64) -> String {
    format!("/books/{id}")
}

pub fn edit_book_path(id: u64) -> String {
    format!("/store-manager/edit-book/{id}")
}

/// Register every page with the given registry.
pub fn register_all(registry: &mut PageRegistry) {
    registry.register_storefront(Arc::new(home::HomePage));
    registry.register_storefront(Arc::new(book_list::BookListPage));
    registry.register_storefront(Arc::new(detail::BookDetailPage));
    registry.register_storefront(Arc::new(login::LoginPage));

    registry.register_back_office(Arc::new(all_books::AllBooksPage));
    registry.register_back_office(Arc::new(add_book::AddBookPage));
    registry.register_back_office(Arc::new(edit_book::EditBookPage));

    tracing::debug!(
        storefront = registry.storefront_page_count(),
        back_office = registry.back_office_page_count(),
        "pages registered"
    );
}

/// A registry holding every page of the application.
pub fn registry() -> PageRegistry {
    let mut registry = PageRegistry::new();
    register_all(&mut registry);
    registry
}
