use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use bookstore_app::books::{BooksApi, Field};
use bookstore_app::pages::{
    self,
    add_book::{AddBookForm, SubmitOutcome},
    all_books::{AllBooks, DeleteOutcome, DELETED_ALERT, DELETE_PROMPT},
    book_list::BookList,
    detail::BookDetail,
    edit_book::{EditBookForm, EditLoad, SaveOutcome, SAVE_FAILED_ALERT},
    featured::{self, FeaturedBooks},
    newest::{self, NewBooks},
};
use bookstore_authz::{Session, LOGIN_ROUTE};
use bookstore_http::{ApiClient, ClientConfig};
use bookstore_kernel::{settings::Settings, Services};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Value};

#[derive(Default)]
struct Backend {
    books: Mutex<Vec<Value>>,
    fail_list: AtomicBool,
    fail_post: AtomicBool,
    fail_put: AtomicBool,
    lists: AtomicUsize,
    gets: AtomicUsize,
    posts: AtomicUsize,
    puts: AtomicUsize,
    deletes: AtomicUsize,
}

impl Backend {
    fn with_books(books: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            books: Mutex::new(books),
            ..Self::default()
        })
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.books
            .lock()
            .unwrap()
            .iter()
            .position(|book| book["id"] == json!(id))
    }
}

async fn list_books(State(backend): State<Arc<Backend>>) -> Response {
    backend.lists.fetch_add(1, Ordering::SeqCst);
    if backend.fail_list.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let books = backend.books.lock().unwrap().clone();
    Json(Value::Array(books)).into_response()
}

async fn create_book(
    State(backend): State<Arc<Backend>>,
    Json(mut body): Json<Value>,
) -> Response {
    backend.posts.fetch_add(1, Ordering::SeqCst);
    if backend.fail_post.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    let mut books = backend.books.lock().unwrap();
    let id = books
        .iter()
        .filter_map(|book| book["id"].as_u64())
        .max()
        .unwrap_or(0)
        + 1;
    body["id"] = json!(id);
    body["created_at"] = json!("2024-06-01T00:00:00Z");
    books.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn get_book(State(backend): State<Arc<Backend>>, Path(id): Path<u64>) -> Response {
    backend.gets.fetch_add(1, Ordering::SeqCst);
    match backend.position(id) {
        Some(index) => Json(backend.books.lock().unwrap()[index].clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn update_book(
    State(backend): State<Arc<Backend>>,
    Path(id): Path<u64>,
    Json(body): Json<Value>,
) -> StatusCode {
    backend.puts.fetch_add(1, Ordering::SeqCst);
    if backend.fail_put.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }
    match backend.position(id) {
        Some(index) => {
            backend.books.lock().unwrap()[index] = body;
            StatusCode::OK
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn delete_book(State(backend): State<Arc<Backend>>, Path(id): Path<u64>) -> StatusCode {
    backend.deletes.fetch_add(1, Ordering::SeqCst);
    match backend.position(id) {
        Some(index) => {
            backend.books.lock().unwrap().remove(index);
            StatusCode::NO_CONTENT
        }
        None => StatusCode::NOT_FOUND,
    }
}

async fn serve(backend: Arc<Backend>) -> ApiClient {
    let router = Router::new()
        .route("/api/v1/books/", get(list_books).post(create_book))
        .route(
            "/api/v1/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
        .with_state(backend);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    ApiClient::new(&ClientConfig {
        base_url: format!("http://{addr}"),
        request_timeout: None,
    })
    .unwrap()
}

fn book(id: u64, title: &str, created_at: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "author": "Author",
        "isbn": format!("978-{id}"),
        "year": 2000 + id,
        "price": 199.0,
        "category": "Fiction",
        "pages": 300,
        "created_at": created_at,
    })
}

fn catalog() -> Vec<Value> {
    vec![
        book(1, "Dune", "2024-01-01T10:00:00Z"),
        book(2, "Emma", "2024-03-01T10:00:00Z"),
        book(3, "Ulysses", "2024-02-01T10:00:00Z"),
        book(4, "Beloved", "2024-04-01T10:00:00Z"),
    ]
}

fn ids(books: &[bookstore_app::Book]) -> Vec<u64> {
    books.iter().map(|book| book.id).collect()
}

#[tokio::test]
async fn featured_shows_three_distinct_books() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut page = FeaturedBooks::with_rng(api, StdRng::seed_from_u64(11));
    page.mount().await;

    let shown = ids(page.state().data().unwrap());
    assert_eq!(shown.len(), 3);
    let mut unique = shown.clone();
    unique.sort_unstable();
    unique.dedup();
    assert_eq!(unique.len(), 3);
    assert!(shown.iter().all(|id| (1..=4).contains(id)));
}

#[tokio::test]
async fn newest_orders_by_creation_time() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut page = NewBooks::new(api);
    page.mount().await;

    assert_eq!(ids(page.state().data().unwrap()), vec![4, 2, 3, 1]);
}

#[tokio::test]
async fn empty_catalog_shows_empty_messages() {
    let backend = Backend::with_books(Vec::new());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut featured_page = FeaturedBooks::new(api.clone());
    let mut newest_page = NewBooks::new(api);
    featured_page.mount().await;
    newest_page.mount().await;

    assert_eq!(featured_page.render(), featured::EMPTY_MESSAGE);
    assert_eq!(newest_page.render(), newest::EMPTY_MESSAGE);
}

#[tokio::test]
async fn server_error_ends_loading_with_a_message() {
    let backend = Backend::with_books(catalog());
    backend.fail_list.store(true, Ordering::SeqCst);
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut page = NewBooks::new(api);
    page.mount().await;

    let state = page.state();
    assert!(!state.is_loading());
    assert!(state.data().is_none());
    assert_eq!(state.error(), Some("HTTP 500"));
    assert_eq!(page.render(), "Error: HTTP 500");
}

#[tokio::test]
async fn every_mount_fetches_again() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut page = NewBooks::new(api);
    page.mount().await;
    page.mount().await;

    assert_eq!(backend.lists.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn invalid_create_sends_nothing() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut form = AddBookForm::new(api);
    form.set(Field::Title, "Dune Messiah");
    form.set(Field::Year, "soon");

    assert_eq!(form.submit().await, SubmitOutcome::Invalid);
    assert_eq!(backend.posts.load(Ordering::SeqCst), 0);

    let errors = form.errors();
    assert!(!errors.contains_key(&Field::Title));
    assert_eq!(errors.get(&Field::Year).map(String::as_str), Some("Publication year must be a number"));
    assert_eq!(
        errors.get(&Field::Author).map(String::as_str),
        Some("Please enter the author")
    );

    form.set(Field::Author, "Frank Herbert");
    assert!(!form.errors().contains_key(&Field::Author));
    assert!(form.errors().contains_key(&Field::Year));
}

#[tokio::test]
async fn valid_create_resets_the_form() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut form = AddBookForm::new(api);
    for (field, value) in [
        (Field::Title, "Dune Messiah"),
        (Field::Author, "Frank Herbert"),
        (Field::Isbn, "9780593098233"),
        (Field::Year, "1969"),
        (Field::Price, "320.50"),
        (Field::Category, "Fiction"),
        (Field::Pages, "256"),
    ] {
        form.set(field, value);
    }

    match form.submit().await {
        SubmitOutcome::Created(created) => {
            assert_eq!(created.id, 5);
            assert_eq!(created.title, "Dune Messiah");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(backend.posts.load(Ordering::SeqCst), 1);
    assert_eq!(
        form.success_message(),
        Some("Added \"Dune Messiah\" successfully!")
    );
    assert!(form.draft().title.is_empty());
    assert!(form.errors().is_empty());
}

#[tokio::test]
async fn delete_removes_the_row_without_refetching() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut table = AllBooks::new(api);
    table.mount().await;

    let mut asked = None;
    let outcome = table
        .delete(2, |prompt| {
            asked = Some(prompt.to_string());
            true
        })
        .await;

    assert_eq!(
        outcome,
        DeleteOutcome::Deleted {
            alert: DELETED_ALERT.to_string()
        }
    );
    assert_eq!(asked.as_deref(), Some(DELETE_PROMPT));
    assert_eq!(ids(table.books().unwrap()), vec![1, 3, 4]);
    assert_eq!(backend.lists.load(Ordering::SeqCst), 1);
    assert_eq!(backend.deletes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn declined_or_failed_delete_keeps_the_row() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut table = AllBooks::new(api);
    table.mount().await;

    assert_eq!(table.delete(2, |_| false).await, DeleteOutcome::Cancelled);
    assert_eq!(backend.deletes.load(Ordering::SeqCst), 0);

    match table.delete(99, |_| true).await {
        DeleteOutcome::Failed { alert } => assert!(alert.contains("HTTP 404")),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(ids(table.books().unwrap()), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn preloaded_detail_skips_the_network() {
    let backend = Backend::with_books(catalog());
    let api = serve(backend.clone()).await;
    let settings = Settings::default();
    let session = Session::anonymous();
    let services = Services {
        settings: &settings,
        api: &api,
        session: &session,
    };

    let state = json!({ "book": book(2, "Emma", "2024-03-01T10:00:00Z") });
    let visit = pages::registry()
        .open("/books/2", services, Some(&state))
        .await
        .unwrap();

    assert!(visit.body.contains("Emma"));
    assert_eq!(backend.gets.load(Ordering::SeqCst), 0);

    let visit = pages::registry()
        .open("/books/3", services, None)
        .await
        .unwrap();
    assert!(visit.body.contains("Ulysses"));
    assert_eq!(backend.gets.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_detail_renders_a_fetch_failure() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut detail = BookDetail::new(api, 42);
    detail.mount().await;

    assert_eq!(detail.state().error(), Some("HTTP 404"));
    assert!(detail.render().starts_with("Error: HTTP 404"));
}

#[tokio::test]
async fn editing_a_missing_book_sends_the_admin_back() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut form = EditBookForm::new(api, 42);
    assert_eq!(
        form.load().await,
        EditLoad::Missing {
            alert: "Book not found".to_string(),
            redirect: pages::ALL_BOOKS_ROUTE,
        }
    );
}

#[tokio::test]
async fn edit_puts_the_full_record() {
    let backend = Backend::with_books(catalog());
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut form = EditBookForm::new(api, 3);
    assert_eq!(form.load().await, EditLoad::Loaded);
    assert_eq!(form.draft().title, "Ulysses");

    form.set(Field::Title, "");
    assert_eq!(form.save().await, SaveOutcome::Invalid);
    assert_eq!(backend.puts.load(Ordering::SeqCst), 0);

    form.set(Field::Title, "Ulysses (annotated)");
    match form.save().await {
        SaveOutcome::Saved { redirect, .. } => assert_eq!(redirect, pages::ALL_BOOKS_ROUTE),
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(backend.puts.load(Ordering::SeqCst), 1);

    let stored = backend.books.lock().unwrap()[2].clone();
    assert_eq!(stored["title"], json!("Ulysses (annotated)"));
    assert_eq!(stored["isbn"], json!("978-3"));
    assert_eq!(stored["created_at"], json!("2024-02-01T10:00:00Z"));
}

#[tokio::test]
async fn back_office_redirects_anonymous_visitors() {
    let backend = Backend::with_books(catalog());
    let api = serve(backend.clone()).await;
    let settings = Settings::default();
    let session = Session::anonymous();
    let services = Services {
        settings: &settings,
        api: &api,
        session: &session,
    };

    let visit = pages::registry()
        .open(pages::ALL_BOOKS_ROUTE, services, None)
        .await
        .unwrap();

    assert_eq!(visit.path, LOGIN_ROUTE);
    assert_eq!(visit.redirected_from.as_deref(), Some(pages::ALL_BOOKS_ROUTE));
    assert_eq!(backend.lists.load(Ordering::SeqCst), 0);

    let admin = Session::admin();
    let visit = pages::registry()
        .open(
            pages::ALL_BOOKS_ROUTE,
            Services {
                session: &admin,
                ..services
            },
            None,
        )
        .await
        .unwrap();
    assert!(visit.redirected_from.is_none());
    assert!(visit.body.contains("Beloved"));
}

fn fill(form: &mut AddBookForm) {
    for (field, value) in [
        (Field::Title, "Dune Messiah"),
        (Field::Author, "Frank Herbert"),
        (Field::Isbn, "9780593098233"),
        (Field::Year, "1969"),
        (Field::Price, "320.50"),
        (Field::Category, "Fiction"),
        (Field::Pages, "256"),
    ] {
        form.set(field, value);
    }
}

#[tokio::test]
async fn failed_create_keeps_the_draft() {
    let backend = Backend::with_books(catalog());
    backend.fail_post.store(true, Ordering::SeqCst);
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut form = AddBookForm::new(api);
    fill(&mut form);

    assert_eq!(form.submit().await, SubmitOutcome::Failed);
    assert_eq!(backend.posts.load(Ordering::SeqCst), 1);
    assert_eq!(
        form.submit_error(),
        Some("An error occurred while adding the book: HTTP 500")
    );
    assert!(form.errors().is_empty());
    assert!(form.success_message().is_none());
    assert_eq!(form.draft().title, "Dune Messiah");
    assert_eq!(form.draft().pages, "256");
    assert!(form.render().contains("HTTP 500"));
}

#[tokio::test]
async fn failed_update_alerts_and_stays() {
    let backend = Backend::with_books(catalog());
    backend.fail_put.store(true, Ordering::SeqCst);
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut form = EditBookForm::new(api, 3);
    assert_eq!(form.load().await, EditLoad::Loaded);
    form.set(Field::Title, "Ulysses (annotated)");

    assert_eq!(
        form.save().await,
        SaveOutcome::Failed {
            alert: SAVE_FAILED_ALERT.to_string()
        }
    );
    assert_eq!(backend.puts.load(Ordering::SeqCst), 1);
    assert_eq!(form.draft().title, "Ulysses (annotated)");
    assert_eq!(form.state().data().map(|book| book.title.as_str()), Some("Ulysses"));
    assert_eq!(backend.books.lock().unwrap()[2]["title"], json!("Ulysses"));
}

#[tokio::test]
async fn string_and_null_numbers_still_list() {
    let backend = Backend::with_books(vec![
        json!({ "id": 1, "title": "Dune", "year": "1965", "price": "350.00" }),
        json!({ "id": 2, "title": "Emma", "year": null, "price": 120 }),
    ]);
    let api = BooksApi::new(serve(backend.clone()).await);

    let mut list = BookList::new(api);
    list.mount().await;

    let books = list.state().data().unwrap();
    assert_eq!(ids(books), vec![1, 2]);
    assert_eq!(books[0].price, 350.0);
    assert_eq!(books[0].year, 1965);
    assert_eq!(books[1].year, 0);
    let rendered = list.render();
    assert!(rendered.contains("Dune"));
    assert!(rendered.contains("฿350.00"));
    assert!(!rendered.starts_with("Error"));
}

#[tokio::test]
async fn missing_book_on_the_edit_route_returns_to_the_table() {
    let backend = Backend::with_books(catalog());
    let api = serve(backend.clone()).await;
    let settings = Settings::default();
    let admin = Session::admin();
    let services = Services {
        settings: &settings,
        api: &api,
        session: &admin,
    };

    let missing = pages::edit_book_path(42);
    let visit = pages::registry()
        .open(&missing, services, None)
        .await
        .unwrap();

    assert_eq!(visit.path, pages::ALL_BOOKS_ROUTE);
    assert_eq!(visit.redirected_from.as_deref(), Some(missing.as_str()));
    assert_eq!(visit.alert.as_deref(), Some("Book not found"));
    assert!(visit.body.contains("Beloved"));
    assert_eq!(backend.gets.load(Ordering::SeqCst), 1);
    assert_eq!(backend.lists.load(Ordering::SeqCst), 1);
}
