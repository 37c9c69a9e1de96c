use std::io::{self, BufRead, Write};

use anyhow::{bail, Context};
use bookstore_app::books::{BooksApi, Field, FieldErrors};
use bookstore_app::pages::{
    self,
    add_book::{AddBookForm, SubmitOutcome},
    all_books::{AllBooks, DeleteOutcome},
    edit_book::{EditBookForm, EditLoad, SaveOutcome},
    featured::FeaturedBooks,
    login,
    newest::NewBooks,
};
use bookstore_authz::{Credentials, Session};
use bookstore_http::ApiClient;
use bookstore_kernel::{settings::Settings, Services};
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bookstore", version, about = "Browse and manage the bookstore catalog")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a page by path, e.g. `/books/3`
    Open { path: String },
    /// Featured books and new arrivals
    Home,
    /// Three random books
    Featured,
    /// The five newest books
    Newest,
    /// Every book in the catalog
    List,
    /// One book by id
    Show { id: u64 },
    /// Sign in to the back office
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Sign out of the back office
    Logout,
    /// Every page and its route
    Routes,
    /// Back-office catalog management
    #[command(subcommand)]
    Admin(AdminCommand),
}

#[derive(Subcommand)]
enum AdminCommand {
    /// Table of every book
    List,
    /// Add a book
    Add(BookFields),
    /// Edit a book; only the given fields change
    Edit {
        id: u64,
        #[command(flatten)]
        fields: BookFields,
    },
    /// Delete a book
    Delete {
        id: u64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Default)]
struct BookFields {
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    author: Option<String>,
    #[arg(long)]
    isbn: Option<String>,
    #[arg(long)]
    year: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    pages: Option<String>,
}

impl BookFields {
    fn into_values(self) -> Vec<(Field, String)> {
        [
            (Field::Title, self.title),
            (Field::Author, self.author),
            (Field::Isbn, self.isbn),
            (Field::Year, self.year),
            (Field::Price, self.price),
            (Field::Category, self.category),
            (Field::Pages, self.pages),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.map(|value| (field, value)))
        .collect()
    }
}

struct App {
    settings: Settings,
    api: ApiClient,
    session: Session,
}

impl App {
    fn bootstrap() -> anyhow::Result<Self> {
        let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
        bookstore_telemetry::init(&settings.telemetry)?;

        let session = settings.session.store().load()?;
        let api = ApiClient::new(&settings.api.client_config())?;

        tracing::debug!(
            env = ?settings.environment,
            api = %settings.api.base_url,
            admin = session.is_admin(),
            "bookstore cli ready"
        );
        Ok(Self {
            settings,
            api,
            session,
        })
    }

    fn books(&self) -> BooksApi {
        BooksApi::new(self.api.clone())
    }

    async fn open(&self, path: &str) -> anyhow::Result<()> {
        let services = Services {
            settings: &self.settings,
            api: &self.api,
            session: &self.session,
        };
        let visit = pages::registry().open(path, services, None).await?;
        if let Some(from) = &visit.redirected_from {
            eprintln!("{from} redirected to {}", visit.path);
        }
        if let Some(alert) = &visit.alert {
            eprintln!("{alert}");
        }
        println!("{}", visit.body);
        Ok(())
    }

    fn require_admin(&self) -> anyhow::Result<()> {
        self.session
            .require_admin()
            .with_context(|| "sign in with `bookstore login` first")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let app = App::bootstrap()?;

    match cli.command {
        Command::Open { path } => app.open(&path).await,
        Command::Home => app.open(pages::HOME_ROUTE).await,
        Command::Featured => {
            let mut featured = FeaturedBooks::new(app.books());
            featured.mount().await;
            println!("{}", featured.render());
            Ok(())
        }
        Command::Newest => {
            let mut newest = NewBooks::new(app.books());
            newest.mount().await;
            println!("{}", newest.render());
            Ok(())
        }
        Command::List => app.open(pages::BOOKS_ROUTE).await,
        Command::Show { id } => app.open(&pages::book_detail_path(id)).await,
        Command::Login { username, password } => {
            let (_, next) = login::login(&app.settings, &Credentials::new(username, password))?;
            println!("Signed in. Continue at {next}");
            Ok(())
        }
        Command::Logout => {
            let (_, next) = login::logout(&app.settings)?;
            println!("Signed out. Sign in again at {next}");
            Ok(())
        }
        Command::Routes => {
            let registry = pages::registry();
            for page in registry.pages() {
                println!("{:<32} {}", page.route(), page.name());
            }
            Ok(())
        }
        Command::Admin(command) => run_admin(&app, command).await,
    }
}

async fn run_admin(app: &App, command: AdminCommand) -> anyhow::Result<()> {
    match command {
        AdminCommand::List => app.open(pages::ALL_BOOKS_ROUTE).await,
        AdminCommand::Add(fields) => {
            app.require_admin()?;
            let mut form = AddBookForm::new(app.books());
            for (field, value) in fields.into_values() {
                form.set(field, value);
            }
            match form.submit().await {
                SubmitOutcome::Created(book) => {
                    if let Some(message) = form.success_message() {
                        println!("{message}");
                    }
                    println!("{}", pages::book_detail_path(book.id));
                    Ok(())
                }
                SubmitOutcome::Invalid => bail!(describe_errors(form.errors())),
                SubmitOutcome::Failed => {
                    bail!(form.submit_error().unwrap_or("failed to add book").to_string())
                }
            }
        }
        AdminCommand::Edit { id, fields } => {
            app.require_admin()?;
            let mut form = EditBookForm::new(app.books(), id);
            if let EditLoad::Missing { alert, redirect } = form.load().await {
                bail!("{alert} (back to {redirect})");
            }
            for (field, value) in fields.into_values() {
                form.set(field, value);
            }
            match form.save().await {
                SaveOutcome::Saved { alert, redirect } => {
                    println!("{alert}\nBack to {redirect}");
                    Ok(())
                }
                SaveOutcome::Invalid => bail!(describe_errors(form.errors())),
                SaveOutcome::Failed { alert } => bail!(alert),
            }
        }
        AdminCommand::Delete { id, yes } => {
            app.require_admin()?;
            let mut table = AllBooks::new(app.books());
            table.mount().await;
            match table.delete(id, |prompt| yes || confirm(prompt)).await {
                DeleteOutcome::Cancelled => {
                    println!("Nothing deleted.");
                    Ok(())
                }
                DeleteOutcome::Deleted { alert } => {
                    println!("{alert}\n\n{}", table.render());
                    Ok(())
                }
                DeleteOutcome::Failed { alert } => bail!(alert),
            }
        }
    }
}

fn describe_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {message}", field.name()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Ask on stderr, read the answer from stdin.
fn confirm(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}
