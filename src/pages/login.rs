use async_trait::async_trait;
use bookstore_authz::{AuthError, Credentials, Session};
use bookstore_kernel::{settings::Settings, Page, PageCtx, PageOutcome};

use crate::pages;

/// Sign in as admin and persist the session. Returns where to go next.
pub fn login(settings: &Settings, given: &Credentials) -> Result<(Session, &'static str), AuthError> {
    let session = settings
        .session
        .store()
        .login(given, &settings.auth.credentials())?;
    Ok((session, pages::ALL_BOOKS_ROUTE))
}

/// Forget the admin session. Returns where to go next.
pub fn logout(settings: &Settings) -> Result<(Session, &'static str), AuthError> {
    let session = settings.session.store().logout()?;
    Ok((session, bookstore_authz::LOGIN_ROUTE))
}

pub struct LoginPage;

#[async_trait]
impl Page for LoginPage {
    fn name(&self) -> &'static str {
        "login"
    }

    fn route(&self) -> &'static str {
        bookstore_authz::LOGIN_ROUTE
    }

    async fn open(&self, ctx: &PageCtx<'_>) -> anyhow::Result<PageOutcome> {
        if ctx.session.is_admin() {
            return Ok(format!(
                "Signed in as admin.\nGo to {} to manage the catalog.",
                pages::ALL_BOOKS_ROUTE
            )
            .into());
        }
        Ok("BookStore BackOffice\n\nAdmin sign-in required: provide a username and password."
            .to_string()
            .into())
    }
}
