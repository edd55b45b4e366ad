use maplit::hashmap;
use reqwest::header::{LOCATION, ORIGIN, REFERER};
use scraper::Html;

use crate::config::{CredentialStore, Credentials};
use crate::error::CfError;
use crate::macros::select;
use crate::service::page::LoginPageBuilder;
use crate::service::scrape::scrape_error_message;
use crate::service::session::Session;
use crate::Console;

/// Performs the login POST and settles the credential store afterwards.
#[derive(Debug)]
pub struct SessionAuthenticator<'a> {
    session: &'a Session,
    store: &'a CredentialStore,
}

impl<'a> SessionAuthenticator<'a> {
    pub fn new(session: &'a Session, store: &'a CredentialStore) -> Self {
        Self { session, store }
    }

    /// POSTs the login form with a token freshly scraped from the login
    /// page. Success is exactly a redirect to the site root; anything else
    /// is an authentication failure, surfacing the site's inline error
    /// message when one is present. Never retried.
    ///
    /// On success, `remember` persists the credentials and `logout` clears
    /// them; request validation guarantees at most one flag is set.
    pub fn login(
        &self,
        token: &str,
        credentials: &Credentials,
        remember: bool,
        logout: bool,
        cnsl: &mut Console,
    ) -> Result<(), CfError> {
        let url = self.session.url_of(LoginPageBuilder::PATH)?;
        let payload = hashmap!(
            "csrf_token" => token,
            "action" => "enter",
            "handle" => credentials.handle.as_str(),
            "password" => credentials.password.as_str(),
        );
        let res = self.session.send_pretty(
            self.session
                .post(url.clone())
                .header(ORIGIN, self.session.origin())
                .header(REFERER, url.as_str())
                .form(&payload),
            cnsl,
        )?;

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|val| val.to_str().ok())
            .map(ToOwned::to_owned);
        if location.as_deref() != Some("/") {
            let body = res.text().unwrap_or_default();
            let html = Html::parse_document(&body);
            let message = scrape_error_message(&html, select!("form .for__password"))
                .unwrap_or_else(|| "Please check your handle and password".to_owned());
            return Err(CfError::Auth(message));
        }

        if remember {
            self.store.save(credentials)?;
        } else if logout {
            self.store.clear()?;
        }
        Ok(())
    }
}
