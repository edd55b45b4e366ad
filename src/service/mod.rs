use std::io::Write as _;

use getset::Getters;
use lazy_static::lazy_static;
use reqwest::Url;

use crate::config::{CredentialStore, Credentials};
use crate::error::CfError;
use crate::model::SubmitRequest;
use crate::Console;

mod auth;
mod page;
mod scrape;
mod session;
mod submit;
mod watch;

pub use auth::SessionAuthenticator;
pub use page::{LoginPage, LoginPageBuilder, SubmitPage, SubmitPageBuilder};
pub use scrape::{ExtractCsrfToken, Scrape};
pub use session::Session;
pub use submit::SolutionSubmitter;
pub use watch::{render_status_table, FetchStatus, StatusPoller, SubmissionWatcher};

lazy_static! {
    pub static ref BASE_URL: Url = Url::parse("https://codeforces.com").unwrap();
}

/// Result of a successful submission: the server-reported timestamp string
/// and the handle the run was authenticated as, needed for the optional
/// verdict watch afterwards.
#[derive(Getters, Debug, Clone)]
#[get = "pub"]
pub struct SubmitReceipt {
    submitted_at: String,
    handle: String,
}

/// Orchestrates the authenticated submission waterfall.
///
/// Strictly sequential: resolve credentials, scrape the login-page token,
/// log in, scrape a fresh token from the submit form page, post the
/// solution. Each step short-circuits to the caller on failure; nothing is
/// retried. The session is created per run and dropped with it.
#[derive(Debug)]
pub struct SubmitPipeline<'a> {
    session: Session,
    store: &'a CredentialStore,
}

impl<'a> SubmitPipeline<'a> {
    pub fn new(store: &'a CredentialStore) -> Result<Self, CfError> {
        Ok(Self {
            session: Session::new()?,
            store,
        })
    }

    pub fn with_session(session: Session, store: &'a CredentialStore) -> Self {
        Self { session, store }
    }

    pub fn submit(
        &self,
        request: &SubmitRequest,
        cnsl: &mut Console,
    ) -> Result<SubmitReceipt, CfError> {
        let credentials = self.resolve_credentials(request, cnsl)?;

        let login_page = LoginPageBuilder::new(&self.session).build(cnsl)?;
        let token = login_page.extract_csrf_token()?.to_owned();
        SessionAuthenticator::new(&self.session, self.store).login(
            &token,
            &credentials,
            request.remember(),
            request.logout(),
            cnsl,
        )?;

        // The login token is single-use; the submit POST needs a fresh one
        // scraped from the submit form page within the same session.
        let submit_page = SubmitPageBuilder::new(&self.session).build(cnsl)?;
        let token = submit_page.extract_csrf_token()?.to_owned();
        let submitted_at = SolutionSubmitter::new(&self.session).submit(&token, request, cnsl)?;

        Ok(SubmitReceipt {
            submitted_at,
            handle: credentials.handle,
        })
    }

    /// Remembered credentials when present, interactive prompt otherwise.
    /// A `remember` run always re-prompts so that the stored password is
    /// refreshed rather than reused.
    fn resolve_credentials(
        &self,
        request: &SubmitRequest,
        cnsl: &mut Console,
    ) -> Result<Credentials, CfError> {
        if !request.remember() {
            if let Some(credentials) = self.store.load()? {
                writeln!(cnsl, "Saved handle found '{}'", credentials.handle).unwrap_or(());
                return Ok(credentials);
            }
        }

        let handle = read_input(cnsl, "CF_HANDLE", "handle: ", false)?;
        let password = read_input(cnsl, "CF_PASSWORD", "password: ", true)?;
        Ok(Credentials { handle, password })
    }
}

fn read_input(
    cnsl: &mut Console,
    env_name: &str,
    prompt: &str,
    is_password: bool,
) -> Result<String, CfError> {
    let value = cnsl
        .get_env_or_prompt_and_read(env_name, prompt, is_password)
        .map_err(|err| CfError::Validation(format!("Could not read console input : {}", err)))?;
    let value = value.trim().to_owned();
    if value.is_empty() {
        return Err(CfError::Validation(format!(
            "{}must not be empty",
            prompt
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use tempfile::tempdir;

    use super::*;

    static LOGIN_FORM: &str = r#"<form><input name="csrf_token" value="tok-login"/></form>"#;
    static SUBMIT_FORM: &str = r#"<form><input name="csrf_token" value="tok-submit"/></form>"#;

    fn solution_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".cpp").tempfile().unwrap();
        file.write_all(b"int main() {}").unwrap();
        file
    }

    fn request_for(file: &tempfile::NamedTempFile) -> SubmitRequest {
        SubmitRequest::new(
            10,
            "A",
            file.path().to_owned(),
            None,
            false,
            false,
            false,
            1,
            5000,
            false,
        )
        .unwrap()
    }

    fn remembered_store(dir: &tempfile::TempDir) -> CredentialStore {
        let store = CredentialStore::with_path(dir.path().join(".cfconfig"));
        store
            .save(&Credentials {
                handle: "tourist".to_owned(),
                password: "secret".to_owned(),
            })
            .unwrap();
        store
    }

    fn pipeline_against<'a>(
        server: &mockito::ServerGuard,
        store: &'a CredentialStore,
    ) -> SubmitPipeline<'a> {
        let session = Session::with_base_url(Url::parse(&server.url()).unwrap()).unwrap();
        SubmitPipeline::with_session(session, store)
    }

    #[test]
    fn full_waterfall_succeeds() {
        let mut server = mockito::Server::new();
        let login_get = server
            .mock("GET", "/enter")
            .with_status(200)
            .with_body(LOGIN_FORM)
            .create();
        let login_post = server
            .mock("POST", "/enter")
            .match_body(mockito::Matcher::UrlEncoded(
                "csrf_token".into(),
                "tok-login".into(),
            ))
            .with_status(302)
            .with_header("Location", "/")
            .create();
        let submit_get = server
            .mock("GET", "/problemset/submit")
            .with_status(200)
            .with_body(SUBMIT_FORM)
            .create();
        let submit_post = server
            .mock("POST", "/contest/10/submit")
            .match_query(mockito::Matcher::UrlEncoded(
                "csrf_token".into(),
                "tok-submit".into(),
            ))
            .with_status(302)
            .with_header("Location", "/contest/10/my")
            .with_header("Date", "Wed, 21 Oct 2015 07:28:00 GMT")
            .create();

        let dir = tempdir().unwrap();
        let store = remembered_store(&dir);
        let file = solution_file();
        let request = request_for(&file);
        let mut cnsl = Console::sink();
        let receipt = pipeline_against(&server, &store)
            .submit(&request, &mut cnsl)
            .unwrap();

        login_get.assert();
        login_post.assert();
        submit_get.assert();
        submit_post.assert();
        assert_eq!(receipt.submitted_at(), "Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(receipt.handle(), "tourist");
    }

    #[test]
    fn empty_store_falls_back_to_env_credentials() {
        let mut server = mockito::Server::new();
        let _login_get = server
            .mock("GET", "/enter")
            .with_status(200)
            .with_body(LOGIN_FORM)
            .create();
        let login_post = server
            .mock("POST", "/enter")
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("handle".into(), "petr".into()),
                mockito::Matcher::UrlEncoded("password".into(), "hunter2".into()),
            ]))
            .with_status(302)
            .with_header("Location", "/")
            .create();
        let _submit_get = server
            .mock("GET", "/problemset/submit")
            .with_status(200)
            .with_body(SUBMIT_FORM)
            .create();
        let submit_post = server
            .mock("POST", "/contest/10/submit")
            .match_query(mockito::Matcher::Any)
            .with_status(302)
            .with_header("Location", "/contest/10/my")
            .create();

        let dir = tempdir().unwrap();
        let store = CredentialStore::with_path(dir.path().join(".cfconfig"));
        let file = solution_file();
        let request = request_for(&file);
        let mut cnsl = Console::sink();
        std::env::set_var("CF_HANDLE", "petr");
        std::env::set_var("CF_PASSWORD", "hunter2");
        let result = pipeline_against(&server, &store).submit(&request, &mut cnsl);
        std::env::remove_var("CF_HANDLE");
        std::env::remove_var("CF_PASSWORD");

        let receipt = result.unwrap();
        login_post.assert();
        submit_post.assert();
        assert_eq!(receipt.handle(), "petr");
        // Nothing was persisted without the remember flag.
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn failed_login_stops_before_submit() {
        let mut server = mockito::Server::new();
        let _login_get = server
            .mock("GET", "/enter")
            .with_status(200)
            .with_body(LOGIN_FORM)
            .create();
        let _login_post = server
            .mock("POST", "/enter")
            .with_status(302)
            .with_header("Location", "/somethingelse")
            .create();
        let submit_get = server
            .mock("GET", "/problemset/submit")
            .expect(0)
            .create();
        let submit_post = server
            .mock("POST", "/contest/10/submit")
            .match_query(mockito::Matcher::Any)
            .expect(0)
            .create();

        let dir = tempdir().unwrap();
        let store = remembered_store(&dir);
        let file = solution_file();
        let request = request_for(&file);
        let mut cnsl = Console::sink();
        let err = pipeline_against(&server, &store)
            .submit(&request, &mut cnsl)
            .unwrap_err();

        assert!(matches!(err, CfError::Auth(_)));
        submit_get.assert();
        submit_post.assert();
    }

    #[test]
    fn token_missing_from_login_page_aborts_run() {
        let mut server = mockito::Server::new();
        let _login_get = server
            .mock("GET", "/enter")
            .with_status(200)
            .with_body("<html><body>down for maintenance</body></html>")
            .create();
        let login_post = server.mock("POST", "/enter").expect(0).create();

        let dir = tempdir().unwrap();
        let store = remembered_store(&dir);
        let file = solution_file();
        let request = request_for(&file);
        let mut cnsl = Console::sink();
        let err = pipeline_against(&server, &store)
            .submit(&request, &mut cnsl)
            .unwrap_err();

        assert!(matches!(err, CfError::TokenNotFound));
        login_post.assert();
    }
}
