use reqwest::Url;
use scraper::{ElementRef, Html};

use crate::error::CfError;
use crate::service::scrape::{ExtractCsrfToken, Scrape};
use crate::service::session::Session;
use crate::Console;

pub trait HasUrl {
    fn url(&self) -> Result<Url, CfError>;
}

/// GETs a page through the session and parses its HTML. Cookies set by a
/// prior request in the same session are sent along.
pub trait FetchHtml: HasUrl {
    fn session(&self) -> &Session;

    fn fetch_html(&self, cnsl: &mut Console) -> Result<Html, CfError> {
        let session = self.session();
        let res = session.send_pretty(session.get(self.url()?), cnsl)?;
        let text = res.text()?;
        Ok(Html::parse_document(&text))
    }
}

/// The login form page; source of the csrf token for the login POST.
#[derive(Debug, Clone)]
pub struct LoginPageBuilder<'a> {
    session: &'a Session,
}

impl<'a> LoginPageBuilder<'a> {
    pub const PATH: &'static str = "/enter";

    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn build(self, cnsl: &mut Console) -> Result<LoginPage<'a>, CfError> {
        let content = self.fetch_html(cnsl)?;
        Ok(LoginPage {
            builder: self,
            content,
        })
    }
}

impl HasUrl for LoginPageBuilder<'_> {
    fn url(&self) -> Result<Url, CfError> {
        self.session.url_of(Self::PATH)
    }
}

impl FetchHtml for LoginPageBuilder<'_> {
    fn session(&self) -> &Session {
        self.session
    }
}

#[derive(Debug, Clone)]
pub struct LoginPage<'a> {
    builder: LoginPageBuilder<'a>,
    content: Html,
}

impl HasUrl for LoginPage<'_> {
    fn url(&self) -> Result<Url, CfError> {
        self.builder.url()
    }
}

impl Scrape for LoginPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

impl ExtractCsrfToken for LoginPage<'_> {}

/// The problemset submit form page, loaded after login within the same
/// session; source of the csrf token for the submit POST. The login token
/// cannot be reused here.
#[derive(Debug, Clone)]
pub struct SubmitPageBuilder<'a> {
    session: &'a Session,
}

impl<'a> SubmitPageBuilder<'a> {
    pub const PATH: &'static str = "/problemset/submit";

    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    pub fn build(self, cnsl: &mut Console) -> Result<SubmitPage<'a>, CfError> {
        let content = self.fetch_html(cnsl)?;
        Ok(SubmitPage {
            builder: self,
            content,
        })
    }
}

impl HasUrl for SubmitPageBuilder<'_> {
    fn url(&self) -> Result<Url, CfError> {
        self.session.url_of(Self::PATH)
    }
}

impl FetchHtml for SubmitPageBuilder<'_> {
    fn session(&self) -> &Session {
        self.session
    }
}

#[derive(Debug, Clone)]
pub struct SubmitPage<'a> {
    builder: SubmitPageBuilder<'a>,
    content: Html,
}

impl HasUrl for SubmitPage<'_> {
    fn url(&self) -> Result<Url, CfError> {
        self.builder.url()
    }
}

impl Scrape for SubmitPage<'_> {
    fn elem(&self) -> ElementRef {
        self.content.root_element()
    }
}

impl ExtractCsrfToken for SubmitPage<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_page_scrapes_token_from_mock() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/enter")
            .with_status(200)
            .with_body(r#"<form><input name="csrf_token" value="tok-1"/></form>"#)
            .create();

        let session = Session::with_base_url(Url::parse(&server.url()).unwrap()).unwrap();
        let mut cnsl = Console::sink();
        let page = LoginPageBuilder::new(&session).build(&mut cnsl).unwrap();
        mock.assert();
        assert_eq!(page.extract_csrf_token().unwrap(), "tok-1");
    }

    #[test]
    fn token_missing_from_page_is_fatal() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/problemset/submit")
            .with_status(200)
            .with_body("<html><body>maintenance</body></html>")
            .create();

        let session = Session::with_base_url(Url::parse(&server.url()).unwrap()).unwrap();
        let mut cnsl = Console::sink();
        let page = SubmitPageBuilder::new(&session).build(&mut cnsl).unwrap();
        assert!(matches!(
            page.extract_csrf_token(),
            Err(CfError::TokenNotFound)
        ));
    }
}
