use std::io::Write as _;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Url;

use crate::error::CfError;
use crate::service::BASE_URL;
use crate::Console;

static REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
static BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/51.0.2704.103 Safari/537.36";

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));
    headers
}

/// One authenticated browsing session against the judge.
///
/// Owns the cookie jar that carries the login across the token fetches and
/// the two POSTs. Created per pipeline run and threaded linearly through
/// the steps; never shared across runs and never persisted.
#[derive(Debug)]
pub struct Session {
    client: Client,
    base_url: Url,
}

impl Session {
    pub fn new() -> Result<Self, CfError> {
        Self::with_base_url(BASE_URL.clone())
    }

    /// Builds a session against a different origin; used by tests to talk
    /// to a local mock server.
    pub fn with_base_url(base_url: Url) -> Result<Self, CfError> {
        // Redirects are the success signal of the login and submit POSTs,
        // so the client must never follow them.
        let client = Client::builder()
            .default_headers(browser_headers())
            .cookie_store(true)
            .redirect(Policy::none())
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Serialized origin of the session (`scheme://host`), used for the
    /// Origin header of form POSTs.
    pub fn origin(&self) -> String {
        self.base_url.origin().ascii_serialization()
    }

    pub fn url_of(&self, path: &str) -> Result<Url, CfError> {
        self.base_url
            .join(path)
            .map_err(|err| CfError::Validation(format!("Invalid url path '{}' : {}", path, err)))
    }

    pub fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url)
    }

    pub fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url)
    }

    /// Sends the request, echoing a `METHOD url ... status` progress line
    /// to the console.
    pub fn send_pretty(
        &self,
        request: RequestBuilder,
        cnsl: &mut Console,
    ) -> Result<Response, CfError> {
        let req = request.build()?;
        write!(cnsl, "{:7} {} ... ", req.method().as_str(), req.url()).unwrap_or(());
        let result = self.client.execute(req);
        match &result {
            Ok(res) => writeln!(cnsl, "{}", res.status()),
            Err(_) => writeln!(cnsl, "failed"),
        }
        .unwrap_or(());
        result.map_err(CfError::from)
    }
}
