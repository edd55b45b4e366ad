use std::fs::File;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::header::{DATE, LOCATION, ORIGIN, REFERER};
use scraper::Html;

use crate::error::CfError;
use crate::macros::select;
use crate::model::SubmitRequest;
use crate::service::scrape::scrape_error_message;
use crate::service::session::Session;
use crate::Console;

/// Performs the multipart submit POST through an authenticated session.
#[derive(Debug)]
pub struct SolutionSubmitter<'a> {
    session: &'a Session,
}

impl<'a> SolutionSubmitter<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// POSTs the solution with a token freshly scraped from the submit
    /// form page. Success is exactly a redirect to the arena's `my`
    /// submissions page; anything else is a rejection, surfacing the
    /// site's inline source error when one is present (wrong language id,
    /// resubmitted identical solution, oversized file).
    ///
    /// Returns the server-reported `Date` header verbatim; it is a display
    /// string, not a parsed timestamp.
    pub fn submit(
        &self,
        token: &str,
        request: &SubmitRequest,
        cnsl: &mut Console,
    ) -> Result<String, CfError> {
        let submit_path = format!("/{}/{}/submit", request.arena(), request.contest_id());
        let mut url = self.session.url_of(&submit_path)?;
        url.query_pairs_mut().append_pair("csrf_token", token);
        let referer = self.session.url_of(&submit_path)?;

        let file = File::open(request.code_file()).map_err(|err| {
            CfError::Validation(format!(
                "Could not open solution file '{}' : {}",
                request.code_file().display(),
                err
            ))
        })?;
        let file_name = request
            .code_file()
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("solution.txt")
            .to_owned();
        // The source part streams from disk; large files are not buffered
        // into memory.
        let form = Form::new()
            .text("csrf_token", token.to_owned())
            .text("action", "submitSolutionFormSubmitted")
            .text("contestId", request.contest_id().to_string())
            .text("submittedProblemIndex", request.problem_index().to_string())
            .text("programTypeId", request.lang_id().to_string())
            .part("source", Part::reader(file).file_name(file_name))
            .text("tabSize", "4")
            .text("sourceFile", "");

        let res = self.session.send_pretty(
            self.session
                .post(url)
                .header(ORIGIN, self.session.origin())
                .header(REFERER, referer.as_str())
                .multipart(form),
            cnsl,
        )?;

        let location = res
            .headers()
            .get(LOCATION)
            .and_then(|val| val.to_str().ok())
            .map(ToOwned::to_owned);
        let expected = format!("/{}/{}/my", request.arena(), request.contest_id());
        if location.as_deref() != Some(expected.as_str()) {
            let body = res.text().unwrap_or_default();
            let html = Html::parse_document(&body);
            let message = scrape_error_message(&html, select!(".for__source"))
                .unwrap_or_else(|| "Please check your options".to_owned());
            return Err(CfError::SubmissionRejected(message));
        }

        let submitted_at = res
            .headers()
            .get(DATE)
            .and_then(|val| val.to_str().ok())
            .unwrap_or("unknown time")
            .to_owned();
        Ok(submitted_at)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use reqwest::Url;

    use super::*;

    fn test_request(contest_id: u64, is_gym: bool) -> (tempfile::NamedTempFile, SubmitRequest) {
        let mut file = tempfile::Builder::new().suffix(".cpp").tempfile().unwrap();
        file.write_all(b"int main() { return 0; }").unwrap();
        let request = SubmitRequest::new(
            contest_id,
            "A",
            file.path().to_owned(),
            None,
            false,
            false,
            false,
            1,
            5000,
            is_gym,
        )
        .unwrap();
        (file, request)
    }

    fn session_for(server: &mockito::ServerGuard) -> Session {
        Session::with_base_url(Url::parse(&server.url()).unwrap()).unwrap()
    }

    #[test]
    fn redirect_to_my_page_is_success() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/contest/10/submit")
            .match_query(mockito::Matcher::UrlEncoded(
                "csrf_token".into(),
                "tok2".into(),
            ))
            .with_status(302)
            .with_header("Location", "/contest/10/my")
            .with_header("Date", "Wed, 21 Oct 2015 07:28:00 GMT")
            .create();

        let (_file, request) = test_request(10, false);
        let session = session_for(&server);
        let mut cnsl = Console::sink();
        let submitted_at = SolutionSubmitter::new(&session)
            .submit("tok2", &request, &mut cnsl)
            .unwrap();
        mock.assert();
        assert_eq!(submitted_at, "Wed, 21 Oct 2015 07:28:00 GMT");
    }

    #[test]
    fn gym_request_expects_gym_redirect() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/gym/100001/submit")
            .match_query(mockito::Matcher::Any)
            .with_status(302)
            .with_header("Location", "/gym/100001/my")
            .create();

        let (_file, request) = test_request(100_001, true);
        let session = session_for(&server);
        let mut cnsl = Console::sink();
        assert!(SolutionSubmitter::new(&session)
            .submit("tok2", &request, &mut cnsl)
            .is_ok());
    }

    #[test]
    fn redirect_elsewhere_is_rejection() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/contest/10/submit")
            .match_query(mockito::Matcher::Any)
            .with_status(302)
            .with_header("Location", "/contest/10/submit")
            .create();

        let (_file, request) = test_request(10, false);
        let session = session_for(&server);
        let mut cnsl = Console::sink();
        let err = SolutionSubmitter::new(&session)
            .submit("tok2", &request, &mut cnsl)
            .unwrap_err();
        assert!(matches!(err, CfError::SubmissionRejected(_)));
    }

    #[test]
    fn rejection_surfaces_site_source_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/contest/10/submit")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(
                r#"<form><span class="error for__source">
                    You have submitted exactly the same code before
                </span></form>"#,
            )
            .create();

        let (_file, request) = test_request(10, false);
        let session = session_for(&server);
        let mut cnsl = Console::sink();
        match SolutionSubmitter::new(&session)
            .submit("tok2", &request, &mut cnsl)
            .unwrap_err()
        {
            CfError::SubmissionRejected(message) => {
                assert!(message.contains("exactly the same code"))
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
