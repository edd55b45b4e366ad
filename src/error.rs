use thiserror::Error;

/// Failure taxonomy of the submit pipeline and its collaborators.
///
/// Every service-layer contract returns one of these variants so that the
/// caller can tell a local input problem from a transport failure or a
/// rejection by the judge. None of them is retried automatically; the
/// pipeline stops at the first failing step.
#[derive(Error, Debug)]
pub enum CfError {
    /// Bad or missing local inputs, detected before any network I/O.
    #[error("{0}")]
    Validation(String),
    /// Credential file failure distinct from simple absence.
    #[error("Could not access config file : {0}")]
    ConfigIo(String),
    /// Transport failure on an HTTP call.
    #[error("Request failed")]
    Network(#[source] reqwest::Error),
    /// Request exceeded its fixed per-request timeout.
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),
    /// The page did not contain the expected csrf token input.
    /// Indicates the remote page shape changed or the session is invalid.
    #[error("Could not find csrf token on page")]
    TokenNotFound,
    /// Login rejected by the judge, with the site message when available.
    #[error("Login failed : {0}")]
    Auth(String),
    /// Submission rejected by remote validation, with the site message
    /// when available.
    #[error("Submission rejected : {0}")]
    SubmissionRejected(String),
    /// A status poll failed; terminates watching.
    #[error("Could not fetch submission status : {0}")]
    VerdictPoll(String),
}

impl From<reqwest::Error> for CfError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Network(err)
        }
    }
}
