use std::env;
use std::time::Duration;

use lazy_static::lazy_static;
use reqwest::blocking::Client;
use reqwest::Url;

use crate::error::CfError;
use crate::model::{ApiResponse, SubmissionRecord};

/// Overrides the read-only API timeout, in milliseconds.
static API_TIMEOUT_ENV: &str = "CF_API_TIMEOUT_MS";
static DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

lazy_static! {
    static ref API_BASE_URL: Url = Url::parse("https://codeforces.com/api/").unwrap();
}

fn request_timeout() -> Duration {
    env::var(API_TIMEOUT_ENV)
        .ok()
        .and_then(|val| val.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_TIMEOUT)
}

/// Client for the judge's read-only submission-status endpoints.
///
/// Stateless JSON calls; carries no session and shares no cookies with the
/// submit pipeline.
#[derive(Debug, Clone)]
pub struct StatusClient {
    client: Client,
    base_url: Url,
}

impl StatusClient {
    pub fn new() -> Result<Self, CfError> {
        Self::with_base_url(API_BASE_URL.clone())
    }

    /// Points the client at a different API origin; used by tests to talk
    /// to a local mock server.
    pub fn with_base_url(mut base_url: Url) -> Result<Self, CfError> {
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let client = Client::builder().timeout(request_timeout()).build()?;
        Ok(Self { client, base_url })
    }

    /// `user.status`: the last `count` submissions of `handle` across all
    /// contests.
    pub fn user_status(
        &self,
        handle: &str,
        count: u64,
    ) -> Result<Vec<SubmissionRecord>, CfError> {
        let url = self.method_url("user.status", handle, count, None)?;
        self.get_status(url)
    }

    /// `contest.status`: the last `count` submissions of `handle` within
    /// one contest.
    pub fn contest_status(
        &self,
        contest_id: u64,
        handle: &str,
        count: u64,
    ) -> Result<Vec<SubmissionRecord>, CfError> {
        let url = self.method_url("contest.status", handle, count, Some(contest_id))?;
        self.get_status(url)
    }

    fn method_url(
        &self,
        method: &str,
        handle: &str,
        count: u64,
        contest_id: Option<u64>,
    ) -> Result<Url, CfError> {
        let mut url = self
            .base_url
            .join(method)
            .map_err(|err| CfError::VerdictPoll(err.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("handle", handle);
            pairs.append_pair("from", "1");
            pairs.append_pair("count", &count.to_string());
            if let Some(contest_id) = contest_id {
                pairs.append_pair("contestId", &contest_id.to_string());
            }
        }
        Ok(url)
    }

    fn get_status(&self, url: Url) -> Result<Vec<SubmissionRecord>, CfError> {
        let res = self.client.get(url).send()?;
        let http_status = res.status();
        let body: ApiResponse<Vec<SubmissionRecord>> = res.json()?;
        if !http_status.is_success() || body.status != "OK" {
            return Err(CfError::VerdictPoll(
                body.comment.unwrap_or_else(|| "HTTP error".to_owned()),
            ));
        }
        Ok(body.result.unwrap_or_default())
    }
}
