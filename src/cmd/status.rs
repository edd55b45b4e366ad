use std::fmt;
use std::time::Duration;

use serde::Serialize;
use structopt::StructOpt;

use crate::api::StatusClient;
use crate::cmd::{Outcome, Run};
use crate::config::CredentialStore;
use crate::model::{WATCH_COUNT_MAX, WATCH_DELAY_FLOOR};
use crate::service::{render_status_table, FetchStatus as _, StatusPoller, SubmissionWatcher};
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct StatusOpt {
    /// Handle to query (defaults to the remembered one)
    #[structopt(name = "handle", long)]
    handle: Option<String>,
    /// Narrows the query to one contest
    #[structopt(name = "contest", long)]
    contest_id: Option<u64>,
    /// Number of recent submissions to show
    #[structopt(name = "count", short = "c", long, default_value = "1")]
    count: u64,
    /// Keeps polling until every shown verdict is final
    #[structopt(name = "watch", short = "w", long)]
    watch: bool,
    /// Delay between polls in milliseconds
    #[structopt(name = "delay", long, default_value = "5000")]
    delay: u64,
    /// Remembers the queried handle for later runs
    #[structopt(name = "remember", short = "r", long)]
    remember: bool,
}

impl StatusOpt {
    /// Out-of-range watch options are clamped silently, the same way the
    /// submit path clamps them.
    fn watch_params(&self) -> (u64, Duration) {
        (
            self.count.min(WATCH_COUNT_MAX).max(1),
            Duration::from_millis(self.delay).max(WATCH_DELAY_FLOOR),
        )
    }

    fn resolve_handle(&self, store: &CredentialStore, cnsl: &mut Console) -> Result<String> {
        if let Some(handle) = &self.handle {
            return Ok(handle.clone());
        }
        if let Some(handle) = store.load_handle()? {
            return Ok(handle);
        }
        let handle = cnsl.get_env_or_prompt_and_read("CF_HANDLE", "handle: ", false)?;
        Ok(handle.trim().to_owned())
    }
}

impl Run for StatusOpt {
    fn run(&self, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let store = CredentialStore::new()?;
        let handle = self.resolve_handle(&store, cnsl)?;
        if handle.is_empty() {
            return Err(crate::CfError::Validation("handle must not be empty".to_owned()).into());
        }
        if self.remember {
            store.save_handle(&handle)?;
        }

        let (count, delay) = self.watch_params();
        let client = StatusClient::new()?;
        let mut poller = StatusPoller::new(&client, &handle, self.contest_id, count);

        let runs = if self.watch {
            SubmissionWatcher::new(poller, delay).watch(cnsl)?
        } else {
            let runs = poller.fetch()?;
            render_status_table(&runs, cnsl)?;
            runs
        };

        Ok(Box::new(StatusOutcome {
            handle,
            shown: runs.len(),
        }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StatusOutcome {
    handle: String,
    shown: usize,
}

impl fmt::Display for StatusOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Showed {} submissions of {}", self.shown, self.handle)
    }
}

impl Outcome for StatusOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
