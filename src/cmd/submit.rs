use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use structopt::StructOpt;

use crate::api::StatusClient;
use crate::cmd::{Outcome, Run};
use crate::config::CredentialStore;
use crate::model::SubmitRequest;
use crate::service::{StatusPoller, SubmissionWatcher, SubmitPipeline};
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct SubmitOpt {
    /// Id of the contest (or gym with --gym)
    #[structopt(name = "contest")]
    contest_id: u64,
    /// Index of the problem within the contest (e.g. A, B1)
    #[structopt(name = "problem")]
    problem_index: String,
    /// Path to the solution source file
    #[structopt(name = "file", parse(from_os_str))]
    file: PathBuf,
    /// Overrides the language id inferred from the file extension
    #[structopt(long)]
    lang: Option<u64>,
    /// Prompts for credentials and remembers them on success
    #[structopt(name = "remember", short = "r", long)]
    remember: bool,
    /// Forgets remembered credentials after this run
    #[structopt(name = "logout", short = "l", long)]
    logout: bool,
    /// Watches the verdict until it is final
    #[structopt(name = "watch", short = "w", long)]
    watch: bool,
    /// Number of recent submissions to track while watching
    #[structopt(name = "count", short = "c", long, default_value = "1")]
    count: u64,
    /// Delay between verdict polls in milliseconds
    #[structopt(name = "delay", long, default_value = "5000")]
    delay: u64,
    /// Submits to a gym contest
    #[structopt(name = "gym", long)]
    gym: bool,
}

impl Run for SubmitOpt {
    fn run(&self, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let request = SubmitRequest::new(
            self.contest_id,
            &self.problem_index,
            self.file.clone(),
            self.lang,
            self.remember,
            self.logout,
            self.watch,
            self.count,
            self.delay,
            self.gym,
        )?;

        let store = CredentialStore::new()?;
        let pipeline = SubmitPipeline::new(&store)?;
        let receipt = pipeline.submit(&request, cnsl)?;

        if request.watch() {
            let client = StatusClient::new()?;
            let poller = StatusPoller::new(
                &client,
                receipt.handle(),
                Some(request.contest_id()),
                request.watch_count(),
            );
            let mut watcher = SubmissionWatcher::new(poller, request.watch_delay());
            watcher.watch(cnsl)?;
        }

        Ok(Box::new(SubmitOutcome {
            handle: receipt.handle().to_owned(),
            contest_id: request.contest_id(),
            problem_index: request.problem_index().to_string(),
            submitted_at: receipt.submitted_at().to_owned(),
        }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubmitOutcome {
    handle: String,
    contest_id: u64,
    problem_index: String,
    submitted_at: String,
}

impl fmt::Display for SubmitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Submitted {}{} as {} at {}",
            self.contest_id, self.problem_index, self.handle, self.submitted_at
        )
    }
}

impl Outcome for SubmitOutcome {
    fn is_error(&self) -> bool {
        false
    }
}
