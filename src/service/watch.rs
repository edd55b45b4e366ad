use std::io::{self, Write as _};
use std::thread;
use std::time::Duration;

use console::style;

use crate::api::StatusClient;
use crate::error::CfError;
use crate::model::{SubmissionRecord, Verdict};
use crate::Console;

static TABLE_HEADER: [&str; 6] = ["Id", "Problem", "Lang", "Verdict", "Time", "Memory"];

/// Source of submission-status snapshots for the watch loop.
pub trait FetchStatus {
    fn fetch(&mut self) -> Result<Vec<SubmissionRecord>, CfError>;
}

/// Fetches the most recent submissions of one user, optionally narrowed to
/// a contest.
///
/// Correlation with "the submission just made" is purely by recency and
/// count; a submission landing from elsewhere in between can shift which
/// entries are tracked.
#[derive(Debug)]
pub struct StatusPoller<'a> {
    client: &'a StatusClient,
    handle: &'a str,
    contest_id: Option<u64>,
    count: u64,
}

impl<'a> StatusPoller<'a> {
    pub fn new(
        client: &'a StatusClient,
        handle: &'a str,
        contest_id: Option<u64>,
        count: u64,
    ) -> Self {
        Self {
            client,
            handle,
            contest_id,
            count,
        }
    }
}

impl FetchStatus for StatusPoller<'_> {
    fn fetch(&mut self) -> Result<Vec<SubmissionRecord>, CfError> {
        let result = match self.contest_id {
            Some(contest_id) => self
                .client
                .contest_status(contest_id, self.handle, self.count),
            None => self.client.user_status(self.handle, self.count),
        };
        result.map_err(|err| match err {
            err @ CfError::VerdictPoll(_) => err,
            other => CfError::VerdictPoll(other.to_string()),
        })
    }
}

/// Polls a status source until every tracked submission carries a terminal
/// verdict.
///
/// Each tick re-renders the whole table with the latest known state, then
/// waits out the delay before the next poll. A failed poll terminates the
/// loop immediately; the next tick is always a fresh request, never a
/// retry of a failed one.
#[derive(Debug)]
pub struct SubmissionWatcher<S> {
    source: S,
    delay: Duration,
}

impl<S: FetchStatus> SubmissionWatcher<S> {
    pub fn new(source: S, delay: Duration) -> Self {
        Self { source, delay }
    }

    pub fn watch(&mut self, cnsl: &mut Console) -> Result<Vec<SubmissionRecord>, CfError> {
        loop {
            let runs = self.source.fetch()?;
            cnsl.clear().unwrap_or(());
            render_status_table(&runs, cnsl).unwrap_or(());
            if runs.iter().all(|run| !run.is_pending()) {
                return Ok(runs);
            }
            thread::sleep(self.delay);
        }
    }
}

fn verdict_cell(run: &SubmissionRecord, padded: String) -> String {
    match run.verdict() {
        None | Some(Verdict::Testing) => style(padded).white().bold().to_string(),
        Some(Verdict::Ok) => style(padded).green().bold().to_string(),
        Some(_) => style(padded).red().bold().to_string(),
    }
}

/// Writes the full submission table, one row per tracked submission.
pub fn render_status_table(runs: &[SubmissionRecord], cnsl: &mut Console) -> io::Result<()> {
    let rows: Vec<[String; 6]> = runs
        .iter()
        .map(|run| {
            let contest = run
                .contest_id()
                .map(|id| id.to_string())
                .unwrap_or_default();
            [
                run.id().to_string(),
                format!("{}{} - {}", contest, run.problem().index(), run.problem().name()),
                run.programming_language().clone(),
                run.verdict_text(),
                format!("{} MS", run.time_consumed_millis()),
                format!("{} KB", run.memory_kb()),
            ]
        })
        .collect();

    let mut widths = TABLE_HEADER.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.len());
        }
    }

    if let Some(handle) = runs.iter().find_map(|run| run.author_handle()) {
        writeln!(cnsl)?;
        writeln!(cnsl, "{}", style(format!("User: {}", handle)).green().bold())?;
    }

    let header = TABLE_HEADER
        .iter()
        .zip(widths.iter())
        .map(|(cell, width)| format!("{:<1$}", cell, width))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(cnsl, "{}", style(header).green())?;

    for (run, row) in runs.iter().zip(rows.iter()) {
        let line = row
            .iter()
            .zip(widths.iter())
            .enumerate()
            .map(|(i, (cell, width))| {
                let padded = format!("{:<1$}", cell, width);
                if i == 3 {
                    verdict_cell(run, padded)
                } else {
                    padded
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        writeln!(cnsl, "{}", line)?;
    }
    Ok(())
}
