use std::{fmt, io};

use anyhow::Context as _;
use serde::Serialize;
use structopt::StructOpt;

use crate::{Console, OutputFormat, Result};

mod lang;
mod status;
mod submit;

pub use lang::{ExtOpt, ExtOutcome, LangOpt, LangOutcome};
pub use status::{StatusOpt, StatusOutcome};
pub use submit::{SubmitOpt, SubmitOutcome};

pub trait Outcome: OutcomeSerialize {
    fn is_error(&self) -> bool;
}

pub trait OutcomeSerialize: fmt::Display + fmt::Debug {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()>;

    fn print(&self, stdout: &mut dyn io::Write, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Default => writeln!(stdout, "{}", self)?,
            OutputFormat::Debug => writeln!(stdout, "{:?}", self)?,
            OutputFormat::Json => self.write_json(stdout)?,
            OutputFormat::Yaml => self.write_yaml(stdout)?,
        }
        Ok(())
    }
}

impl<T: Serialize + fmt::Display + fmt::Debug> OutcomeSerialize for T {
    fn write_json(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_json::to_writer_pretty(writer, self).context("Could not print outcome as json")
    }

    fn write_yaml(&self, writer: &mut dyn io::Write) -> Result<()> {
        serde_yaml::to_writer(writer, self).context("Could not print outcome as yaml")
    }
}

pub trait Run {
    fn run(&self, cnsl: &mut Console) -> Result<Box<dyn Outcome>>;
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub enum Cmd {
    /// Submits a solution file to a contest problem
    Submit(SubmitOpt),
    /// Shows recent submission statuses of a user
    Status(StatusOpt),
    /// Lists supported programming languages
    Lang(LangOpt),
    /// Lists file extensions with their default languages
    Ext(ExtOpt),
}

impl Run for Cmd {
    fn run(&self, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        match self {
            Self::Submit(opt) => opt.run(cnsl),
            Self::Status(opt) => opt.run(cnsl),
            Self::Lang(opt) => opt.run(cnsl),
            Self::Ext(opt) => opt.run(cnsl),
        }
    }
}
