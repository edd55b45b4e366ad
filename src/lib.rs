#![warn(clippy::all)]

#[macro_use]
extern crate strum;

use std::fmt;
use std::io;

use structopt::StructOpt;
use strum::VariantNames;

pub mod api;
pub mod cmd;
pub mod config;
pub mod console;
pub mod error;
pub mod lang;
pub mod macros;
pub mod model;
pub mod service;

use cmd::{Cmd, Run as _};

pub use console::Console;
pub use error::CfError;

pub type Error = anyhow::Error;
pub type Result<T> = anyhow::Result<T>;

#[derive(
    EnumString, EnumVariantNames, IntoStaticStr, Debug, Copy, Clone, PartialEq, Eq, Hash,
)]
#[strum(serialize_all = "kebab-case")]
pub enum OutputFormat {
    Default,
    Debug,
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.into())
    }
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(author, about)]
pub struct Opt {
    #[structopt(
        name = "output",
        long,
        global = true,
        default_value = OutputFormat::Default.into(),
        possible_values = &OutputFormat::VARIANTS,
    )]
    output: OutputFormat,
    #[structopt(subcommand)]
    cmd: Cmd,
}

impl Opt {
    pub fn run(&self, cnsl: &mut Console) -> Result<()> {
        let outcome = self.cmd.run(cnsl)?;

        let stdout = io::stdout();
        let mut stdout = stdout.lock();
        outcome.print(&mut stdout, self.output)?;

        if outcome.is_error() {
            Err(Error::msg("Command exited with error"))
        } else {
            Ok(())
        }
    }
}
