use std::fmt;
use std::io::Write as _;

use serde::Serialize;
use structopt::StructOpt;

use crate::cmd::{Outcome, Run};
use crate::lang::{self, Lang};
use crate::{Console, Result};

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct LangOpt {}

impl Run for LangOpt {
    fn run(&self, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        for lang in lang::LANGS {
            writeln!(cnsl, "{:>3}  {}", lang.id, lang.name)?;
        }
        Ok(Box::new(LangOutcome {
            langs: lang::LANGS.to_vec(),
        }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct LangOutcome {
    langs: Vec<Lang>,
}

impl fmt::Display for LangOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} languages", self.langs.len())
    }
}

impl Outcome for LangOutcome {
    fn is_error(&self) -> bool {
        false
    }
}

#[derive(StructOpt, Debug, Clone, PartialEq, Eq, Hash)]
#[structopt(rename_all = "kebab")]
pub struct ExtOpt {}

impl Run for ExtOpt {
    fn run(&self, cnsl: &mut Console) -> Result<Box<dyn Outcome>> {
        let exts: Vec<(String, Lang)> = lang::extensions()
            .map(|(ext, lang)| (ext.to_owned(), lang))
            .collect();
        for (ext, lang) in &exts {
            writeln!(cnsl, "{:>6}  {}", format!(".{}", ext), lang.name)?;
        }
        Ok(Box::new(ExtOutcome { exts }))
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ExtOutcome {
    exts: Vec<(String, Lang)>,
}

impl fmt::Display for ExtOutcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} extensions", self.exts.len())
    }
}

impl Outcome for ExtOutcome {
    fn is_error(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_lists_every_known_language() {
        let mut cnsl = Console::buf();
        let outcome = LangOpt {}.run(&mut cnsl).unwrap();
        let out = String::from_utf8(cnsl.take_buf().unwrap()).unwrap();
        assert!(out.contains("Rust 1.10"));
        assert!(out.contains("GNU G++ 5.1.0"));
        assert!(!outcome.is_error());
    }

    #[test]
    fn ext_lists_default_languages() {
        let mut cnsl = Console::buf();
        ExtOpt {}.run(&mut cnsl).unwrap();
        let out = String::from_utf8(cnsl.take_buf().unwrap()).unwrap();
        assert!(out.contains(".rs"));
        assert!(out.contains("Rust 1.10"));
    }
}
