#![warn(clippy::all)]

use std::io::{self, Write as _};
use std::process;

use structopt::StructOpt;

use cf_cli::{Console, Opt};

fn main() {
    let opt = Opt::from_args();
    let mut cnsl = Console::term();
    if let Err(err) = opt.run(&mut cnsl) {
        io::stdout().flush().expect("Could not flush stdout");
        eprintln!("Error: {:?}", err);
        process::exit(1);
    }
}
