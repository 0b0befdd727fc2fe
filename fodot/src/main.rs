mod command;
mod constants;
mod terminal;
mod utils;

use command::Command;
use structopt::StructOpt;

fn main() {
    if let Err(error) = Command::from_args().run() {
        eprintln!("fodot: {:#}", error);
        std::process::exit(1);
    }
}
