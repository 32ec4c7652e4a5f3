use std::process::ExitCode;

mod cli;
mod logging;

fn main() -> ExitCode {
    cli::Cli::execute()
}
