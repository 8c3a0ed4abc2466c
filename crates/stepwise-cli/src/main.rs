//! Stepwise CLI - play diagram walkthroughs in the terminal

mod cli;
mod snapshot;
mod terminal;

use clap::Parser;

fn main() {
    let cli_args = cli::Cli::parse();
    let app = cli::StepwiseApp::new();

    if let Err(e) = app.run(cli_args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
