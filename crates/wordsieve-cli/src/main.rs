mod commands;
mod input_output;
mod logging;

use clap::Parser;
use commands::Commands;
pub use logging::LogArgs;

/// wordsieve: vocabulary selection, embedding pruning, and lexical data.
#[derive(clap::Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Subcommand to run.
    #[clap(subcommand)]
    pub command: Commands,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    args.command.run()
}
