use anyhow::Result;
use clap::Parser;
use repocheck::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
