// Command line front end for the zone creator.

use anyhow::Result;
use clap::Parser;

use zonecreator::core::{run, CliArgs};
use zonecreator::utils::logger::init_custom_logger;

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    init_custom_logger(cli_args.debug);

    let output = run(&cli_args, std::io::stdin().lock())?;
    println!("{output}");
    Ok(())
}
