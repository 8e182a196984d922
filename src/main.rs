//! barbot CLI — drive a relay pump dispenser from the command line.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "barbot",
    version,
    about = "Motorized-pump drink dispenser — recipe catalog and relay dispense sequencing"
)]
struct Cli {
    #[command(subcommand)]
    command: barbot::cli::Commands,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    if let Err(e) = barbot::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
