use std::io;
use std::process::ExitCode;

use clap::Parser;
use otctl_fleet::Fleet;
use otctl_runner::{init_tracing, Args, Console, RunnerResult};
use otctl_transport::SystemPortFactory;
use tracing::info;

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(&args.log_level);
    otctl_metrics::describe_metrics();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("otctl: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> RunnerResult<()> {
    let config = args.load_config()?;
    info!(
        "channel {} pan id {} profile {:?}",
        config.network.channel, config.network.pan_id, config.serial.profile
    );

    let fleet = Fleet::new(Box::new(SystemPortFactory), config)?;
    let mut console = Console::new(fleet);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.exec {
        Some(line) => {
            console.run_line(line, &mut out)?;
        }
        None => console.run(io::stdin().lock(), &mut out)?,
    }
    Ok(())
}
