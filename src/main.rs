use std::time::Instant;

use cardio_prep::app::{run, RunConfig};
use cardio_prep::config::Args;
use cardio_prep::PrepError;
use clap::Parser;
use env_logger::{Builder, Env};
use log::{debug, info};
use sysinfo::{ProcessExt, System, SystemExt};

/// Resident memory of this process in bytes, 0 if it cannot be read.
fn monitor_memory() -> u64 {
    let pid = match sysinfo::get_current_pid() {
        Ok(pid) => pid,
        Err(_) => return 0,
    };
    let mut sys = System::new();
    sys.refresh_process(pid);
    sys.process(pid).map(|process| process.memory()).unwrap_or(0)
}

#[tokio::main]
async fn main() -> Result<(), PrepError> {
    let args = Args::parse();

    let env = Env::new().filter("CARDIO_LOG");
    Builder::new()
        .filter(Some("cardio_prep"), args.log_level())
        .parse_env(env)
        .init();

    debug!("Arguments {:#?}", args);

    let start_time = Instant::now();
    let start_memory = monitor_memory();

    let config = RunConfig::from_args(&args)?;
    let report = run(&config).await?;

    if args.report {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    let end_memory = monitor_memory();
    info!(
        "kept {} of {} rows, output at {}",
        report.kept,
        report.audit.rows,
        config.output.display()
    );
    info!("Time elapsed: {:?}", start_time.elapsed());
    info!(
        "Memory used: {} bytes",
        end_memory.saturating_sub(start_memory)
    );

    Ok(())
}
