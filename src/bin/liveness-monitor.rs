use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use stevedore::{DrillCommand, load_config, telemetry, wire_in_memory};

/// Watch an in-process coordination subtree driven by commands on stdin and
/// report its liveness.
#[derive(Parser, Debug)]
#[command(name = "liveness-monitor")]
struct Args {
    /// Liveness config file.
    #[arg(short, long, env = "STEVEDORE_CONFIG_PATH")]
    config: Option<PathBuf>,

    /// Reporting interval override, in seconds.
    #[arg(long, env = "STEVEDORE_INTERVAL_SECS")]
    interval_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    telemetry::init_tracing()?;
    let args = Args::parse();

    let config = load_config(args.config.as_deref(), args.interval_secs)?;
    let wiring = wire_in_memory(&config)?;
    let path = config.coordination.path.clone();
    wiring.monitor.start().await?;
    info!(
        %path,
        interval_secs = config.reporter.interval_secs,
        "reading drill commands from stdin"
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match DrillCommand::parse_line(&line) {
                    Ok(Some(command)) => {
                        if let Err(err) = command.apply(&wiring.client, &path) {
                            warn!(%line, "drill command failed: {err:#}");
                        }
                    }
                    Ok(None) => {}
                    Err(err) => warn!(%line, "{err:#}"),
                }
            }
        }
    }

    wiring.monitor.stop();
    info!(signal = %wiring.monitor.signal(), "liveness monitor stopped");
    Ok(())
}
