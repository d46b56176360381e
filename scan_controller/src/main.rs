mod job;
mod transport;

use arm_scan_lib::{check_round_trip, init_tracing_with_default, CaptureIdAllocator, ControllerConfig, ScanCommand};
use clap::Parser;
use eyre::Result;
use job::{plan_job, render_commands, ScanJob, UnreachablePolicy};
use std::path::Path;
use tracing::{info, warn};
use transport::HttpTransport;

const DEFAULT_CONFIG_PATH: &str = "config/scan_job.toml";

#[derive(Parser)]
#[command(name = "scan_controller")]
#[command(about = "Scan the front and top of a box with the 5-axis arm and download the images")]
struct Cli {
    /// Controller password; required unless nothing is sent
    password: Option<String>,

    /// Job configuration (falls back to $SCAN_CONFIG, then config/scan_job.toml)
    #[arg(short, long)]
    config: Option<String>,

    /// Only send the planned sequence, not its joint-space mirror
    #[arg(long)]
    no_mirror: bool,

    /// Check forward/inverse kinematics against each other and exit
    #[arg(long)]
    check_kinematics: bool,

    /// Print the command sequence as JSON and exit
    #[arg(long)]
    emit_plan: bool,

    /// Log the wire commands without contacting the controller
    #[arg(long)]
    dry_run: bool,

    /// Drop unreachable waypoints instead of aborting
    #[arg(long)]
    skip_unreachable: bool,

    /// Leave the images on the controller after downloading them
    #[arg(long)]
    keep_images: bool,

    /// Log per-waypoint detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing_with_default(if cli.verbose { "debug" } else { "info" });

    let config = load_config(cli.config.as_deref())?;
    config.validate()?;

    let policy = if cli.skip_unreachable {
        UnreachablePolicy::Skip
    } else {
        UnreachablePolicy::Abort
    };

    let mut ids = CaptureIdAllocator::new();
    let commands = plan_job(&config.scan, !cli.no_mirror, policy, &mut ids)?;
    info!("Job has {} commands and {} captures", commands.len(), ids.issued());

    if cli.check_kinematics {
        check_round_trip(&commands)?;
        info!("Kinematics are consistent for all {} commands", commands.len());
        return Ok(());
    }

    if cli.emit_plan {
        println!("{}", serde_json::to_string_pretty(&commands)?);
        return Ok(());
    }

    let rendered = render_commands(&commands, policy)?;

    if cli.dry_run {
        for command in &rendered {
            info!("{:>4}: {}", command.index, command.wire);
        }
        info!("Delete: {}", ScanCommand::DeleteAll.to_wire()?);
        return Ok(());
    }

    let password = cli
        .password
        .ok_or_else(|| eyre::eyre!("A password is required to contact the controller"))?;
    let transport = HttpTransport::new(&config, password)?;
    let job = ScanJob::new(transport, &config.image_dir, &config.image_extension);
    let summary = job.run(&rendered, cli.keep_images)?;

    if summary.rejected > 0 {
        warn!("{} of {} commands were rejected", summary.rejected, summary.sent);
    }
    info!(
        "Scan complete: {} commands sent, {} images saved to {}",
        summary.sent,
        summary.images.len(),
        config.image_dir
    );
    Ok(())
}

fn load_config(cli_path: Option<&str>) -> Result<ControllerConfig> {
    let explicit = cli_path
        .map(str::to_string)
        .or_else(|| std::env::var("SCAN_CONFIG").ok());

    match explicit {
        Some(path) => {
            info!("Loading job configuration from {}", path);
            ControllerConfig::load_from_file(&path)
                .map_err(|e| eyre::eyre!("Failed to load scan config from {}: {}", path, e))
        }
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            info!("Loading job configuration from {}", DEFAULT_CONFIG_PATH);
            ControllerConfig::load_from_file(DEFAULT_CONFIG_PATH)
        }
        None => {
            info!("No configuration file found, using built-in job geometry");
            Ok(ControllerConfig::default())
        }
    }
}
