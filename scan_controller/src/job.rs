use crate::transport::CommandTransport;
use arm_scan_lib::{build_scan_commands, invert, CaptureId, CaptureIdAllocator, ScanCommand, ScanConfig};
use eyre::{Result, WrapErr};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// What to do with a waypoint the arm cannot reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreachablePolicy {
    /// Fail the whole job before anything is sent.
    Abort,
    /// Drop the waypoint together with the captures that follow it.
    Skip,
}

/// A command ready for the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCommand {
    /// Position in the planned sequence.
    pub index: usize,
    pub wire: String,
    pub capture: Option<CaptureId>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct JobSummary {
    pub sent: usize,
    pub rejected: usize,
    pub images: Vec<PathBuf>,
}

/// Drops waypoints the arm cannot reach, together with the captures that follow them.
pub fn retain_reachable(commands: &[ScanCommand]) -> Vec<ScanCommand> {
    let mut kept = Vec::with_capacity(commands.len());
    let mut skipping = false;

    for (index, command) in commands.iter().enumerate() {
        if skipping && matches!(command, ScanCommand::Capture(_)) {
            continue;
        }
        skipping = false;

        if let ScanCommand::Cartesian(pose) = command {
            if let Err(e) = pose.to_joint() {
                warn!("Dropping waypoint {}: {}", index, e);
                skipping = true;
                continue;
            }
        }
        kept.push(*command);
    }

    kept
}

/// Plans the job and, unless `mirror` is off, appends its joint-space mirror.
///
/// Under [`UnreachablePolicy::Skip`] unreachable waypoints are dropped before
/// mirroring; under [`UnreachablePolicy::Abort`] the first one fails the plan.
pub fn plan_job(
    config: &ScanConfig,
    mirror: bool,
    policy: UnreachablePolicy,
    ids: &mut CaptureIdAllocator,
) -> Result<Vec<ScanCommand>> {
    let mut commands = build_scan_commands(config, ids)?;
    if policy == UnreachablePolicy::Skip {
        commands = retain_reachable(&commands);
    }

    if mirror {
        let mirrored = invert(&commands, ids).wrap_err("Failed to mirror the scan plan")?;
        commands.extend(mirrored);
    }
    Ok(commands)
}

/// Renders every command up front so an unreachable waypoint is found
/// before the arm moves.
pub fn render_commands(commands: &[ScanCommand], policy: UnreachablePolicy) -> Result<Vec<RenderedCommand>> {
    let mut rendered = Vec::with_capacity(commands.len());
    let mut skipping = false;

    for (index, command) in commands.iter().enumerate() {
        if skipping && matches!(command, ScanCommand::Capture(_)) {
            warn!("Skipping capture at {} after unreachable waypoint", index);
            continue;
        }
        skipping = false;

        match command.to_wire() {
            Ok(wire) => rendered.push(RenderedCommand {
                index,
                wire,
                capture: command.capture_id(),
            }),
            Err(e) => match policy {
                UnreachablePolicy::Abort => {
                    return Err(eyre::eyre!("Command {} cannot be rendered: {}", index, e));
                }
                UnreachablePolicy::Skip => {
                    warn!("Skipping command {}: {}", index, e);
                    skipping = true;
                }
            },
        }
    }

    Ok(rendered)
}

/// Sends a rendered plan, collects the images and clears the controller.
pub struct ScanJob<T: CommandTransport> {
    transport: T,
    image_dir: PathBuf,
    image_extension: String,
}

impl<T: CommandTransport> ScanJob<T> {
    pub fn new(transport: T, image_dir: impl AsRef<Path>, image_extension: &str) -> Self {
        Self {
            transport,
            image_dir: image_dir.as_ref().to_path_buf(),
            image_extension: image_extension.to_string(),
        }
    }

    /// Sends every command in order; returns how many were not accepted.
    pub fn send_commands(&self, commands: &[RenderedCommand]) -> Result<usize> {
        let mut rejected = 0;
        for command in commands {
            let status = self.transport.send(&command.wire)?;
            if !(200..300).contains(&status) {
                warn!("Command {} \"{}\" returned status {}", command.index, command.wire, status);
                rejected += 1;
            }
        }
        Ok(rejected)
    }

    /// Downloads one image per capture into the image directory.
    pub fn download_images(&self, commands: &[RenderedCommand]) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.image_dir)
            .wrap_err_with(|| format!("Failed to create image directory {}", self.image_dir.display()))?;

        let mut saved = Vec::new();
        for id in commands.iter().filter_map(|c| c.capture) {
            info!("Downloading Image #{}.", id);
            let bytes = self.transport.fetch_image(id)?;
            let path = self.image_dir.join(format!("{}.{}", id, self.image_extension));
            fs::write(&path, &bytes).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            saved.push(path);
        }
        Ok(saved)
    }

    pub fn delete_images(&self) -> Result<u16> {
        info!("Deleting images from the server.");
        let wire = ScanCommand::DeleteAll.to_wire()?;
        self.transport.send(&wire)
    }

    pub fn run(&self, commands: &[RenderedCommand], keep_images: bool) -> Result<JobSummary> {
        let rejected = self.send_commands(commands)?;
        let images = self.download_images(commands)?;
        if !keep_images {
            self.delete_images()?;
        }

        Ok(JobSummary {
            sent: commands.len(),
            rejected,
            images,
        })
    }
}
