//! Kinematic self-consistency.
//!
//! Forward and inverse kinematics are derived independently. Mirroring a plan
//! into the other representation and comparing wire strings checks that they
//! agree up to integer rounding.

use crate::types::{CaptureIdAllocator, CartesianPose, ConsistencyError, KinematicsError, ScanCommand};
use crate::utils::{joint_wire, to_wire};
use tracing::{debug, warn};

/// Mirrors `commands` into the other coordinate representation.
///
/// Cartesian waypoints become joint poses and joint poses become Cartesian
/// ones; every capture gets a fresh id so images are never overwritten.
pub fn invert(
    commands: &[ScanCommand],
    ids: &mut CaptureIdAllocator,
) -> Result<Vec<ScanCommand>, KinematicsError> {
    let mut inverted = Vec::with_capacity(commands.len());
    for command in commands {
        inverted.push(match command {
            ScanCommand::Cartesian(pose) => ScanCommand::Joint(pose.to_joint()?),
            ScanCommand::Joint(joint) => ScanCommand::Cartesian(joint.to_cartesian()),
            ScanCommand::Capture(_) => ids.capture(),
            ScanCommand::Home => ScanCommand::Home,
            ScanCommand::DeleteAll => ScanCommand::DeleteAll,
        });
    }
    Ok(inverted)
}

/// Sends every waypoint through both transforms and compares wire strings.
///
/// Returns the first mismatch.
pub fn check_round_trip(commands: &[ScanCommand]) -> Result<(), ConsistencyError> {
    for (index, command) in commands.iter().enumerate() {
        let (expected, recovered) = match command {
            ScanCommand::Cartesian(pose) => {
                let joint = pose.to_joint()?;
                let recovered = ScanCommand::Cartesian(CartesianPose::from(&joint));
                (to_wire(command)?, to_wire(&recovered)?)
            }
            ScanCommand::Joint(joint) => {
                let recovered = joint.to_cartesian().to_joint()?;
                (joint_wire(joint), joint_wire(&recovered))
            }
            ScanCommand::Capture(_) | ScanCommand::Home | ScanCommand::DeleteAll => continue,
        };

        if expected != recovered {
            warn!("{} != {}", recovered, expected);
            return Err(ConsistencyError::RoundTripMismatch {
                index,
                expected,
                recovered,
            });
        }
    }

    debug!("Round trip consistent for {} commands", commands.len());
    Ok(())
}
