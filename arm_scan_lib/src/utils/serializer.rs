//! Wire format of the arm controller.
//!
//! Joint moves are sent as `hand wrist elbow shoulder waist AJMA`, each angle
//! normalized to (-18000, 18000]. Captures are `<id> CAPTURE`; the controller
//! reads id -1 as "delete every stored image".

use crate::types::{normalize, JointPose, KinematicsError, ScanCommand};
use crate::utils::HAND_OFFSET;

/// Absolute joint move of all five axes.
pub const MOVE_KEYWORD: &str = "AJMA";
pub const CAPTURE_KEYWORD: &str = "CAPTURE";
pub const HOME_COMMAND: &str = "HOME";
/// Capture id the controller reserves for delete-all.
pub const DELETE_ALL_WIRE_ID: i64 = -1;

pub fn joint_wire(joint: &JointPose) -> String {
    format!(
        "{} {} {} {} {} {}",
        normalize(joint.hand + HAND_OFFSET),
        normalize(joint.wrist),
        normalize(joint.elbow),
        normalize(joint.shoulder),
        normalize(joint.waist),
        MOVE_KEYWORD
    )
}

/// Renders one command. Cartesian waypoints go through inverse kinematics
/// and fail if the target cannot be reached.
pub fn to_wire(command: &ScanCommand) -> Result<String, KinematicsError> {
    let wire = match command {
        ScanCommand::Joint(joint) => joint_wire(joint),
        ScanCommand::Cartesian(pose) => joint_wire(&pose.to_joint()?),
        ScanCommand::Capture(id) => format!("{} {}", id, CAPTURE_KEYWORD),
        ScanCommand::DeleteAll => format!("{} {}", DELETE_ALL_WIRE_ID, CAPTURE_KEYWORD),
        ScanCommand::Home => HOME_COMMAND.to_string(),
    };
    Ok(wire)
}

impl ScanCommand {
    pub fn to_wire(&self) -> Result<String, KinematicsError> {
        to_wire(self)
    }
}
