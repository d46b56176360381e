use crate::types::{CartesianPose, JointPose};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a captured image on the controller side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CaptureId(pub u32);

impl fmt::Display for CaptureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a command sequence, in execution order.
///
/// A capture is tied to the pose entry that precedes it in the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScanCommand {
    Joint(JointPose),
    Cartesian(CartesianPose),
    Capture(CaptureId),
    /// Return to the home position.
    Home,
    /// Delete every image stored on the controller.
    DeleteAll,
}

impl ScanCommand {
    pub fn as_cartesian(&self) -> Option<&CartesianPose> {
        match self {
            ScanCommand::Cartesian(pose) => Some(pose),
            _ => None,
        }
    }

    pub fn as_joint(&self) -> Option<&JointPose> {
        match self {
            ScanCommand::Joint(pose) => Some(pose),
            _ => None,
        }
    }

    pub fn capture_id(&self) -> Option<CaptureId> {
        match self {
            ScanCommand::Capture(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_waypoint(&self) -> bool {
        matches!(self, ScanCommand::Joint(_) | ScanCommand::Cartesian(_))
    }
}

/// Hands out capture ids 0, 1, 2, ... in creation order.
///
/// Ids are unique only within one allocator, so a job must thread a single
/// allocator through every planning and inversion call.
#[derive(Debug, Default)]
pub struct CaptureIdAllocator {
    next: u32,
}

impl CaptureIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> CaptureId {
        let id = CaptureId(self.next);
        self.next += 1;
        id
    }

    /// A fresh capture command.
    pub fn capture(&mut self) -> ScanCommand {
        ScanCommand::Capture(self.allocate())
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}

/// Capture ids appearing in `commands`, in sequence order.
pub fn capture_ids(commands: &[ScanCommand]) -> Vec<CaptureId> {
    commands.iter().filter_map(ScanCommand::capture_id).collect()
}
