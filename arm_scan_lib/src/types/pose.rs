use crate::types::{normalize, AngleUnit, KinematicsError};
use crate::utils::{forward_kinematics, inverse_kinematics};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Configuration-space pose: the five joint angles in robot units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointPose {
    pub waist: f64,
    pub shoulder: f64,
    pub elbow: f64,
    pub wrist: f64,
    pub hand: f64,
}

/// Workspace pose: end-effector position plus wrist tilt and hand twist.
///
/// Positions use the same fixed-point scale as angles (1 unit = 0.01 cm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartesianPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub wrist: f64,
    pub hand_twist: f64,
}

impl JointPose {
    pub fn new(waist: f64, shoulder: f64, elbow: f64, wrist: f64, hand: f64) -> Self {
        Self {
            waist,
            shoulder,
            elbow,
            wrist,
            hand,
        }
    }

    /// Joint angles reduced to the canonical integer range, waist first.
    pub fn normalized(&self) -> [AngleUnit; 5] {
        [
            normalize(self.waist),
            normalize(self.shoulder),
            normalize(self.elbow),
            normalize(self.wrist),
            normalize(self.hand),
        ]
    }

    /// Forward kinematics.
    pub fn to_cartesian(&self) -> CartesianPose {
        forward_kinematics(self)
    }
}

impl CartesianPose {
    pub fn new(x: f64, y: f64, z: f64, wrist: f64, hand_twist: f64) -> Self {
        Self {
            x,
            y,
            z,
            wrist,
            hand_twist,
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Inverse kinematics.
    pub fn to_joint(&self) -> Result<JointPose, KinematicsError> {
        inverse_kinematics(self)
    }
}

impl From<&JointPose> for CartesianPose {
    fn from(joint: &JointPose) -> Self {
        forward_kinematics(joint)
    }
}

impl TryFrom<&CartesianPose> for JointPose {
    type Error = KinematicsError;

    fn try_from(pose: &CartesianPose) -> Result<Self, Self::Error> {
        inverse_kinematics(pose)
    }
}
