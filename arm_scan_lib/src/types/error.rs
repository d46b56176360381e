//! Error types for kinematic conversions and consistency checks.

use thiserror::Error;

/// Failure to solve inverse kinematics for a single waypoint.
///
/// The caller decides whether to abort the whole plan or skip the waypoint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KinematicsError {
    /// The target lies outside the sphere the two links can reach.
    #[error("target ({x:.1}, {y:.1}, {z:.1}) is unreachable: distance {distance:.1} exceeds reach {reach:.1}")]
    UnreachableTarget {
        x: f64,
        y: f64,
        z: f64,
        distance: f64,
        reach: f64,
    },

    /// The target coincides with the shoulder, so no direction can be derived.
    #[error("target is degenerate: zero distance from the shoulder")]
    DegenerateTarget,
}

/// Forward and inverse kinematics disagree about a waypoint.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsistencyError {
    #[error("round trip mismatch at command {index}: expected \"{expected}\", recovered \"{recovered}\"")]
    RoundTripMismatch {
        index: usize,
        expected: String,
        recovered: String,
    },

    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
}
