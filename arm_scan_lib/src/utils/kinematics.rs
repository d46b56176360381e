// Kinematics for the 5-axis scanning arm.
//
// The arm is two equal links (shoulder-elbow, elbow-wrist) on a waist turntable,
// followed by a wrist tilt and a hand twist that carry the camera. Angles are
// measured in robot units; the shoulder angle is taken from vertical and the
// waist angle from the +y axis towards +x.

use crate::types::{radians_to_units, units_to_radians, CartesianPose, JointPose, KinematicsError};
use nalgebra::Vector2;
use std::f64::consts::{FRAC_PI_2, PI};
use tracing::debug;

/// Length of each of the two arm links, in robot units (25 cm).
pub const LIMB_LENGTH: f64 = 2500.0;

/// Camera mounting correction on the hand axis, in robot units (65.25 degrees).
///
/// The camera is not anchored square to the hand, so this offset is added to
/// the hand joint when a joint pose is sent to the controller.
pub const HAND_OFFSET: f64 = 6525.0;

/// Furthest distance from the shoulder the wrist can reach.
pub fn max_reach() -> f64 {
    2.0 * LIMB_LENGTH
}

/// Joint-space to workspace transform.
///
/// The two links form an isosceles triangle: the included angle at the elbow
/// is `PI - elbow`, so each base angle is `elbow / 2`.
pub fn forward_kinematics(joint: &JointPose) -> CartesianPose {
    let waist = units_to_radians(joint.waist);
    let shoulder = units_to_radians(joint.shoulder);
    let elbow = units_to_radians(joint.elbow);
    let wrist = units_to_radians(joint.wrist);

    let center_angle = PI - elbow;
    let two_limb_sq = 2.0 * LIMB_LENGTH * LIMB_LENGTH;
    let distance = (two_limb_sq - two_limb_sq * center_angle.cos()).max(0.0).sqrt();

    let shoulder_to_wrist = shoulder + elbow / 2.0;
    let horizontal = distance * shoulder_to_wrist.sin();
    let z = distance * shoulder_to_wrist.cos();
    let x = horizontal * waist.sin();
    let y = horizontal * waist.cos();

    let wrist_tilt = FRAC_PI_2 - (shoulder + elbow + wrist);

    CartesianPose::new(x, y, z, radians_to_units(wrist_tilt), joint.hand)
}

/// Workspace to joint-space transform.
///
/// Fails with [`KinematicsError::DegenerateTarget`] for a target on the shoulder
/// and [`KinematicsError::UnreachableTarget`] beyond twice the link length.
pub fn inverse_kinematics(pose: &CartesianPose) -> Result<JointPose, KinematicsError> {
    let horizontal = Vector2::new(pose.x, pose.y).norm();
    let distance = pose.position().norm();

    if distance == 0.0 {
        return Err(KinematicsError::DegenerateTarget);
    }

    let two_limb_sq = 2.0 * LIMB_LENGTH * LIMB_LENGTH;
    let cos_center = (two_limb_sq - distance * distance) / two_limb_sq;
    if !(-1.0..=1.0).contains(&cos_center) {
        return Err(KinematicsError::UnreachableTarget {
            x: pose.x,
            y: pose.y,
            z: pose.z,
            distance,
            reach: max_reach(),
        });
    }

    let waist = pose.x.atan2(pose.y);
    let center_angle = cos_center.acos();
    let elbow = PI - center_angle;
    let shoulder_to_wrist = horizontal.atan2(pose.z);
    // Mathematically within [-1, 1]; clamp away float overshoot near the shoulder.
    let other_angle = ((LIMB_LENGTH / distance) * center_angle.sin())
        .clamp(-1.0, 1.0)
        .asin();
    let shoulder = shoulder_to_wrist - other_angle;
    let wrist_point_angle = shoulder + elbow;
    let desired_wrist = FRAC_PI_2 - units_to_radians(pose.wrist);
    let wrist = desired_wrist - wrist_point_angle;

    debug!(
        "IK ({:.1}, {:.1}, {:.1}) -> waist {:.4} shoulder {:.4} elbow {:.4} wrist {:.4}",
        pose.x, pose.y, pose.z, waist, shoulder, elbow, wrist
    );

    Ok(JointPose::new(
        radians_to_units(waist),
        radians_to_units(shoulder),
        radians_to_units(elbow),
        radians_to_units(wrist),
        pose.hand_twist,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_cartesian_close(actual: &CartesianPose, expected: &CartesianPose) {
        assert!((actual.x - expected.x).abs() < EPS, "x: {:?} vs {:?}", actual, expected);
        assert!((actual.y - expected.y).abs() < EPS, "y: {:?} vs {:?}", actual, expected);
        assert!((actual.z - expected.z).abs() < EPS, "z: {:?} vs {:?}", actual, expected);
        assert!((actual.wrist - expected.wrist).abs() < EPS, "wrist: {:?} vs {:?}", actual, expected);
        assert!(
            (actual.hand_twist - expected.hand_twist).abs() < EPS,
            "hand: {:?} vs {:?}",
            actual,
            expected
        );
    }

    fn assert_joint_close(actual: &JointPose, expected: &JointPose) {
        assert!((actual.waist - expected.waist).abs() < EPS, "waist: {:?} vs {:?}", actual, expected);
        assert!((actual.shoulder - expected.shoulder).abs() < EPS, "shoulder: {:?} vs {:?}", actual, expected);
        assert!((actual.elbow - expected.elbow).abs() < EPS, "elbow: {:?} vs {:?}", actual, expected);
        assert!((actual.wrist - expected.wrist).abs() < EPS, "wrist: {:?} vs {:?}", actual, expected);
        assert!((actual.hand - expected.hand).abs() < EPS, "hand: {:?} vs {:?}", actual, expected);
    }

    #[test]
    fn test_forward_straight_up() {
        let pose = forward_kinematics(&JointPose::new(0.0, 0.0, 0.0, 0.0, 0.0));
        assert_cartesian_close(&pose, &CartesianPose::new(0.0, 0.0, 5000.0, 9000.0, 0.0));
    }

    #[test]
    fn test_forward_right_angle_elbow() {
        let pose = forward_kinematics(&JointPose::new(0.0, 0.0, 9000.0, 0.0, 1200.0));
        assert_cartesian_close(&pose, &CartesianPose::new(0.0, 2500.0, 2500.0, 0.0, 1200.0));
    }

    #[test]
    fn test_forward_waist_rotates_towards_x() {
        let pose = forward_kinematics(&JointPose::new(9000.0, 9000.0, 0.0, 0.0, 0.0));
        assert_cartesian_close(&pose, &CartesianPose::new(5000.0, 0.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_inverse_horizontal_full_reach() {
        let joint = inverse_kinematics(&CartesianPose::new(0.0, 5000.0, 0.0, 0.0, 0.0)).unwrap();
        assert_joint_close(&joint, &JointPose::new(0.0, 9000.0, 0.0, 0.0, 0.0));
    }

    #[test]
    fn test_inverse_right_angle_elbow() {
        let joint = inverse_kinematics(&CartesianPose::new(0.0, 2500.0, 2500.0, 0.0, -300.0)).unwrap();
        assert_joint_close(&joint, &JointPose::new(0.0, 0.0, 9000.0, 0.0, -300.0));
    }

    #[test]
    fn test_inverse_waist_azimuth() {
        let joint = inverse_kinematics(&CartesianPose::new(2500.0, 0.0, 2500.0, 0.0, 0.0)).unwrap();
        assert!((joint.waist - 9000.0).abs() < EPS);

        let joint = inverse_kinematics(&CartesianPose::new(-2500.0, 0.0, 2500.0, 0.0, 0.0)).unwrap();
        assert!((joint.waist + 9000.0).abs() < EPS);
    }

    #[test]
    fn test_inverse_unreachable_target() {
        let result = inverse_kinematics(&CartesianPose::new(3000.0, 3000.0, 3000.0, 0.0, 0.0));
        match result {
            Err(KinematicsError::UnreachableTarget { distance, reach, .. }) => {
                assert!(distance > reach);
                assert_eq!(reach, 5000.0);
            }
            other => panic!("expected UnreachableTarget, got {:?}", other),
        }

        assert!(matches!(
            inverse_kinematics(&CartesianPose::new(0.0, 5000.5, 0.0, 0.0, 0.0)),
            Err(KinematicsError::UnreachableTarget { .. })
        ));
    }

    #[test]
    fn test_inverse_degenerate_target() {
        assert_eq!(
            inverse_kinematics(&CartesianPose::new(0.0, 0.0, 0.0, 0.0, 0.0)),
            Err(KinematicsError::DegenerateTarget)
        );
    }

    #[test]
    fn test_inverse_then_forward_recovers_pose() {
        let targets = [
            CartesianPose::new(-2450.0, -480.0, -1750.0, 0.0, 0.0),
            CartesianPose::new(-3850.0, 500.0, 300.0, -9000.0, 1234.0),
            CartesianPose::new(0.0, 2500.0, -1750.0, 0.0, 0.0),
            CartesianPose::new(100.0, -4000.0, 900.0, 4500.0, -17000.0),
        ];

        for target in targets {
            let joint = inverse_kinematics(&target).unwrap();
            let recovered = forward_kinematics(&joint);
            println!("{:?} -> {:?} -> {:?}", target, joint, recovered);
            assert_cartesian_close(&recovered, &target);
        }
    }

    #[test]
    fn test_forward_then_inverse_recovers_joints() {
        let joint = JointPose::new(-10000.0, 3000.0, 7000.0, -2000.0, 6525.0);
        let recovered = inverse_kinematics(&forward_kinematics(&joint)).unwrap();
        assert_joint_close(&recovered, &joint);
    }
}
