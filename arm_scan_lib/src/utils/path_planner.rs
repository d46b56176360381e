//! Raster scan planning.
//!
//! Each scan surface is a serpentine (boustrophedon) raster: the outer axis is
//! stepped by the capture diameter and the inner `y` sweep reverses direction
//! on every row. Every waypoint is immediately followed by a capture.

use crate::types::{AngleUnit, CaptureIdAllocator, CartesianPose, ScanCommand, ScanConfig};
use eyre::Result;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Wrist angle that points the camera straight down.
pub const WRIST_DOWN: f64 = -9000.0;
/// Wrist angle that points the camera back towards the arm.
pub const WRIST_BACK: f64 = -18000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScanSurface {
    /// Near face, at `x_high`; rows stepped in z from the bottom up.
    Front,
    /// Top face, above `z_high`; rows stepped in x away from the arm.
    Top,
    /// Far face, beyond `x_low`; rows stepped in z from the top down.
    Back,
}

/// Axis sequencing of a blend waypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlendOrder {
    /// Finish the z move first, then move in x.
    ZThenX,
    /// Finish the x move first, then move in z.
    XThenZ,
}

/// A single raster cell as visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterCell {
    pub row: usize,
    pub outer: i32,
    pub inner: i32,
}

/// Serpentine grid over an outer and an inner axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    outer: Vec<i32>,
    inner: Vec<i32>,
    start_forward: bool,
}

impl RasterGrid {
    /// Both axes run from `*_from` towards `*_to` inclusive in steps of `pitch`.
    pub fn new(
        outer_from: i32,
        outer_to: i32,
        inner_from: i32,
        inner_to: i32,
        pitch: i32,
        start_forward: bool,
    ) -> Self {
        Self {
            outer: axis_values(outer_from, outer_to, pitch),
            inner: axis_values(inner_from, inner_to, pitch),
            start_forward,
        }
    }

    pub fn rows(&self) -> &[i32] {
        &self.outer
    }

    pub fn columns(&self) -> &[i32] {
        &self.inner
    }

    pub fn len(&self) -> usize {
        self.outer.len() * self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether row `row` sweeps the inner axis in increasing order.
    pub fn is_forward(&self, row: usize) -> bool {
        (row % 2 == 0) == self.start_forward
    }

    /// Cells in visiting order.
    pub fn cells(&self) -> Vec<RasterCell> {
        let mut cells = Vec::with_capacity(self.len());
        for (row, &outer) in self.outer.iter().enumerate() {
            if self.is_forward(row) {
                cells.extend(self.inner.iter().map(|&inner| RasterCell { row, outer, inner }));
            } else {
                cells.extend(self.inner.iter().rev().map(|&inner| RasterCell { row, outer, inner }));
            }
        }
        cells
    }
}

/// `from`, `from ± pitch`, ... up to and including `to` when it lies on the pitch.
fn axis_values(from: i32, to: i32, pitch: i32) -> Vec<i32> {
    let pitch = pitch.abs().max(1);
    if from <= to {
        (from..=to).step_by(pitch as usize).collect()
    } else {
        (to..=from).rev().step_by(pitch as usize).collect()
    }
}

/// Transition waypoint between the end of one segment (`a`) and the start of
/// the next (`b`), moving one axis at a time.
pub fn blend(a: &CartesianPose, b: &CartesianPose, order: BlendOrder) -> CartesianPose {
    let (x, z) = match order {
        BlendOrder::ZThenX => (a.x, b.z),
        BlendOrder::XThenZ => (b.x, a.z),
    };
    CartesianPose::new(
        x,
        (a.y + b.y) / 2.0,
        z,
        (a.wrist + b.wrist) / 2.0,
        (a.hand_twist + b.hand_twist) / 2.0,
    )
}

pub fn zx_blend(a: &CartesianPose, b: &CartesianPose) -> CartesianPose {
    blend(a, b, BlendOrder::ZThenX)
}

pub fn xz_blend(a: &CartesianPose, b: &CartesianPose) -> CartesianPose {
    blend(a, b, BlendOrder::XThenZ)
}

/// Blend between the last Cartesian waypoint of `first` and the first one of `second`.
pub fn blend_segments(
    first: &[ScanCommand],
    second: &[ScanCommand],
    order: BlendOrder,
) -> Option<CartesianPose> {
    let a = first.iter().rev().find_map(ScanCommand::as_cartesian)?;
    let b = second.iter().find_map(ScanCommand::as_cartesian)?;
    Some(blend(a, b, order))
}

/// Plans scan sequences for one bounding box.
pub struct PathPlanner {
    config: ScanConfig,
}

impl PathPlanner {
    pub fn new(config: &ScanConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn grid(&self, surface: ScanSurface) -> RasterGrid {
        let c = &self.config;
        let r = c.capture_radius();
        let pitch = c.capture_diameter;
        let (y_from, y_to) = (c.y_low + r, c.y_high - r);

        match surface {
            ScanSurface::Front => RasterGrid::new(c.z_low + r, c.z_high - r, y_from, y_to, pitch, true),
            ScanSurface::Top => RasterGrid::new(c.x_high - r, c.x_low + r, y_from, y_to, pitch, true),
            ScanSurface::Back => RasterGrid::new(c.z_high - r, c.z_low + r, y_from, y_to, pitch, false),
        }
    }

    /// Waypoint for one raster cell of `surface`.
    pub fn waypoint(&self, surface: ScanSurface, cell: &RasterCell) -> CartesianPose {
        let offset = f64::from(self.config.capture_offset());
        match surface {
            ScanSurface::Front => {
                let target = project_along_ray(self.config.x_high, cell.inner, -offset);
                CartesianPose::new(target.x, target.y, f64::from(cell.outer), 0.0, 0.0)
            }
            ScanSurface::Top => {
                let (x, y) = (f64::from(cell.outer), f64::from(cell.inner));
                let twist = AngleUnit::from_radians(y.atan2(-x));
                CartesianPose::new(
                    x,
                    y,
                    f64::from(self.config.z_high) + offset,
                    WRIST_DOWN,
                    f64::from(twist),
                )
            }
            ScanSurface::Back => {
                let target = project_along_ray(self.config.x_low, cell.inner, offset);
                CartesianPose::new(target.x, target.y, f64::from(cell.outer), WRIST_BACK, 0.0)
            }
        }
    }

    /// Waypoint/capture pairs covering `surface`.
    pub fn scan_surface(&self, surface: ScanSurface, ids: &mut CaptureIdAllocator) -> Vec<ScanCommand> {
        let grid = self.grid(surface);
        let mut commands = Vec::with_capacity(grid.len() * 2);

        for cell in grid.cells() {
            let pose = self.waypoint(surface, &cell);
            debug!("{:?} cell {:?} -> {:?}", surface, cell, pose);
            commands.push(ScanCommand::Cartesian(pose));
            commands.push(ids.capture());
        }

        info!(
            "Planned {:?} surface: {} rows x {} columns",
            surface,
            grid.rows().len(),
            grid.columns().len()
        );
        commands
    }

    /// Positions the arm above the box so it does not hit it on the way down.
    pub fn prep_waypoint(&self) -> CartesianPose {
        let c = &self.config;
        CartesianPose::new(
            0.0,
            f64::from(-c.x_high - c.capture_offset()),
            f64::from(c.z_low + c.capture_radius()),
            0.0,
            0.0,
        )
    }

    /// Full job: home, prep, front, blend, top (and optionally back), home.
    pub fn build_commands(&self, ids: &mut CaptureIdAllocator) -> Result<Vec<ScanCommand>> {
        let front = self.scan_surface(ScanSurface::Front, ids);

        let mut commands = vec![ScanCommand::Home, ScanCommand::Cartesian(self.prep_waypoint())];
        commands.extend_from_slice(&front);

        // The blend capture is not needed for coverage; it keeps every
        // waypoint paired with a capture.
        let blend_capture = ids.capture();
        let top = self.scan_surface(ScanSurface::Top, ids);
        let to_top = blend_segments(&front, &top, BlendOrder::ZThenX)
            .ok_or_else(|| eyre::eyre!("Cannot blend into the top surface: empty segment"))?;
        commands.push(ScanCommand::Cartesian(to_top));
        commands.push(blend_capture);
        commands.extend_from_slice(&top);

        if self.config.include_back {
            let back_capture = ids.capture();
            let back = self.scan_surface(ScanSurface::Back, ids);
            let to_back = blend_segments(&top, &back, BlendOrder::XThenZ)
                .ok_or_else(|| eyre::eyre!("Cannot blend into the back surface: empty segment"))?;
            commands.push(ScanCommand::Cartesian(to_back));
            commands.push(back_capture);
            commands.extend_from_slice(&back);
        }

        commands.push(ScanCommand::Home);

        info!(
            "Built scan plan: {} commands, {} captures",
            commands.len(),
            commands.iter().filter(|c| c.capture_id().is_some()).count()
        );
        Ok(commands)
    }
}

/// Moves the point (`x_plane`, `y`) along the ray from the origin by `delta`,
/// rounding the result to whole units.
fn project_along_ray(x_plane: i32, y: i32, delta: f64) -> Vector2<f64> {
    let ray = Vector2::new(f64::from(x_plane), f64::from(y));
    let length = ray.norm();
    let ratio = (length + delta) / length;
    (ray * ratio).map(f64::round)
}

/// Builds the full command sequence for a scan job.
pub fn build_scan_commands(config: &ScanConfig, ids: &mut CaptureIdAllocator) -> Result<Vec<ScanCommand>> {
    PathPlanner::new(config)?.build_commands(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{capture_ids, CaptureId};
    use std::collections::HashSet;

    fn default_planner() -> PathPlanner {
        PathPlanner::new(&ScanConfig::default()).unwrap()
    }

    #[test]
    fn test_zx_blend_example() {
        let a = CartesianPose::new(10.0, 20.0, 5.0, 0.0, 0.0);
        let b = CartesianPose::new(99.0, 40.0, 15.0, 10.0, 10.0);
        assert_eq!(zx_blend(&a, &b), CartesianPose::new(10.0, 30.0, 15.0, 5.0, 5.0));
    }

    #[test]
    fn test_xz_blend_example() {
        let a = CartesianPose::new(10.0, 20.0, 5.0, 0.0, 0.0);
        let b = CartesianPose::new(99.0, 40.0, 15.0, 10.0, 10.0);
        assert_eq!(xz_blend(&a, &b), CartesianPose::new(99.0, 30.0, 5.0, 5.0, 5.0));
        assert_eq!(blend(&a, &b, BlendOrder::XThenZ), xz_blend(&a, &b));
    }

    #[test]
    fn test_blend_segments_skips_captures() {
        let a = CartesianPose::new(1.0, 2.0, 3.0, 0.0, 0.0);
        let b = CartesianPose::new(5.0, 6.0, 7.0, 0.0, 0.0);
        let first = vec![ScanCommand::Cartesian(a), ScanCommand::Capture(CaptureId(0))];
        let second = vec![ScanCommand::Home, ScanCommand::Cartesian(b)];

        let blended = blend_segments(&first, &second, BlendOrder::ZThenX).unwrap();
        assert_eq!(blended, CartesianPose::new(1.0, 4.0, 7.0, 0.0, 0.0));
        assert!(blend_segments(&first, &[ScanCommand::Home], BlendOrder::ZThenX).is_none());
    }

    #[test]
    fn test_axis_values_inclusive_both_directions() {
        assert_eq!(axis_values(-500, 500, 100).len(), 11);
        assert_eq!(axis_values(-3850, -4450, 100), vec![-3850, -3950, -4050, -4150, -4250, -4350, -4450]);
        assert_eq!(axis_values(0, 250, 100), vec![0, 100, 200]);
        assert_eq!(axis_values(7, 7, 100), vec![7]);
    }

    #[test]
    fn test_raster_visits_every_cell_once() {
        let planner = default_planner();
        for surface in [ScanSurface::Front, ScanSurface::Top, ScanSurface::Back] {
            let grid = planner.grid(surface);
            let cells = grid.cells();
            assert_eq!(cells.len(), grid.len());

            let visited: HashSet<(i32, i32)> = cells.iter().map(|c| (c.outer, c.inner)).collect();
            assert_eq!(visited.len(), cells.len(), "{:?} visits a cell twice", surface);
            for &outer in grid.rows() {
                for &inner in grid.columns() {
                    assert!(visited.contains(&(outer, inner)), "{:?} misses ({}, {})", surface, outer, inner);
                }
            }
        }
    }

    #[test]
    fn test_raster_alternates_direction_per_row() {
        let grid = default_planner().grid(ScanSurface::Front);
        let cells = grid.cells();

        for (row, chunk) in cells.chunks(grid.columns().len()).enumerate() {
            assert!(chunk.iter().all(|c| c.row == row));
            let increasing = chunk.windows(2).all(|w| w[1].inner > w[0].inner);
            let decreasing = chunk.windows(2).all(|w| w[1].inner < w[0].inner);
            if row % 2 == 0 {
                assert!(increasing, "row {} should sweep forward", row);
            } else {
                assert!(decreasing, "row {} should sweep backward", row);
            }
        }
    }

    #[test]
    fn test_grid_dimensions_for_default_job() {
        let planner = default_planner();
        let front = planner.grid(ScanSurface::Front);
        assert_eq!(front.rows().first(), Some(&-1750));
        assert_eq!(front.rows().last(), Some(&-1050));
        assert_eq!(front.rows().len(), 8);
        assert_eq!(front.columns().len(), 11);

        let top = planner.grid(ScanSurface::Top);
        assert_eq!(top.rows().first(), Some(&-3850));
        assert_eq!(top.rows().len(), 7);

        let back = planner.grid(ScanSurface::Back);
        assert_eq!(back.rows().first(), Some(&-1050));
        assert!(!back.is_forward(0));
    }

    #[test]
    fn test_front_waypoint_pulls_back_along_ray() {
        let planner = default_planner();
        let cell = RasterCell { row: 0, outer: -1750, inner: 500 };
        let pose = planner.waypoint(ScanSurface::Front, &cell);

        let original = Vector2::new(-3800.0_f64, 500.0);
        let projected = Vector2::new(pose.x, pose.y);
        assert!((original.norm() - projected.norm() - 1300.0).abs() < 1.0);
        assert!((pose.y / pose.x - 500.0 / -3800.0).abs() < 1e-3);
        assert_eq!(pose.x, pose.x.round());
        assert_eq!(pose.z, -1750.0);
        assert_eq!((pose.wrist, pose.hand_twist), (0.0, 0.0));
    }

    #[test]
    fn test_top_waypoint_points_down_with_azimuth_twist() {
        let planner = default_planner();
        let pose = planner.waypoint(ScanSurface::Top, &RasterCell { row: 0, outer: -4000, inner: 0 });
        assert_eq!(pose.z, 300.0);
        assert_eq!(pose.wrist, WRIST_DOWN);
        assert_eq!(pose.hand_twist, 0.0);

        let pose = planner.waypoint(ScanSurface::Top, &RasterCell { row: 0, outer: -4000, inner: 4000 });
        assert_eq!(pose.hand_twist, 4500.0);
    }

    #[test]
    fn test_back_waypoint_pushes_out_along_ray() {
        let planner = default_planner();
        let pose = planner.waypoint(ScanSurface::Back, &RasterCell { row: 0, outer: -1050, inner: 0 });
        assert_eq!(pose.x, -5800.0);
        assert_eq!(pose.y, 0.0);
        assert_eq!(pose.wrist, WRIST_BACK);
    }

    #[test]
    fn test_surface_pairs_waypoints_with_captures() {
        let mut ids = CaptureIdAllocator::new();
        let commands = default_planner().scan_surface(ScanSurface::Top, &mut ids);
        assert_eq!(commands.len(), 2 * 77);
        for pair in commands.chunks(2) {
            assert!(matches!(pair[0], ScanCommand::Cartesian(_)));
            assert!(matches!(pair[1], ScanCommand::Capture(_)));
        }
        assert_eq!(ids.issued(), 77);
    }

    #[test]
    fn test_full_sequence_layout() {
        let mut ids = CaptureIdAllocator::new();
        let commands = build_scan_commands(&ScanConfig::default(), &mut ids).unwrap();

        assert_eq!(commands.len(), 1 + 1 + 176 + 2 + 154 + 1);
        assert_eq!(commands.first(), Some(&ScanCommand::Home));
        assert_eq!(commands.last(), Some(&ScanCommand::Home));
        assert_eq!(commands[1], ScanCommand::Cartesian(CartesianPose::new(0.0, 2500.0, -1750.0, 0.0, 0.0)));

        // Front ends at (y = -500, z = -1050); top starts at x = -3850, z = 300.
        let blend = commands[178].as_cartesian().unwrap();
        let front_last = commands[176].as_cartesian().unwrap();
        let top_first = commands[180].as_cartesian().unwrap();
        assert_eq!(blend.x, front_last.x);
        assert_eq!(blend.z, top_first.z);
        assert_eq!(blend.y, (front_last.y + top_first.y) / 2.0);
        assert_eq!(commands[179], ScanCommand::Capture(CaptureId(88)));

        let expected: Vec<CaptureId> = (0..ids.issued()).map(CaptureId).collect();
        assert_eq!(capture_ids(&commands), expected);
        assert_eq!(ids.issued(), 88 + 1 + 77);
    }

    #[test]
    fn test_back_surface_is_optional() {
        let config = ScanConfig {
            include_back: true,
            ..ScanConfig::default()
        };
        let mut ids = CaptureIdAllocator::new();
        let commands = build_scan_commands(&config, &mut ids).unwrap();

        assert_eq!(commands.len(), 335 + 2 + 176);
        assert_eq!(commands.last(), Some(&ScanCommand::Home));

        let top_last = commands[332].as_cartesian().unwrap();
        let blend = commands[334].as_cartesian().unwrap();
        let back_first = commands[336].as_cartesian().unwrap();
        assert_eq!(blend.x, back_first.x);
        assert_eq!(blend.z, top_last.z);

        let ids_in_order = capture_ids(&commands);
        assert!(ids_in_order.windows(2).all(|w| w[1].0 == w[0].0 + 1));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = ScanConfig {
            capture_diameter: -5,
            ..ScanConfig::default()
        };
        assert!(PathPlanner::new(&config).is_err());

        // Front face nearer than the stand-off would put waypoints behind the arm.
        let config = ScanConfig {
            x_low: -1500,
            x_high: -1000,
            ..ScanConfig::default()
        };
        assert!(PathPlanner::new(&config).is_err());
    }
}
