//! # Arm Scan Library
//!
//! Shared types and utilities for scripted surface scans with the 5-axis arm:
//! joint/Cartesian pose conversion, raster path planning and the wire
//! commands understood by the arm controller.

pub mod types;
pub mod utils;

// Re-export everything for convenience
pub use types::*;
pub use utils::*;
