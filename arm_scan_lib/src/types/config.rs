use eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;

/// Geometry of a scan job, in robot units (1 cm = 100 units).
///
/// The bounding box is the volume being scanned; the capture footprint sets
/// the raster pitch and the inset from each face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub x_low: i32,
    pub x_high: i32,
    pub y_low: i32,
    pub y_high: i32,
    pub z_low: i32,
    pub z_high: i32,
    pub hand_length: i32,
    pub capture_distance: i32,
    pub capture_diameter: i32,
    /// Also scan the far face, beyond `x_low`.
    pub include_back: bool,
}

/// Everything the scan controller needs besides the password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub server_url: String,
    pub operator_id: String,
    pub image_dir: String,
    pub image_extension: String,
    pub scan: ScanConfig,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            x_low: -4500,
            x_high: -3800,
            y_low: -550,
            y_high: 550,
            // Measured; the arm cannot actually reach the floor of the box.
            z_low: -1800,
            z_high: -1000,
            hand_length: 1000,
            capture_distance: 300,
            capture_diameter: 100,
            include_back: false,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            server_url: "http://debatedecide.fit.edu".to_string(),
            operator_id: "369".to_string(),
            image_dir: "images".to_string(),
            image_extension: "bmp".to_string(),
            scan: ScanConfig::default(),
        }
    }
}

impl ScanConfig {
    /// Stand-off from a face to the wrist: hand length plus camera distance.
    pub fn capture_offset(&self) -> i32 {
        self.hand_length + self.capture_distance
    }

    pub fn capture_radius(&self) -> i32 {
        self.capture_diameter / 2
    }

    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ScanConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let axes = [
            ("x", self.x_low, self.x_high),
            ("y", self.y_low, self.y_high),
            ("z", self.z_low, self.z_high),
        ];

        for (axis, low, high) in axes {
            if low >= high {
                return Err(eyre::eyre!(
                    "{} range is empty: low {} >= high {}",
                    axis,
                    low,
                    high
                ));
            }
        }

        if self.capture_diameter <= 0 {
            return Err(eyre::eyre!(
                "Capture diameter must be positive, got {}",
                self.capture_diameter
            ));
        }

        if self.hand_length < 0 || self.capture_distance < 0 {
            return Err(eyre::eyre!(
                "Hand length ({}) and capture distance ({}) must not be negative",
                self.hand_length,
                self.capture_distance
            ));
        }

        let radius = self.capture_radius();
        for (axis, low, high) in axes {
            if low + radius > high - radius {
                return Err(eyre::eyre!(
                    "{} range [{}, {}] is narrower than the capture diameter {}",
                    axis,
                    low,
                    high,
                    self.capture_diameter
                ));
            }
        }

        // The front stand-off is taken along the ray from the origin; a ray
        // shorter than the offset would land on the far side of the arm.
        if self.x_high.abs() <= self.capture_offset() {
            return Err(eyre::eyre!(
                "Front face at x = {} is closer to the arm than the capture offset {}",
                self.x_high,
                self.capture_offset()
            ));
        }

        Ok(())
    }
}

impl ControllerConfig {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ControllerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server_url.is_empty() {
            return Err(eyre::eyre!("Server URL must not be empty"));
        }
        self.scan.validate()
    }
}
