use serde::{Deserialize, Serialize};

use crate::shared::constants::{DEFAULT_MIN_FACE_SIZE, DEFAULT_MIN_NEIGHBORS, DEFAULT_SCALE_FACTOR};
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for locating faces in a frame.
///
/// Locators never fail: an internal error is logged by the implementation
/// and reported as "no faces". Result ordering carries no meaning.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Vec<Region>;
}

/// Sliding-window detector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CascadeParams {
    /// Image pyramid step between scales.
    pub scale_factor: f64,
    /// Overlapping hits required to keep a candidate.
    pub min_neighbors: i32,
    /// Smallest face edge in pixels (square).
    pub min_size: i32,
}

impl Default for CascadeParams {
    fn default() -> Self {
        Self {
            scale_factor: DEFAULT_SCALE_FACTOR,
            min_neighbors: DEFAULT_MIN_NEIGHBORS,
            min_size: DEFAULT_MIN_FACE_SIZE,
        }
    }
}

impl CascadeParams {
    pub fn validate(&self) -> Result<(), String> {
        if self.scale_factor.is_nan() || self.scale_factor <= 1.0 {
            return Err(format!(
                "scale factor must be greater than 1.0, got {}",
                self.scale_factor
            ));
        }
        if self.min_neighbors < 0 {
            return Err(format!(
                "min neighbors must be non-negative, got {}",
                self.min_neighbors
            ));
        }
        if self.min_size <= 0 {
            return Err(format!("min face size must be positive, got {}", self.min_size));
        }
        Ok(())
    }
}
