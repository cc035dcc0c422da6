use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Camera placement, projection and orbit parameters.
pub struct CameraOptions {
    /// Initial eye position.
    pub eye: [f32; 3],
    /// Point the camera looks at and orbits around.
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
    /// Automatic orbit speed in radians per second (0 = static camera).
    pub orbit_speed: f32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            eye: [3.0, 3.0, 3.0],
            target: [0.0, 0.0, 0.0],
            fovy: 45.0,
            znear: 0.01,
            zfar: 1000.0,
            orbit_speed: 0.5,
        }
    }
}
