use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Window title, initial size and frame cap.
pub struct WindowOptions {
    /// Window title, also the first field of the status line.
    pub title: String,
    /// Initial logical width.
    pub width: u32,
    /// Initial logical height.
    pub height: u32,
    /// Frame cap (0 = unlimited).
    pub target_fps: u32,
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self {
            title: "Model selection".into(),
            width: 800,
            height: 450,
            target_fps: 60,
        }
    }
}
