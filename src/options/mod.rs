//! Centralized demo options with TOML file support.
//!
//! Camera placement, colors, grid, window settings and the object list
//! live here. Every section uses `#[serde(default)]`, so a partial file
//! (for example only overriding `[display]`) keeps the defaults for
//! everything else. Giving any `[[objects]]` table replaces the whole
//! object list. The defaults reproduce the stock demo scene.

mod camera;
mod display;
mod window;

use std::path::Path;

pub use camera::CameraOptions;
pub use display::{srgb_to_linear, DisplayOptions};
use serde::{Deserialize, Serialize};
pub use window::WindowOptions;

use crate::error::HoverPickError;
use crate::scene::{ObjectDesc, Scene};

/// Top-level options container.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Options {
    /// Camera placement, projection and orbit.
    pub camera: CameraOptions,
    /// Colors, highlight and grid.
    pub display: DisplayOptions,
    /// Window title, size and frame cap.
    pub window: WindowOptions,
    /// Pickable objects in identifier order (`[[objects]]` tables).
    pub objects: Vec<ObjectDesc>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            camera: CameraOptions::default(),
            display: DisplayOptions::default(),
            window: WindowOptions::default(),
            objects: Scene::demo_layout(),
        }
    }
}

impl Options {
    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError::Io`] if the file cannot be read and
    /// [`HoverPickError::OptionsParse`] if it is not valid options TOML.
    pub fn load(path: &Path) -> Result<Self, HoverPickError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse options from a TOML string. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError::OptionsParse`] on malformed input.
    pub fn from_toml(content: &str) -> Result<Self, HoverPickError> {
        toml::from_str(content)
            .map_err(|e| HoverPickError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), HoverPickError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HoverPickError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(HoverPickError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Primitive;

    #[test]
    fn default_round_trips_through_toml() {
        let opts = Options::default();
        let toml_str = toml::to_string_pretty(&opts).unwrap();
        let parsed = Options::from_toml(&toml_str).unwrap();
        assert_eq!(opts, parsed);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let opts = Options::from_toml(
            r"
[camera]
orbit_speed = 0.0
",
        )
        .unwrap();
        assert_eq!(opts.camera.orbit_speed, 0.0);
        assert_eq!(opts.camera.eye, [3.0, 3.0, 3.0]);
        assert_eq!(opts.display, DisplayOptions::default());
        assert_eq!(opts.window.width, 800);
    }

    #[test]
    fn objects_table_replaces_the_stock_layout() {
        let opts = Options::from_toml(
            r#"
[[objects]]
position = [0.0, 0.5, 0.0]
primitive = { shape = "sphere", radius = 1.0, rings = 8, slices = 16 }

[[objects]]
position = [2.0, 0.0, 0.0]
primitive = { shape = "cube", size = [1.0, 2.0, 1.0] }
"#,
        )
        .unwrap();
        assert_eq!(opts.objects.len(), 2);
        assert_eq!(opts.objects[0].position, [0.0, 0.5, 0.0]);
        assert!(matches!(
            opts.objects[0].primitive,
            Primitive::Sphere { rings: 8, .. }
        ));
        assert_eq!(
            opts.objects[1].primitive,
            Primitive::Cube {
                size: [1.0, 2.0, 1.0]
            }
        );
    }

    #[test]
    fn missing_objects_fall_back_to_the_stock_layout() {
        let opts = Options::from_toml("[window]\ntitle = \"x\"\n").unwrap();
        assert_eq!(opts.objects, Scene::demo_layout());
    }

    #[test]
    fn unknown_shape_is_a_parse_error() {
        let err = Options::from_toml(
            r#"
[[objects]]
position = [0.0, 0.0, 0.0]
primitive = { shape = "torus" }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, HoverPickError::OptionsParse(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Options::from_toml("[camera\nfovy = 1").unwrap_err();
        assert!(matches!(err, HoverPickError::OptionsParse(_)));
    }

    #[test]
    fn save_then_load_preserves_overrides() {
        let dir = std::env::temp_dir()
            .join(format!("hoverpick-options-{}", std::process::id()));
        let path = dir.join("preset.toml");
        let mut opts = Options::default();
        opts.display.show_grid = false;
        opts.window.title = "Picking".into();
        opts.save(&path).unwrap();
        let loaded = Options::load(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(loaded, opts);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err =
            Options::load(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, HoverPickError::Io(_)));
    }
}
