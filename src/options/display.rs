use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
/// Colors of the visible pass, the hover highlight, and the grid.
pub struct DisplayOptions {
    /// Background clear color (linear RGBA).
    pub clear_color: [f32; 4],
    /// Tint applied to objects that are not hovered (linear RGBA).
    pub base_tint: [f32; 4],
    /// Tint applied to the hovered object (linear RGBA).
    pub highlight_tint: [f32; 4],
    /// Checker texture colors (sRGB RGBA8).
    pub checker_colors: [[u8; 4]; 2],
    /// Draw the reference grid.
    pub show_grid: bool,
    /// Grid cells per side.
    pub grid_slices: u32,
    /// Grid cell size in world units.
    pub grid_spacing: f32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 1.0],
            base_tint: [1.0, 1.0, 1.0, 1.0],
            highlight_tint: srgb_to_linear([0, 228, 48, 255]),
            checker_colors: [[230, 41, 55, 255], [0, 121, 241, 255]],
            show_grid: true,
            grid_slices: 10,
            grid_spacing: 1.0,
        }
    }
}

/// Convert 8-bit sRGB color bytes to linear floats. Alpha stays linear.
pub fn srgb_to_linear(rgba: [u8; 4]) -> [f32; 4] {
    let channel = |c: u8| {
        let c = f32::from(c) / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    let [r, g, b, a] = rgba;
    [channel(r), channel(g), channel(b), f32::from(a) / 255.0]
}

impl DisplayOptions {
    /// Clear color as a wgpu color.
    pub fn clear(&self) -> wgpu::Color {
        let [r, g, b, a] = self.clear_color.map(f64::from);
        wgpu::Color { r, g, b, a }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints_are_exact() {
        assert_eq!(srgb_to_linear([0, 0, 0, 0]), [0.0; 4]);
        assert_eq!(srgb_to_linear([255, 255, 255, 255]), [1.0; 4]);
    }

    #[test]
    fn highlight_green_is_linearized() {
        let [r, g, b, a] = DisplayOptions::default().highlight_tint;
        assert_eq!(r, 0.0);
        assert!((g - 0.7758).abs() < 1e-3, "{g}");
        assert!((b - 0.0296).abs() < 1e-3, "{b}");
        assert_eq!(a, 1.0);
    }

    #[test]
    fn linear_values_sit_below_their_srgb_bytes() {
        for byte in [16_u8, 64, 128, 200] {
            let [linear, ..] = srgb_to_linear([byte, 0, 0, 255]);
            assert!(linear < f32::from(byte) / 255.0, "{byte}");
        }
    }
}
