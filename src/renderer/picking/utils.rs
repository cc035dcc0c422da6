//! Cursor to ID-buffer texel mapping.

use super::pipeline::PickError;

/// Where row 0 of a render target lives relative to the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelOrigin {
    /// Row 0 is the top row, matching window coordinates.
    TopLeft,
    /// Row 0 is the bottom row (GL-style framebuffers).
    BottomLeft,
}

/// wgpu textures address texels from the top-left, like window coordinates.
pub const RENDER_TARGET_ORIGIN: PixelOrigin = PixelOrigin::TopLeft;

/// Map a cursor position in physical window pixels to the texel of a
/// `width x height` target stored with `origin`.
///
/// # Errors
///
/// Returns [`PickError::OutOfRange`] when the cursor lies outside the
/// target (including non-finite positions).
pub fn cursor_texel(
    (x, y): (f32, f32),
    (width, height): (u32, u32),
    origin: PixelOrigin,
) -> Result<(u32, u32), PickError> {
    let out_of_range = PickError::OutOfRange {
        x,
        y,
        width,
        height,
    };
    let (col, row) = (x.floor(), y.floor());
    if !(col >= 0.0 && row >= 0.0)
        || col >= width as f32
        || row >= height as f32
    {
        return Err(out_of_range);
    }
    let (col, row) = (col as u32, row as u32);
    let row = match origin {
        PixelOrigin::TopLeft => row,
        PixelOrigin::BottomLeft => height - 1 - row,
    };
    Ok((col, row))
}
