//! GPU color-ID object picking.
//!
//! Every object is rendered into an offscreen `Rgba8Unorm` buffer as a flat
//! color encoding its identifier; the texel under the cursor is copied back
//! and decoded to find the hovered object.

mod codec;
mod pipeline;
mod utils;

pub use codec::{ObjectId, PickColor, NO_OBJECT};
pub use pipeline::{PickError, Picking, PICK_FORMAT};
pub use utils::{cursor_texel, PixelOrigin, RENDER_TARGET_ORIGIN};
