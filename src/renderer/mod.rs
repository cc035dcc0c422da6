//! Render passes.
//!
//! [`picking`] draws the off-screen ID buffer and reads it back;
//! [`scene_pass`] draws what the user sees.

pub mod picking;
pub mod scene_pass;
