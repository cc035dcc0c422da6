//! GPU resource management utilities.
//!
//! Provides wgpu device/surface initialization, shader composition, texture
//! helpers and the bind-group boilerplate shared by both render passes.

/// Shared bind-group-layout and depth-state helpers.
pub mod pipeline_helpers;
/// wgpu device, surface, and queue initialization.
pub mod render_context;
/// WGSL shader composition with `#import` support via naga-oil.
pub mod shader_composer;
/// Render targets, depth targets and sampled textures.
pub mod texture;
