//! Camera system for 3D scene viewing.
//!
//! Provides a perspective camera, its GPU uniform, and a controller that
//! orbits the camera around its target.

/// Orbiting camera controller owning the camera's GPU resources.
pub mod controller;
/// Core camera struct and GPU uniform types.
pub mod core;
