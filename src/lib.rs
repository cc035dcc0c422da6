// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! GPU color-ID mouse picking demo built on wgpu.
//!
//! A handful of primitive meshes sit on a grid under an orbiting camera.
//! Every frame the objects are drawn into an off-screen "ID buffer" where
//! each one is a flat color encoding its [`ObjectId`]; the single texel
//! under the cursor is read back and decoded, and the visible scene is then
//! drawn with the hovered object highlighted.
//!
//! # Key entry points
//!
//! - [`engine::PickingEngine`] - owns every GPU resource and runs the frame
//! - [`renderer::picking`] - the identifier codec, ID pass and readback
//! - [`scene::Scene`] - the ordered collection of pickable objects
//! - [`options::Options`] - TOML-backed configuration
//!
//! # Frame
//!
//! `BUILD_ID_BUFFER -> READBACK_AND_DECODE -> DRAW_SCENE`. The readback is a
//! blocking round trip: the CPU waits for the ID pass to finish before the
//! visible scene is encoded.

pub mod camera;
pub mod engine;
pub mod error;
pub mod gpu;
pub mod mesh;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod util;
#[cfg(feature = "viewer")]
pub mod viewer;

pub use engine::PickingEngine;
pub use error::HoverPickError;
pub use renderer::picking::{ObjectId, PickColor, NO_OBJECT};
#[cfg(feature = "viewer")]
pub use viewer::Viewer;
