//! The frame loop state: every GPU resource and the per-frame pick.
//!
//! Each frame runs `BUILD_ID_BUFFER -> READBACK_AND_DECODE -> DRAW_SCENE`:
//! the ID pass is submitted and the texel under the cursor read back
//! before the visible scene is encoded, so the highlight always matches
//! the frame it is drawn in.

use crate::camera::controller::CameraController;
use crate::camera::core::Camera;
use crate::error::HoverPickError;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::ShaderComposer;
use crate::options::Options;
use crate::renderer::picking::{ObjectId, PickError, Picking};
use crate::renderer::scene_pass::ScenePass;
use crate::scene::Scene;
use crate::util::frame_timing::FrameTiming;

/// HUD text: window title, hovered identifier and frame rate.
pub fn status_line(title: &str, hovered: Option<ObjectId>, fps: f32) -> String {
    let hovered = hovered.map_or_else(|| "none".to_owned(), |id| id.to_string());
    format!("{title} | hovered: {hovered} | {fps:.0} FPS")
}

/// Owns the render context and everything drawn with it.
///
/// Fields drop top to bottom, so the passes and scene release their GPU
/// resources before the device and surface in [`RenderContext`].
pub struct PickingEngine {
    scene_pass: ScenePass,
    picking: Picking,
    scene: Scene,
    camera: CameraController,
    frame_timing: FrameTiming,
    cursor: Option<(f32, f32)>,
    hovered: Option<ObjectId>,
    options: Options,
    context: RenderContext,
}

impl PickingEngine {
    /// Create an engine drawing the demo scene into a window surface.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError`] if GPU setup or shader composition fails.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
        options: Options,
    ) -> Result<Self, HoverPickError> {
        let context = RenderContext::new(window, size).await?;
        Self::from_context(context, options)
    }

    /// Create an engine on an existing context, building the objects listed
    /// in `options.objects`. Object `i` gets identifier `i`.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError`] if shader composition fails or there are
    /// more objects than identifiers.
    pub fn from_context(
        context: RenderContext,
        options: Options,
    ) -> Result<Self, HoverPickError> {
        let mut shader_composer = ShaderComposer::new()?;
        let camera = CameraController::new(
            &context.device,
            context.size(),
            &options.camera,
        );
        let scene =
            Scene::new(&context.device, &options.objects, &options.display)?;
        let picking = Picking::new(
            &context,
            &camera.layout,
            scene.object_layout(),
            &mut shader_composer,
        )?;
        let scene_pass = ScenePass::new(
            &context,
            &camera.layout,
            scene.object_layout(),
            &options.display,
            &mut shader_composer,
        )?;
        log::info!(
            "engine ready: {} objects, {:?}",
            scene.objects().len(),
            context.size()
        );

        Ok(Self {
            scene_pass,
            picking,
            scene,
            camera,
            frame_timing: FrameTiming::new(options.window.target_fps),
            cursor: None,
            hovered: None,
            options,
            context,
        })
    }

    /// Resize the surface and every size-dependent target. Zero sizes
    /// (minimized windows) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        log::debug!("resize to {width}x{height}");
        self.context.resize(width, height);
        self.camera.resize(width, height);
        self.picking.resize(&self.context.device, width, height);
        self.scene_pass.resize(&self.context.device, width, height);
    }

    /// Set the cursor position in physical pixels, or `None` when it has
    /// left the window.
    pub fn set_cursor(&mut self, cursor: Option<(f32, f32)>) {
        self.cursor = cursor;
    }

    /// Advance the camera orbit by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        self.camera.update(dt);
    }

    /// Draw one frame to the window surface and present it. Skipped when
    /// the frame limiter says it is too early.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the next frame can't be acquired.
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        if !self.frame_timing.should_render() {
            return Ok(());
        }

        let frame = self.context.get_next_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        self.render_to_view(&view);
        frame.present();

        self.frame_timing.end_frame();
        Ok(())
    }

    /// Run the full frame into `view`, which must match the context's
    /// format and size.
    pub fn render_to_view(&mut self, view: &wgpu::TextureView) {
        self.camera.update_gpu(&self.context.queue);

        let hovered = match self.picking.pick(
            &self.context,
            &self.camera.bind_group,
            self.scene.objects(),
            self.cursor,
        ) {
            Ok(hovered) => hovered,
            Err(e @ PickError::OutOfRange { .. }) => {
                log::trace!("{e}");
                None
            }
            Err(e @ PickError::Busy) => {
                log::debug!("{e}");
                None
            }
            Err(e) => {
                log::warn!("{e}");
                None
            }
        };
        if hovered != self.hovered {
            match hovered.and_then(|id| self.scene.get(id)) {
                Some(object) => {
                    log::debug!("hovering {} {}", object.name(), object.id());
                }
                None => log::debug!("hovering nothing"),
            }
            self.hovered = hovered;
        }

        self.scene.apply_highlight(
            &self.context.queue,
            hovered,
            &self.options.display,
        );

        let mut encoder = self.context.create_encoder("Scene Encoder");
        self.scene_pass.render(
            &mut encoder,
            view,
            &self.camera.bind_group,
            &self.scene,
            &self.options.display,
        );
        self.context.submit(encoder);
    }

    /// Object under the cursor as of the last frame.
    pub const fn hovered(&self) -> Option<ObjectId> {
        self.hovered
    }

    /// The scene objects.
    pub const fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Active options.
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// The current camera.
    pub const fn camera(&self) -> &Camera {
        &self.camera.camera
    }

    /// The render context.
    pub const fn context(&self) -> &RenderContext {
        &self.context
    }

    /// Current viewport size in physical pixels.
    pub const fn size(&self) -> (u32, u32) {
        self.context.size()
    }

    /// The ID-buffer pass.
    pub const fn picking(&self) -> &Picking {
        &self.picking
    }

    /// HUD text for the current state.
    pub fn status(&self) -> String {
        status_line(
            &self.options.window.title,
            self.hovered,
            self.frame_timing.fps(),
        )
    }
}
