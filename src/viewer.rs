//! Standalone window backed by winit.
//!
//! ```no_run
//! # use hoverpick::Viewer;
//! # fn main() -> Result<(), hoverpick::HoverPickError> {
//! Viewer::builder().build().run()
//! # }
//! ```

use std::sync::Arc;

use web_time::{Duration, Instant};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{error::HoverPickError, options::Options, PickingEngine};

/// How often the HUD in the window title is refreshed.
const TITLE_REFRESH: Duration = Duration::from_millis(250);

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    options: Option<Options>,
}

impl ViewerBuilder {
    const fn new() -> Self {
        Self { options: None }
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = Some(options);
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer {
            options: self.options.unwrap_or_default(),
        }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window showing the picking demo scene.
///
/// Construct via [`Viewer::builder`], then call [`run`](Self::run) to
/// enter the event loop.
pub struct Viewer {
    options: Options,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub const fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Open the window and run the event loop. Blocks until the window is
    /// closed or Escape is pressed.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError`] if the event loop, window or engine
    /// can't be created.
    pub fn run(self) -> Result<(), HoverPickError> {
        let event_loop = EventLoop::new()
            .map_err(|e| HoverPickError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp {
            engine: None,
            window: None,
            last_frame_time: Instant::now(),
            last_title_refresh: Instant::now(),
            options: Some(self.options),
            init_error: None,
        };

        event_loop
            .run_app(&mut app)
            .map_err(|e| HoverPickError::Viewer(e.to_string()))?;

        app.init_error.map_or(Ok(()), Err)
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Internal winit application handler. The engine is declared before the
/// window so its surface drops first.
struct ViewerApp {
    engine: Option<PickingEngine>,
    window: Option<Arc<Window>>,
    last_frame_time: Instant,
    last_title_refresh: Instant,
    options: Option<Options>,
    init_error: Option<HoverPickError>,
}

/// Surface size for a window; never zero.
fn viewport_size(inner: winit::dpi::PhysicalSize<u32>) -> (u32, u32) {
    (inner.width.max(1), inner.height.max(1))
}

impl ViewerApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: HoverPickError) {
        log::error!("{error}");
        self.init_error = Some(error);
        event_loop.exit();
    }

    fn resize_to_window(&mut self) {
        if let (Some(window), Some(engine)) = (&self.window, &mut self.engine)
        {
            let (width, height) = viewport_size(window.inner_size());
            engine.resize(width, height);
        }
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        let Some(engine) = &mut self.engine else {
            return;
        };
        engine.update(dt);
        match engine.render() {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                self.resize_to_window();
            }
            Err(e) => log::error!("render error: {e:?}"),
        }

        if let (Some(window), Some(engine)) = (&self.window, &self.engine) {
            if now.duration_since(self.last_title_refresh) >= TITLE_REFRESH {
                window.set_title(&engine.status());
                self.last_title_refresh = now;
            }
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let options = self.options.take().unwrap_or_default();

        let attrs = Window::default_attributes()
            .with_title(&options.window.title)
            .with_inner_size(winit::dpi::LogicalSize::new(
                options.window.width,
                options.window.height,
            ));
        let window = match event_loop.create_window(attrs) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, HoverPickError::Viewer(e.to_string()));
                return;
            }
        };

        let size = viewport_size(window.inner_size());
        let engine = match pollster::block_on(PickingEngine::new(
            window.clone(),
            size,
            options,
        )) {
            Ok(engine) => engine,
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        };

        window.request_redraw();
        self.last_frame_time = Instant::now();
        self.window = Some(window);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: WindowId,
        event: WindowEvent,
    ) {
        if matches!(event, WindowEvent::CloseRequested) {
            event_loop.exit();
            return;
        }

        // Guard: both window and engine must be initialised.
        if self.window.is_none() || self.engine.is_none() {
            return;
        }

        match event {
            WindowEvent::Resized(_)
            | WindowEvent::ScaleFactorChanged { .. } => {
                self.resize_to_window();
            }

            WindowEvent::RedrawRequested => self.redraw(),

            WindowEvent::CursorMoved { position, .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.set_cursor(Some((
                        position.x as f32,
                        position.y as f32,
                    )));
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if let Some(engine) = &mut self.engine {
                    engine.set_cursor(None);
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    event_loop.exit();
                }
            }

            _ => (),
        }
    }
}
