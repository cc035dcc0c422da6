use std::fmt;

/// Errors that can occur while opening the GPU.
#[derive(Debug)]
pub enum RenderContextError {
    /// The window handle could not back a wgpu surface.
    SurfaceCreation(wgpu::CreateSurfaceError),
    /// No adapter matched the request.
    AdapterRequest(wgpu::RequestAdapterError),
    /// The adapter refused the device limits or features.
    DeviceRequest(wgpu::RequestDeviceError),
    /// The adapter can't present to the window surface.
    UnsupportedSurface,
}

impl fmt::Display for RenderContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SurfaceCreation(e) => write!(f, "cannot create surface: {e}"),
            Self::AdapterRequest(e) => write!(f, "no usable GPU adapter: {e}"),
            Self::DeviceRequest(e) => write!(f, "cannot open device: {e}"),
            Self::UnsupportedSurface => {
                write!(f, "adapter cannot present to this surface")
            }
        }
    }
}

impl std::error::Error for RenderContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SurfaceCreation(e) => Some(e),
            Self::AdapterRequest(e) => Some(e),
            Self::DeviceRequest(e) => Some(e),
            Self::UnsupportedSurface => None,
        }
    }
}

/// A window surface and the configuration it was last set up with.
struct Presentation {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
}

/// Device, queue and, when windowed, the presentation surface.
///
/// Headless contexts render only into textures; they report the format
/// and size the passes are built for.
pub struct RenderContext {
    /// The wgpu logical device.
    pub device: wgpu::Device,
    /// The wgpu command queue.
    pub queue: wgpu::Queue,
    presentation: Option<Presentation>,
    format: wgpu::TextureFormat,
    size: (u32, u32),
}

impl RenderContext {
    /// Open a context presenting to `window`.
    ///
    /// # Errors
    ///
    /// Returns `RenderContextError` if the surface, adapter or device
    /// can't be created, or the adapter can't present to the surface.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        size: (u32, u32),
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window)
            .map_err(RenderContextError::SurfaceCreation)?;
        let (adapter, device, queue) = open_device(
            &instance,
            &wgpu::RequestAdapterOptions {
                compatible_surface: Some(&surface),
                power_preference: wgpu::PowerPreference::HighPerformance,
                ..Default::default()
            },
        )
        .await?;

        let size = clamp_size(size);
        let mut config = surface
            .get_default_config(&adapter, size.0, size.1)
            .ok_or(RenderContextError::UnsupportedSurface)?;
        config.present_mode = wgpu::PresentMode::Fifo;
        surface.configure(&device, &config);

        Ok(Self {
            device,
            queue,
            format: config.format,
            presentation: Some(Presentation { surface, config }),
            size,
        })
    }

    /// Open a context with no surface, rendering `Rgba8UnormSrgb` targets
    /// of the given size. Used by tests and off-screen tools.
    ///
    /// # Errors
    ///
    /// Returns `RenderContextError` if no adapter or device is available.
    pub async fn headless(
        width: u32,
        height: u32,
    ) -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::default();
        let (_, device, queue) =
            open_device(&instance, &wgpu::RequestAdapterOptions::default())
                .await?;
        Ok(Self {
            device,
            queue,
            presentation: None,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            size: clamp_size((width, height)),
        })
    }

    /// Color format the passes render to.
    pub const fn format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Current viewport size in physical pixels.
    pub const fn size(&self) -> (u32, u32) {
        self.size
    }

    /// Track a new viewport size and reconfigure the surface, if any.
    /// Zero-sized dimensions are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.size = (width, height);
        if let Some(presentation) = &mut self.presentation {
            presentation.config.width = width;
            presentation.config.height = height;
            presentation
                .surface
                .configure(&self.device, &presentation.config);
        }
    }

    /// Acquire the next swapchain texture.
    ///
    /// # Errors
    ///
    /// Returns [`wgpu::SurfaceError`] if the surface is lost, outdated or
    /// timed out; headless contexts always report `Lost`.
    pub fn get_next_frame(
        &self,
    ) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.presentation
            .as_ref()
            .map_or(Err(wgpu::SurfaceError::Lost), |presentation| {
                presentation.surface.get_current_texture()
            })
    }

    /// Create a labelled command encoder.
    pub fn create_encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(label),
            })
    }

    /// Finish `encoder` and submit it.
    pub fn submit(&self, encoder: wgpu::CommandEncoder) {
        let _ = self.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn clamp_size((width, height): (u32, u32)) -> (u32, u32) {
    (width.max(1), height.max(1))
}

async fn open_device(
    instance: &wgpu::Instance,
    options: &wgpu::RequestAdapterOptions<'_, '_>,
) -> Result<(wgpu::Adapter, wgpu::Device, wgpu::Queue), RenderContextError> {
    let adapter = instance
        .request_adapter(options)
        .await
        .map_err(RenderContextError::AdapterRequest)?;
    log::info!("using adapter: {}", adapter.get_info().name);

    let (device, queue) = adapter
        .request_device(&wgpu::DeviceDescriptor {
            label: Some("Hoverpick Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::downlevel_defaults()
                .using_resolution(adapter.limits()),
            ..Default::default()
        })
        .await
        .map_err(RenderContextError::DeviceRequest)?;
    Ok((adapter, device, queue))
}
