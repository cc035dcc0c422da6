//! The ID render pass and single-texel readback.
//!
//! Objects are drawn unlit, without blending, each as the flat color that
//! encodes its identifier. After the pass the texel under the cursor is
//! copied into a small staging buffer, and the CPU blocks until the copy
//! is mapped so the hovered object is known before the visible scene is
//! drawn.

use std::fmt;
use std::sync::mpsc::{self, TryRecvError};

use super::codec::{ObjectId, PickColor};
use super::utils::{cursor_texel, RENDER_TARGET_ORIGIN};
use crate::error::HoverPickError;
use crate::gpu::pipeline_helpers;
use crate::gpu::render_context::RenderContext;
use crate::gpu::shader_composer::{Shader, ShaderComposer};
use crate::gpu::texture::RenderTarget;
use crate::mesh::Vertex;
use crate::scene::SceneObject;

/// Format of the ID buffer. Exact 8-bit channels, no sRGB conversion.
pub const PICK_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Bytes read back per pick; one `Rgba8Unorm` texel.
const TEXEL_BYTES: u64 = 4;

/// Why a pick produced no identifier.
#[derive(Debug)]
pub enum PickError {
    /// The cursor lies outside the ID buffer.
    OutOfRange {
        /// Cursor x in physical pixels.
        x: f32,
        /// Cursor y in physical pixels.
        y: f32,
        /// ID buffer width.
        width: u32,
        /// ID buffer height.
        height: u32,
    },
    /// Mapping the staging buffer failed.
    Map(wgpu::BufferAsyncError),
    /// Waiting on the device failed.
    Poll(wgpu::PollError),
    /// The map callback was dropped without reporting.
    Disconnected,
    /// A map from an earlier frame is still outstanding, so no texel was
    /// copied this frame.
    Busy,
}

impl fmt::Display for PickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange {
                x,
                y,
                width,
                height,
            } => write!(
                f,
                "cursor ({x}, {y}) outside {width}x{height} pick buffer"
            ),
            Self::Map(e) => write!(f, "pick readback map failed: {e}"),
            Self::Poll(e) => write!(f, "pick readback poll failed: {e}"),
            Self::Disconnected => {
                write!(f, "pick readback callback never fired")
            }
            Self::Busy => write!(f, "previous pick readback still mapping"),
        }
    }
}

impl std::error::Error for PickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Map(e) => Some(e),
            Self::Poll(e) => Some(e),
            Self::OutOfRange { .. } | Self::Disconnected | Self::Busy => None,
        }
    }
}

/// Result of the staging buffer's map request, as seen by `try_recv`.
type MapReply = Result<Result<(), wgpu::BufferAsyncError>, TryRecvError>;

/// State of the staging buffer's map request after a poll.
#[derive(Debug, PartialEq, Eq)]
enum MapState {
    /// Mapped; must be read or unmapped before the next copy.
    Mapped,
    /// The map failed and the buffer is idle again.
    Failed(wgpu::BufferAsyncError),
    /// The callback has not fired yet.
    Pending,
    /// The callback was dropped; the buffer is idle.
    Dropped,
}

impl MapState {
    fn from_reply(reply: MapReply) -> Self {
        match reply {
            Ok(Ok(())) => Self::Mapped,
            Ok(Err(e)) => Self::Failed(e),
            Err(TryRecvError::Empty) => Self::Pending,
            Err(TryRecvError::Disconnected) => Self::Dropped,
        }
    }

    /// Whether the staging buffer can take a new copy once this state has
    /// been handled.
    const fn releases_buffer(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Off-screen ID buffer, its pipeline and the readback staging buffer.
pub struct Picking {
    pipeline: wgpu::RenderPipeline,
    target: RenderTarget,
    depth: RenderTarget,
    staging_buffer: wgpu::Buffer,
    /// Map request left over from a frame whose readback failed.
    readback_in_flight: Option<mpsc::Receiver<Result<(), wgpu::BufferAsyncError>>>,
    width: u32,
    height: u32,
}

impl Picking {
    /// Build the ID pipeline and size the targets to the context.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError::Shader`] if the ID shader fails to compose.
    pub fn new(
        context: &RenderContext,
        camera_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        shader_composer: &mut ShaderComposer,
    ) -> Result<Self, HoverPickError> {
        let device = &context.device;
        let shader = shader_composer.compose(device, Shader::Pick)?;

        let layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Picking Pipeline Layout"),
                bind_group_layouts: &[camera_layout, object_layout],
                push_constant_ranges: &[],
            });

        let pipeline =
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Picking Pipeline"),
                layout: Some(&layout),
                vertex: wgpu::VertexState {
                    module: &shader,
                    entry_point: Some("vs_main"),
                    buffers: &[Vertex::layout()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &shader,
                    entry_point: Some("fs_main"),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: PICK_FORMAT,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: None,
                    ..Default::default()
                },
                depth_stencil: Some(pipeline_helpers::depth_stencil()),
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            });

        // One padded row; copies must align rows to 256 bytes.
        let staging_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Picking Staging Buffer"),
            size: u64::from(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });

        let (width, height) = context.size();
        Ok(Self {
            pipeline,
            target: RenderTarget::new(
                device,
                "Picking Texture",
                (width, height),
                PICK_FORMAT,
            ),
            depth: RenderTarget::depth(
                device,
                "Picking Depth Texture",
                (width, height),
            ),
            staging_buffer,
            readback_in_flight: None,
            width,
            height,
        })
    }

    /// Recreate the ID and depth targets at the new size. Zero-sized or
    /// unchanged sizes are ignored.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size() {
            return;
        }
        self.width = width;
        self.height = height;
        self.target =
            RenderTarget::new(device, "Picking Texture", (width, height), PICK_FORMAT);
        self.depth =
            RenderTarget::depth(device, "Picking Depth Texture", (width, height));
    }

    /// Current ID buffer size.
    pub const fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Run one full pick: draw the ID pass, copy the texel under `cursor`,
    /// submit, and block until it can be decoded.
    ///
    /// The ID pass is submitted even without a usable cursor so the buffer
    /// always reflects the current frame. While a map from a failed frame
    /// is still outstanding no texel is copied.
    ///
    /// # Errors
    ///
    /// [`PickError::OutOfRange`] when the cursor is outside the viewport;
    /// [`PickError::Busy`] while an earlier map is outstanding;
    /// [`PickError::Map`], [`PickError::Poll`] or
    /// [`PickError::Disconnected`] when the readback fails.
    pub fn pick(
        &mut self,
        context: &RenderContext,
        camera_bind_group: &wgpu::BindGroup,
        objects: &[SceneObject],
        cursor: Option<(f32, f32)>,
    ) -> Result<Option<ObjectId>, PickError> {
        let mut encoder = context.create_encoder("Picking Encoder");
        self.encode_id_pass(&mut encoder, camera_bind_group, objects);

        let texel = cursor.map(|pos| {
            cursor_texel(pos, self.size(), RENDER_TARGET_ORIGIN)
        });
        let staging_free = self.release_staging(&context.device);
        let copy_cell = match texel {
            Some(Ok(cell)) if staging_free => Some(cell),
            _ => None,
        };
        if let Some(cell) = copy_cell {
            self.copy_texel_to_staging(&mut encoder, cell);
        }
        context.submit(encoder);

        match texel {
            None => Ok(None),
            Some(Err(e)) => Err(e),
            Some(Ok(_)) if copy_cell.is_none() => Err(PickError::Busy),
            Some(Ok(_)) => Ok(self.read_back(&context.device)?.decode()),
        }
    }

    /// Settle a map left over from an earlier failed readback. Returns
    /// `true` once the staging buffer is idle and can take a new copy.
    fn release_staging(&mut self, device: &wgpu::Device) -> bool {
        let Some(receiver) = &self.readback_in_flight else {
            return true;
        };
        let _ = device.poll(wgpu::PollType::Poll);
        let state = MapState::from_reply(receiver.try_recv());
        if state == MapState::Mapped {
            self.staging_buffer.unmap();
        }
        if state.releases_buffer() {
            log::debug!("stale pick readback settled: {state:?}");
            self.readback_in_flight = None;
        }
        state.releases_buffer()
    }

    /// Record the ID pass into `encoder`.
    ///
    /// The buffer is cleared to [`PickColor::CLEAR`] and every object drawn
    /// with depth testing, so the nearest surface wins each texel.
    pub fn encode_id_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        camera_bind_group: &wgpu::BindGroup,
        objects: &[SceneObject],
    ) {
        let mut render_pass =
            encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Picking Render Pass"),
                color_attachments: &[Some(
                    pipeline_helpers::clear_color_attachment(
                        &self.target.view,
                        PickColor::CLEAR.to_wgpu(),
                    ),
                )],
                depth_stencil_attachment: Some(
                    pipeline_helpers::clear_depth_attachment(&self.depth.view),
                ),
                ..Default::default()
            });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, camera_bind_group, &[]);
        for object in objects {
            render_pass.set_bind_group(1, object.bind_group(), &[]);
            object.mesh().draw(&mut render_pass);
        }
    }

    /// Copy one texel of the ID buffer to the staging buffer.
    fn copy_texel_to_staging(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        (x, y): (u32, u32),
    ) {
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.target.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &self.staging_buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
                    rows_per_image: Some(1),
                },
            },
            wgpu::Extent3d {
                width: 1,
                height: 1,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Map the staging buffer and block until the copied texel is readable.
    ///
    /// If the wait fails the request stays recorded in
    /// `readback_in_flight` and is settled by a later frame.
    fn read_back(&mut self, device: &wgpu::Device) -> Result<PickColor, PickError> {
        let buffer_slice = self.staging_buffer.slice(..TEXEL_BYTES);
        let (sender, receiver) = mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });

        if let Err(e) = device.poll(wgpu::PollType::Wait) {
            self.readback_in_flight = Some(receiver);
            return Err(PickError::Poll(e));
        }
        match MapState::from_reply(receiver.try_recv()) {
            MapState::Mapped => {}
            MapState::Failed(e) => return Err(PickError::Map(e)),
            MapState::Dropped => return Err(PickError::Disconnected),
            MapState::Pending => {
                self.readback_in_flight = Some(receiver);
                return Err(PickError::Busy);
            }
        }

        let mut texel = [0u8; 4];
        {
            let data = buffer_slice.get_mapped_range();
            texel.copy_from_slice(&data[..4]);
        }
        self.staging_buffer.unmap();
        Ok(PickColor(texel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message_names_the_cursor_and_size() {
        let e = PickError::OutOfRange {
            x: -1.0,
            y: 2.5,
            width: 800,
            height: 450,
        };
        let msg = e.to_string();
        assert!(msg.contains("(-1, 2.5)"), "{msg}");
        assert!(msg.contains("800x450"), "{msg}");
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn map_replies_translate_to_buffer_states() {
        assert_eq!(MapState::from_reply(Ok(Ok(()))), MapState::Mapped);
        assert_eq!(
            MapState::from_reply(Ok(Err(wgpu::BufferAsyncError))),
            MapState::Failed(wgpu::BufferAsyncError)
        );
        assert_eq!(
            MapState::from_reply(Err(TryRecvError::Empty)),
            MapState::Pending
        );
        assert_eq!(
            MapState::from_reply(Err(TryRecvError::Disconnected)),
            MapState::Dropped
        );
    }

    #[test]
    fn only_a_pending_map_keeps_the_staging_buffer_busy() {
        assert!(MapState::Mapped.releases_buffer());
        assert!(MapState::Failed(wgpu::BufferAsyncError).releases_buffer());
        assert!(MapState::Dropped.releases_buffer());
        assert!(!MapState::Pending.releases_buffer());
    }

    #[test]
    fn late_callback_is_seen_on_the_next_frame() {
        let (sender, receiver) = mpsc::channel();
        assert_eq!(MapState::from_reply(receiver.try_recv()), MapState::Pending);
        sender.send(Ok(())).unwrap();
        assert_eq!(MapState::from_reply(receiver.try_recv()), MapState::Mapped);
        drop(sender);
        assert_eq!(MapState::from_reply(receiver.try_recv()), MapState::Dropped);
    }

    #[test]
    fn busy_is_not_a_fault() {
        let e = PickError::Busy;
        assert!(e.to_string().contains("still mapping"));
        assert!(std::error::Error::source(&e).is_none());
    }

    #[test]
    fn pick_format_stores_exact_bytes() {
        assert!(!PICK_FORMAT.is_srgb());
        assert_eq!(PICK_FORMAT.block_copy_size(None), Some(4));
    }
}
