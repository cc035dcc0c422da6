use glam::{Quat, Vec3};
use wgpu::util::DeviceExt;

use super::core::{Camera, CameraUniform};
use crate::gpu::pipeline_helpers;
use crate::options::CameraOptions;

/// Owns the camera, its uniform buffer and bind group, and advances the
/// automatic orbit around the target.
pub struct CameraController {
    /// Current camera state.
    pub camera: Camera,
    /// CPU copy of the GPU uniform.
    pub uniform: CameraUniform,
    /// Uniform buffer bound at group 0 by both passes.
    pub buffer: wgpu::Buffer,
    /// Layout of [`Self::bind_group`].
    pub layout: wgpu::BindGroupLayout,
    /// Bind group referencing [`Self::buffer`].
    pub bind_group: wgpu::BindGroup,
    /// Orbit speed in radians per second around the target's +Y axis.
    orbit_speed: f32,
}

impl CameraController {
    /// Create the camera from options for a viewport of the given size.
    pub fn new(
        device: &wgpu::Device,
        (width, height): (u32, u32),
        options: &CameraOptions,
    ) -> Self {
        let camera = Camera {
            eye: Vec3::from(options.eye),
            target: Vec3::from(options.target),
            up: Vec3::Y,
            aspect: aspect_ratio(width, height),
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        };

        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);

        let buffer =
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Camera Buffer"),
                contents: bytemuck::cast_slice(&[uniform]),
                usage: wgpu::BufferUsages::UNIFORM
                    | wgpu::BufferUsages::COPY_DST,
            });

        let layout = pipeline_helpers::uniform_layout(
            device,
            "Camera Bind Group Layout",
        );

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
            label: Some("Camera Bind Group"),
        });

        Self {
            camera,
            uniform,
            buffer,
            layout,
            bind_group,
            orbit_speed: options.orbit_speed,
        }
    }

    /// Advance the orbit by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        if self.orbit_speed == 0.0 || dt <= 0.0 {
            return;
        }
        self.camera.eye = orbit(
            self.camera.eye,
            self.camera.target,
            self.orbit_speed * dt,
        );
    }

    /// Upload the current camera state.
    pub fn update_gpu(&mut self, queue: &wgpu::Queue) {
        self.uniform.update_view_proj(&self.camera);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }

    /// Track the viewport aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = aspect_ratio(width, height);
    }
}

/// Rotate `eye` about the vertical axis through `target` by `angle` radians.
fn orbit(eye: Vec3, target: Vec3, angle: f32) -> Vec3 {
    target + Quat::from_rotation_y(angle) * (eye - target)
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
