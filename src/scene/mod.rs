//! The pickable objects: one ordered collection, identifiers by position.
//!
//! Each [`SceneObject`] owns its mesh, its world position and a uniform
//! carrying the model matrix, the encoded pick color and the current tint.
//! The same bind group feeds both the ID pass and the visible pass.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use wgpu::util::DeviceExt;

use crate::error::HoverPickError;
use crate::gpu::pipeline_helpers;
use crate::mesh::{GpuMesh, Primitive};
use crate::options::DisplayOptions;
use crate::renderer::picking::{ObjectId, PickColor};

/// What to build for one object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObjectDesc {
    /// Shape and its parameters.
    pub primitive: Primitive,
    /// World-space placement.
    pub position: [f32; 3],
}

/// Per-object GPU uniform (group 1 in both passes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    /// Model-to-world transform.
    pub model: [[f32; 4]; 4],
    /// Encoded identifier as unorm floats.
    pub pick_color: [f32; 4],
    /// Tint multiplied into the lit color.
    pub tint: [f32; 4],
}

impl ObjectUniform {
    fn new(id: ObjectId, position: Vec3, tint: [f32; 4]) -> Self {
        Self {
            model: Mat4::from_translation(position).to_cols_array_2d(),
            pick_color: PickColor::encode(id).to_unorm(),
            tint,
        }
    }
}

/// One renderable, pickable entity.
pub struct SceneObject {
    id: ObjectId,
    name: &'static str,
    mesh: GpuMesh,
    uniform: ObjectUniform,
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl SceneObject {
    /// Identifier, equal to the object's index in the scene.
    pub const fn id(&self) -> ObjectId {
        self.id
    }

    /// Primitive name, for logs and the HUD.
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Current tint.
    pub const fn tint(&self) -> [f32; 4] {
        self.uniform.tint
    }

    /// The uploaded mesh.
    pub const fn mesh(&self) -> &GpuMesh {
        &self.mesh
    }

    /// Bind group for the object uniform.
    pub const fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

/// Tint for object `id` given the hovered identifier.
pub fn tint_for(
    id: ObjectId,
    hovered: Option<ObjectId>,
    display: &DisplayOptions,
) -> [f32; 4] {
    if hovered == Some(id) {
        display.highlight_tint
    } else {
        display.base_tint
    }
}

/// All objects, in identifier order.
pub struct Scene {
    objects: Vec<SceneObject>,
    object_layout: wgpu::BindGroupLayout,
}

impl Scene {
    /// Upload every object. The `i`th description gets identifier `i`.
    ///
    /// # Errors
    ///
    /// Returns [`HoverPickError::SceneTooLarge`] if there are more objects
    /// than encodable identifiers.
    pub fn new(
        device: &wgpu::Device,
        descs: &[ObjectDesc],
        display: &DisplayOptions,
    ) -> Result<Self, HoverPickError> {
        let object_layout = pipeline_helpers::uniform_layout(
            device,
            "Object Bind Group Layout",
        );

        let mut objects = Vec::with_capacity(descs.len());
        for (index, desc) in descs.iter().enumerate() {
            let id = u32::try_from(index)
                .ok()
                .and_then(ObjectId::new)
                .ok_or(HoverPickError::SceneTooLarge(descs.len()))?;
            let name = desc.primitive.name();
            let label = format!("{name} {id}");
            let position = Vec3::from(desc.position);
            let uniform = ObjectUniform::new(id, position, display.base_tint);

            let mesh = GpuMesh::upload(device, &label, &desc.primitive.mesh());
            let buffer =
                device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(&format!("{label} Uniform Buffer")),
                    contents: bytemuck::cast_slice(&[uniform]),
                    usage: wgpu::BufferUsages::UNIFORM
                        | wgpu::BufferUsages::COPY_DST,
                });
            let bind_group =
                device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(&format!("{label} Bind Group")),
                    layout: &object_layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: buffer.as_entire_binding(),
                    }],
                });

            objects.push(SceneObject {
                id,
                name,
                mesh,
                uniform,
                buffer,
                bind_group,
            });
        }
        log::debug!("scene built with {} objects", objects.len());

        Ok(Self {
            objects,
            object_layout,
        })
    }

    /// The stock arrangement: cube, sphere, cylinder and cone on a 2x2
    /// layout around the origin. Used as the default `objects` option.
    pub fn demo_layout() -> Vec<ObjectDesc> {
        vec![
            ObjectDesc {
                primitive: Primitive::Cube {
                    size: [1.0, 1.0, 1.0],
                },
                position: [1.0, 0.0, 1.0],
            },
            ObjectDesc {
                primitive: Primitive::Sphere {
                    radius: 0.5,
                    rings: 10,
                    slices: 20,
                },
                position: [-1.0, 0.0, 1.0],
            },
            ObjectDesc {
                primitive: Primitive::Cylinder {
                    radius: 0.5,
                    height: 1.0,
                    slices: 20,
                },
                position: [1.0, 0.0, -1.0],
            },
            ObjectDesc {
                primitive: Primitive::Cone {
                    radius: 0.5,
                    height: 1.0,
                    slices: 20,
                },
                position: [-1.0, 0.0, -1.0],
            },
        ]
    }

    /// Objects in identifier order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Look up an object by identifier.
    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        usize::try_from(id.get())
            .ok()
            .and_then(|index| self.objects.get(index))
    }

    /// Layout of every object's bind group.
    pub const fn object_layout(&self) -> &wgpu::BindGroupLayout {
        &self.object_layout
    }

    /// Retint every object for the hovered identifier, uploading only the
    /// uniforms whose tint changed.
    pub fn apply_highlight(
        &mut self,
        queue: &wgpu::Queue,
        hovered: Option<ObjectId>,
        display: &DisplayOptions,
    ) {
        for object in &mut self.objects {
            let tint = tint_for(object.id, hovered, display);
            if object.uniform.tint == tint {
                continue;
            }
            object.uniform.tint = tint;
            queue.write_buffer(
                &object.buffer,
                0,
                bytemuck::cast_slice(&[object.uniform]),
            );
        }
    }
}
