//! End-to-end picking on a headless GPU device.
//!
//! Each test returns early when no adapter is available.

use glam::Vec3;
use hoverpick::gpu::render_context::RenderContext;
use hoverpick::gpu::texture::RenderTarget;
use hoverpick::mesh::Primitive;
use hoverpick::options::Options;
use hoverpick::scene::ObjectDesc;
use hoverpick::{ObjectId, PickingEngine};

const SIZE: (u32, u32) = (256, 256);

fn cube(position: [f32; 3]) -> ObjectDesc {
    ObjectDesc {
        primitive: Primitive::Cube {
            size: [1.0, 1.0, 1.0],
        },
        position,
    }
}

fn front_camera_options(objects: &[ObjectDesc]) -> Options {
    let mut options = Options::default();
    options.objects = objects.to_vec();
    options.camera.eye = [0.0, 0.0, 8.0];
    options.camera.target = [0.0, 0.0, 0.0];
    options.camera.orbit_speed = 0.0;
    options
}

/// Engine plus a color target to draw into, or `None` without a GPU.
fn headless_engine(objects: &[ObjectDesc]) -> Option<(PickingEngine, RenderTarget)> {
    let context = pollster::block_on(RenderContext::headless(SIZE.0, SIZE.1)).ok()?;
    let target =
        RenderTarget::new(&context.device, "Test Color Target", SIZE, context.format());
    let engine =
        PickingEngine::from_context(context, front_camera_options(objects))
            .unwrap();
    Some((engine, target))
}

fn hover(
    engine: &mut PickingEngine,
    target: &RenderTarget,
    cursor: Option<(f32, f32)>,
) -> Option<ObjectId> {
    engine.set_cursor(cursor);
    engine.render_to_view(&target.view);
    engine.hovered()
}

/// Copy one texel of the visible pass back to the CPU.
fn read_pixel(
    engine: &PickingEngine,
    target: &RenderTarget,
    (x, y): (f32, f32),
) -> [u8; 4] {
    let context = engine.context();
    let buffer = context.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Test Pixel Readback"),
        size: u64::from(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });
    let mut encoder = context.create_encoder("Test Pixel Readback Encoder");
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &target.texture,
            mip_level: 0,
            origin: wgpu::Origin3d {
                x: x as u32,
                y: y as u32,
                z: 0,
            },
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &buffer,
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
    context.submit(encoder);

    let slice = buffer.slice(..4);
    let (sender, receiver) = std::sync::mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = sender.send(result);
    });
    let _ = context.device.poll(wgpu::PollType::Wait).unwrap();
    receiver.recv().unwrap().unwrap();
    let data = slice.get_mapped_range();
    let pixel = [data[0], data[1], data[2], data[3]];
    drop(data);
    buffer.unmap();
    pixel
}

fn screen_point(engine: &PickingEngine, world: Vec3) -> (f32, f32) {
    let p = engine.camera().world_to_screen(world, engine.size()).unwrap();
    (p.x, p.y)
}

fn four_shapes() -> Vec<ObjectDesc> {
    vec![
        cube([-2.4, 0.0, 0.0]),
        ObjectDesc {
            primitive: Primitive::Sphere {
                radius: 0.5,
                rings: 10,
                slices: 20,
            },
            position: [-0.8, 0.0, 0.0],
        },
        ObjectDesc {
            primitive: Primitive::Cylinder {
                radius: 0.5,
                height: 1.0,
                slices: 20,
            },
            position: [0.8, -0.5, 0.0],
        },
        ObjectDesc {
            primitive: Primitive::Cone {
                radius: 0.5,
                height: 1.0,
                slices: 20,
            },
            position: [2.4, -0.5, 0.0],
        },
    ]
}

#[test]
fn cursor_over_each_object_decodes_its_identifier() {
    let Some((mut engine, target)) = headless_engine(&four_shapes()) else {
        return;
    };
    // Probe points inside each silhouette: cylinder and cone stand on
    // their position, so aim a little above the base.
    let probes = [
        Vec3::new(-2.4, 0.0, 0.0),
        Vec3::new(-0.8, 0.0, 0.0),
        Vec3::new(0.8, 0.0, 0.0),
        Vec3::new(2.4, -0.2, 0.0),
    ];
    for (raw, probe) in probes.into_iter().enumerate() {
        let cursor = screen_point(&engine, probe);
        let hovered = hover(&mut engine, &target, Some(cursor));
        assert_eq!(hovered, ObjectId::new(raw as u32), "probe {raw} at {cursor:?}");
    }
}

#[test]
fn only_the_hovered_object_is_highlighted() {
    let Some((mut engine, target)) = headless_engine(&four_shapes()) else {
        return;
    };
    let cursor = screen_point(&engine, Vec3::new(0.8, 0.0, 0.0));
    assert_eq!(hover(&mut engine, &target, Some(cursor)), ObjectId::new(2));

    let display = &engine.options().display;
    for object in engine.scene().objects() {
        let expected = if object.id().get() == 2 {
            display.highlight_tint
        } else {
            display.base_tint
        };
        assert_eq!(object.tint(), expected, "object {}", object.id());
    }
}

#[test]
fn highlight_reaches_only_the_hovered_objects_pixels() {
    let Some((mut engine, target)) = headless_engine(&four_shapes()) else {
        return;
    };
    let hovered_point = screen_point(&engine, Vec3::new(0.8, 0.0, 0.0));
    let other_point = screen_point(&engine, Vec3::new(-2.4, 0.0, 0.0));

    assert_eq!(hover(&mut engine, &target, Some((1.0, 1.0))), None);
    let hovered_plain = read_pixel(&engine, &target, hovered_point);
    let other_plain = read_pixel(&engine, &target, other_point);

    assert_eq!(
        hover(&mut engine, &target, Some(hovered_point)),
        ObjectId::new(2)
    );
    let hovered_lit = read_pixel(&engine, &target, hovered_point);
    let other_lit = read_pixel(&engine, &target, other_point);

    // The highlight tint has no red, so the hovered texel loses its red
    // channel; the other object is drawn exactly as before.
    assert_ne!(hovered_lit, hovered_plain);
    assert_eq!(hovered_lit[0], 0, "{hovered_lit:?}");
    assert_eq!(other_lit, other_plain);
}

#[test]
fn background_decodes_to_nothing() {
    let Some((mut engine, target)) = headless_engine(&four_shapes()) else {
        return;
    };
    assert_eq!(hover(&mut engine, &target, Some((1.0, 1.0))), None);

    let display = &engine.options().display;
    assert!(engine
        .scene()
        .objects()
        .iter()
        .all(|object| object.tint() == display.base_tint));
}

#[test]
fn nearer_object_wins_regardless_of_draw_order() {
    let near = cube([0.0, 0.0, 1.0]);
    let far = cube([0.0, 0.0, -1.0]);

    let Some((mut engine, target)) = headless_engine(&[near, far]) else {
        return;
    };
    let center = screen_point(&engine, Vec3::ZERO);
    assert_eq!(hover(&mut engine, &target, Some(center)), ObjectId::new(0));

    let Some((mut engine, target)) = headless_engine(&[far, near]) else {
        return;
    };
    assert_eq!(hover(&mut engine, &target, Some(center)), ObjectId::new(1));
}

#[test]
fn cursor_outside_the_viewport_is_no_selection() {
    let Some((mut engine, target)) = headless_engine(&four_shapes()) else {
        return;
    };
    let inside = screen_point(&engine, Vec3::new(-0.8, 0.0, 0.0));
    assert_eq!(hover(&mut engine, &target, Some(inside)), ObjectId::new(1));

    for cursor in [(-5.0, 10.0), (10.0, 256.0), (4096.0, 4096.0)] {
        assert_eq!(hover(&mut engine, &target, Some(cursor)), None);
    }
}

#[test]
fn cursor_leaving_the_window_clears_the_hover() {
    let Some((mut engine, target)) = headless_engine(&four_shapes()) else {
        return;
    };
    let inside = screen_point(&engine, Vec3::new(-2.4, 0.0, 0.0));
    assert_eq!(hover(&mut engine, &target, Some(inside)), ObjectId::new(0));
    assert_eq!(hover(&mut engine, &target, None), None);
}

#[test]
fn resize_keeps_picking_consistent() {
    let Some((mut engine, _)) = headless_engine(&four_shapes()) else {
        return;
    };
    engine.resize(320, 200);
    engine.resize(320, 200);
    assert_eq!(engine.picking().size(), (320, 200));

    let target = RenderTarget::new(
        &engine.context().device,
        "Resized Color Target",
        (320, 200),
        engine.context().format(),
    );
    let cursor = screen_point(&engine, Vec3::new(-0.8, 0.0, 0.0));
    assert_eq!(hover(&mut engine, &target, Some(cursor)), ObjectId::new(1));
}
