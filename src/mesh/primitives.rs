use std::f32::consts::{PI, TAU};

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::{GridVertex, MeshData};

/// Procedural primitive shapes.
///
/// Cubes and spheres are centered on their origin; cylinders and cones
/// stand on it and extend up `+Y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "shape")]
pub enum Primitive {
    /// Axis-aligned box.
    Cube {
        /// Edge lengths along X, Y, Z.
        size: [f32; 3],
    },
    /// UV sphere.
    Sphere {
        /// Sphere radius.
        radius: f32,
        /// Latitude subdivisions.
        rings: u32,
        /// Longitude subdivisions.
        slices: u32,
    },
    /// Capped cylinder.
    Cylinder {
        /// Radius of both caps.
        radius: f32,
        /// Height along +Y.
        height: f32,
        /// Subdivisions around the axis.
        slices: u32,
    },
    /// Cone with a closed base.
    Cone {
        /// Base radius.
        radius: f32,
        /// Apex height along +Y.
        height: f32,
        /// Subdivisions around the axis.
        slices: u32,
    },
}

impl Primitive {
    /// Short name for labels and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cube { .. } => "Cube",
            Self::Sphere { .. } => "Sphere",
            Self::Cylinder { .. } => "Cylinder",
            Self::Cone { .. } => "Cone",
        }
    }

    /// Generate the triangle mesh.
    pub fn mesh(&self) -> MeshData {
        match *self {
            Self::Cube { size } => cube(Vec3::from(size)),
            Self::Sphere {
                radius,
                rings,
                slices,
            } => sphere(radius, rings.max(2), slices.max(3)),
            Self::Cylinder {
                radius,
                height,
                slices,
            } => cylinder(radius, height, slices.max(3)),
            Self::Cone {
                radius,
                height,
                slices,
            } => cone(radius, height, slices.max(3)),
        }
    }
}

/// Face normal and in-plane axes with `u x v == normal`, so the quad
/// `(-u-v, u-v, u+v, -u+v)` winds counter-clockwise seen from outside.
const CUBE_FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

fn cube(size: Vec3) -> MeshData {
    let half = size * 0.5;
    let mut mesh = MeshData::default();
    for (normal, u, v) in CUBE_FACES {
        let corners = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)];
        let base = mesh.vertices.len() as u32;
        for (su, sv) in corners {
            let position = (normal + u * su + v * sv) * half;
            let uv = Vec2::new((su + 1.0) * 0.5, 1.0 - (sv + 1.0) * 0.5);
            let _ = mesh.push_vertex(position, normal, uv);
        }
        mesh.push_triangle(base, base + 1, base + 2);
        mesh.push_triangle(base, base + 2, base + 3);
    }
    mesh
}

fn sphere(radius: f32, rings: u32, slices: u32) -> MeshData {
    let mut mesh = MeshData::default();
    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let normal = Vec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );
            let uv =
                Vec2::new(slice as f32 / slices as f32, ring as f32 / rings as f32);
            let _ = mesh.push_vertex(normal * radius, normal, uv);
        }
    }

    let stride = slices + 1;
    for ring in 0..rings {
        for slice in 0..slices {
            let a = ring * stride + slice;
            let b = a + stride;
            let c = b + 1;
            let d = a + 1;
            mesh.push_triangle(a, c, b);
            mesh.push_triangle(a, d, c);
        }
    }
    mesh
}

fn cylinder(radius: f32, height: f32, slices: u32) -> MeshData {
    let mut mesh = MeshData::default();

    for slice in 0..=slices {
        let u = slice as f32 / slices as f32;
        let dir = ring_dir(u);
        let _ = mesh.push_vertex(dir * radius, dir, Vec2::new(u, 1.0));
        let _ = mesh.push_vertex(
            dir * radius + Vec3::Y * height,
            dir,
            Vec2::new(u, 0.0),
        );
    }
    for slice in 0..slices {
        let bottom = slice * 2;
        let top = bottom + 1;
        mesh.push_triangle(bottom, top, top + 2);
        mesh.push_triangle(bottom, top + 2, bottom + 2);
    }

    disc(&mut mesh, radius, height, slices, true);
    disc(&mut mesh, radius, 0.0, slices, false);
    mesh
}

fn cone(radius: f32, height: f32, slices: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let apex = Vec3::Y * height;

    for slice in 0..slices {
        let u0 = slice as f32 / slices as f32;
        let u1 = (slice + 1) as f32 / slices as f32;
        let um = (u0 + u1) * 0.5;
        let (d0, d1, dm) = (ring_dir(u0), ring_dir(u1), ring_dir(um));
        let b0 = mesh.push_vertex(
            d0 * radius,
            cone_normal(d0, radius, height),
            Vec2::new(u0, 1.0),
        );
        let tip = mesh.push_vertex(
            apex,
            cone_normal(dm, radius, height),
            Vec2::new(um, 0.0),
        );
        let b1 = mesh.push_vertex(
            d1 * radius,
            cone_normal(d1, radius, height),
            Vec2::new(u1, 1.0),
        );
        mesh.push_triangle(b0, tip, b1);
    }

    disc(&mut mesh, radius, 0.0, slices, false);
    mesh
}

/// Horizontal unit direction at fraction `u` of a full turn.
fn ring_dir(u: f32) -> Vec3 {
    let theta = TAU * u;
    Vec3::new(theta.cos(), 0.0, theta.sin())
}

fn cone_normal(dir: Vec3, radius: f32, height: f32) -> Vec3 {
    (dir * height + Vec3::Y * radius).normalize_or(Vec3::Y)
}

/// Flat cap at height `y`, facing up or down.
fn disc(mesh: &mut MeshData, radius: f32, y: f32, slices: u32, up: bool) {
    let normal = if up { Vec3::Y } else { Vec3::NEG_Y };
    let center =
        mesh.push_vertex(Vec3::Y * y, normal, Vec2::splat(0.5));
    let first = mesh.vertices.len() as u32;
    for slice in 0..=slices {
        let dir = ring_dir(slice as f32 / slices as f32);
        let uv = Vec2::new(dir.x, dir.z) * 0.5 + Vec2::splat(0.5);
        let _ = mesh.push_vertex(dir * radius + Vec3::Y * y, normal, uv);
    }
    for slice in 0..slices {
        let (a, b) = (first + slice, first + slice + 1);
        if up {
            mesh.push_triangle(center, b, a);
        } else {
            mesh.push_triangle(center, a, b);
        }
    }
}

const GRID_CENTER_COLOR: [f32; 3] = [0.5, 0.5, 0.5];
const GRID_LINE_COLOR: [f32; 3] = [0.75, 0.75, 0.75];

/// Line-list vertices for a square grid on the XZ plane, `slices` cells per
/// side of `spacing` units, centered on the origin. The two lines through
/// the origin are darker.
pub fn grid_lines(slices: u32, spacing: f32) -> Vec<GridVertex> {
    let half = (slices / 2) as i32;
    let extent = half as f32 * spacing;
    let mut lines = Vec::with_capacity(((2 * half + 1) * 4) as usize);
    for i in -half..=half {
        let color = if i == 0 {
            GRID_CENTER_COLOR
        } else {
            GRID_LINE_COLOR
        };
        let offset = i as f32 * spacing;
        for position in [
            [offset, 0.0, -extent],
            [offset, 0.0, extent],
            [-extent, 0.0, offset],
            [extent, 0.0, offset],
        ] {
            lines.push(GridVertex { position, color });
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_demo_primitives() -> [Primitive; 4] {
        [
            Primitive::Cube {
                size: [1.0, 1.0, 1.0],
            },
            Primitive::Sphere {
                radius: 0.5,
                rings: 10,
                slices: 20,
            },
            Primitive::Cylinder {
                radius: 0.5,
                height: 1.0,
                slices: 20,
            },
            Primitive::Cone {
                radius: 0.5,
                height: 1.0,
                slices: 20,
            },
        ]
    }

    fn bounds(mesh: &MeshData) -> (Vec3, Vec3) {
        mesh.vertices.iter().fold(
            (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
            |(lo, hi), v| {
                let p = Vec3::from(v.position);
                (lo.min(p), hi.max(p))
            },
        )
    }

    #[test]
    fn cube_has_four_vertices_per_face() {
        let mesh = all_demo_primitives()[0].mesh();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        let (lo, hi) = bounds(&mesh);
        assert!((lo - Vec3::splat(-0.5)).length() < 1e-6);
        assert!((hi - Vec3::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let mesh = all_demo_primitives()[1].mesh();
        assert_eq!(mesh.vertices.len(), 11 * 21);
        assert_eq!(mesh.triangle_count(), 10 * 20 * 2);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 0.5).abs() < 1e-5);
        }
    }

    #[test]
    fn cylinder_and_cone_stand_on_origin() {
        for primitive in &all_demo_primitives()[2..] {
            let (lo, hi) = bounds(&primitive.mesh());
            assert!(lo.y.abs() < 1e-6, "{}", primitive.name());
            assert!((hi.y - 1.0).abs() < 1e-6, "{}", primitive.name());
            assert!((hi.x - 0.5).abs() < 1e-5, "{}", primitive.name());
        }
    }

    #[test]
    fn indices_are_in_range() {
        for primitive in all_demo_primitives() {
            let mesh = primitive.mesh();
            assert_eq!(mesh.indices.len() % 3, 0);
            let n = mesh.vertices.len() as u32;
            assert!(mesh.indices.iter().all(|&i| i < n), "{}", primitive.name());
        }
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        for primitive in all_demo_primitives() {
            let mesh = primitive.mesh();
            for tri in mesh.indices.chunks(3) {
                let [a, b, c] = [tri[0], tri[1], tri[2]]
                    .map(|i| mesh.vertices[i as usize]);
                let (pa, pb, pc) = (
                    Vec3::from(a.position),
                    Vec3::from(b.position),
                    Vec3::from(c.position),
                );
                let face = (pb - pa).cross(pc - pa);
                if face.length() < 1e-7 {
                    continue; // degenerate pole triangle
                }
                let normal =
                    Vec3::from(a.normal) + Vec3::from(b.normal) + Vec3::from(c.normal);
                assert!(
                    face.dot(normal) > 0.0,
                    "{}: inward triangle {tri:?}",
                    primitive.name()
                );
            }
        }
    }

    #[test]
    fn normals_are_unit_length() {
        for primitive in all_demo_primitives() {
            for v in &primitive.mesh().vertices {
                let len = Vec3::from(v.normal).length();
                assert!((len - 1.0).abs() < 1e-5, "{}", primitive.name());
            }
        }
    }

    #[test]
    fn grid_has_slices_plus_one_lines_per_axis() {
        let grid = grid_lines(10, 1.0);
        assert_eq!(grid.len(), 11 * 4);
        let center: Vec<_> = grid
            .iter()
            .filter(|v| v.color == GRID_CENTER_COLOR)
            .collect();
        assert_eq!(center.len(), 4);
        assert!(grid.iter().all(|v| v.position[0].abs() <= 5.0));
        assert!(grid.iter().all(|v| v.position[1] == 0.0));
    }

    #[test]
    fn primitive_deserializes_from_tagged_toml() {
        let p: Primitive =
            toml::from_str("shape = \"cone\"\nradius = 0.5\nheight = 2.0\nslices = 8")
                .unwrap();
        assert_eq!(
            p,
            Primitive::Cone {
                radius: 0.5,
                height: 2.0,
                slices: 8
            }
        );
    }
}
