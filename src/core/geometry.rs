//! Segmented plane and box meshes for the strip drawables.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }
}

// Axis indices into a position array
const X: usize = 0;
const Y: usize = 1;
const Z: usize = 2;

/// Append one grid face lying in the `(u, v)` axes, offset by `depth / 2` along `w`.
#[allow(clippy::too_many_arguments)]
fn push_face(
    mesh: &mut Mesh,
    (u, v, w): (usize, usize, usize),
    u_dir: f32,
    v_dir: f32,
    width: f32,
    height: f32,
    depth: f32,
    segs_u: u32,
    segs_v: u32,
) {
    let base = mesh.vertices.len() as u32;
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    let seg_w = width / segs_u as f32;
    let seg_h = height / segs_v as f32;

    for iy in 0..=segs_v {
        let y = iy as f32 * seg_h - half_h;
        for ix in 0..=segs_u {
            let x = ix as f32 * seg_w - half_w;
            let mut p = [0.0_f32; 3];
            p[u] = x * u_dir;
            p[v] = y * v_dir;
            p[w] = depth / 2.0;
            mesh.vertices.push(Vertex {
                position: p,
                uv: [ix as f32 / segs_u as f32, 1.0 - iy as f32 / segs_v as f32],
            });
        }
    }

    let row = segs_u + 1;
    for iy in 0..segs_v {
        for ix in 0..segs_u {
            let a = base + ix + row * iy;
            let b = base + ix + row * (iy + 1);
            let c = base + (ix + 1) + row * (iy + 1);
            let d = base + (ix + 1) + row * iy;
            mesh.indices.extend_from_slice(&[a, b, d, b, c, d]);
        }
    }
}

/// XY plane centred on the origin facing +Z.
pub fn plane_mesh(width: f32, height: f32, segs_w: u32, segs_h: u32) -> Mesh {
    let segs_w = segs_w.max(1);
    let segs_h = segs_h.max(1);
    let mut mesh = Mesh::default();
    // v runs top to bottom so flip Y
    push_face(&mut mesh, (X, Y, Z), 1.0, -1.0, width, height, 0.0, segs_w, segs_h);
    mesh
}

/// Axis-aligned box centred on the origin.
pub fn box_mesh(
    width: f32,
    height: f32,
    depth: f32,
    segs_w: u32,
    segs_h: u32,
    segs_d: u32,
) -> Mesh {
    let (sw, sh, sd) = (segs_w.max(1), segs_h.max(1), segs_d.max(1));
    let mut mesh = Mesh::default();
    // +x / -x
    push_face(&mut mesh, (Z, Y, X), -1.0, -1.0, depth, height, width, sd, sh);
    push_face(&mut mesh, (Z, Y, X), 1.0, -1.0, depth, height, -width, sd, sh);
    // +y / -y
    push_face(&mut mesh, (X, Z, Y), 1.0, 1.0, width, depth, height, sw, sd);
    push_face(&mut mesh, (X, Z, Y), 1.0, -1.0, width, depth, -height, sw, sd);
    // +z / -z
    push_face(&mut mesh, (X, Y, Z), 1.0, -1.0, width, height, depth, sw, sh);
    push_face(&mut mesh, (X, Y, Z), -1.0, -1.0, width, height, -depth, sw, sh);
    mesh
}
