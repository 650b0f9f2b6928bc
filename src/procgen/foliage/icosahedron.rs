//! Unit icosahedron and midpoint subdivision

use std::collections::HashMap;

use glam::Vec3;

/// Golden ratio
const T: f32 = 1.618_034;

const RAW_VERTICES: [[f32; 3]; 12] = [
    [-1.0, T, 0.0],
    [1.0, T, 0.0],
    [-1.0, -T, 0.0],
    [1.0, -T, 0.0],
    [0.0, -1.0, T],
    [0.0, 1.0, T],
    [0.0, -1.0, -T],
    [0.0, 1.0, -T],
    [T, 0.0, -1.0],
    [T, 0.0, 1.0],
    [-T, 0.0, -1.0],
    [-T, 0.0, 1.0],
];

/// Faces wound outward
pub const FACES: [[u32; 3]; 20] = [
    // around vertex 0
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    // adjacent
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    // around vertex 3
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    // adjacent
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// The 12 vertices on the unit sphere
pub fn unit_vertices() -> Vec<Vec3> {
    RAW_VERTICES
        .iter()
        .map(|v| Vec3::from_array(*v).normalize())
        .collect()
}

/// Split every triangle into four, projecting new vertices onto the unit sphere
///
/// Midpoints are keyed by their (sorted) edge so shared edges reuse one vertex.
pub fn subdivide(vertices: &mut Vec<Vec3>, faces: &[[u32; 3]]) -> Vec<[u32; 3]> {
    let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
    let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<Vec3>| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *midpoints.entry(key).or_insert_with(|| {
            let m = ((vertices[a as usize] + vertices[b as usize]) * 0.5).normalize();
            vertices.push(m);
            (vertices.len() - 1) as u32
        })
    };

    let mut out = Vec::with_capacity(faces.len() * 4);
    for &[a, b, c] in faces {
        let ab = midpoint(a, b, vertices);
        let bc = midpoint(b, c, vertices);
        let ca = midpoint(c, a, vertices);
        out.push([a, ab, ca]);
        out.push([b, bc, ab]);
        out.push([c, ca, bc]);
        out.push([ab, bc, ca]);
    }
    out
}

/// For each vertex, the indices of the vertices it shares an edge with
pub fn neighbors(vertex_count: usize, faces: &[[u32; 3]]) -> Vec<Vec<u32>> {
    let mut out = vec![Vec::new(); vertex_count];
    for &[a, b, c] in faces {
        for (from, to) in [(a, b), (b, c), (c, a), (b, a), (c, b), (a, c)] {
            let list: &mut Vec<u32> = &mut out[from as usize];
            if !list.contains(&to) {
                list.push(to);
            }
        }
    }
    out
}
