//! Append-only geometry arena
//!
//! A `GeometryBuffer` accumulates vertex positions, vertex colors and triangle
//! indices for one logical mesh. The trunk generator owns one and lends it
//! (`&mut`) to every branch it spawns, so all wood geometry of a tree lands in
//! a single index space. Vertices are only ever appended; an index handed out
//! by `add_vertex` stays valid for the lifetime of the buffer.
//!
//! Winding convention: triangle `(a, b, c)` faces the side that
//! `(b - a) × (c - a)` points to. Rings are laid out counter-clockwise when
//! seen from below their local up axis, which makes `connect_rings` and
//! `add_cap` emit outward-facing triangles.

use glam::{Quat, Vec3};

use crate::core::{Error, Result};
use crate::mesh::color::Color;
use crate::mesh::data::{CommitOptions, MeshData};
use crate::scene::MeshSink;

/// Which way a fan-triangulated ring faces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiscFacing {
    /// Against the ring's local up axis (bottom of a trunk)
    Down,
    /// Along the ring's local up axis (top of a stump)
    Up,
}

/// Growable vertex/color/index lists for one mesh
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeometryBuffer {
    positions: Vec<Vec3>,
    colors: Vec<Color>,
    indices: Vec<u32>,
}

impl GeometryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// Triangle list, three indices per triangle
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Position of an existing vertex
    pub fn position(&self, index: u32) -> Result<Vec3> {
        self.positions
            .get(index as usize)
            .copied()
            .ok_or(Error::InvalidIndex {
                index,
                vertex_count: self.positions.len(),
            })
    }

    /// Append a vertex and return its index
    pub fn add_vertex(&mut self, position: Vec3, color: Color) -> u32 {
        self.positions.push(position);
        self.colors.push(color);
        (self.positions.len() - 1) as u32
    }

    /// Move an existing vertex by `offset`
    ///
    /// The index space is untouched; only the stored position changes.
    pub fn displace_vertex(&mut self, index: u32, offset: Vec3) -> Result<()> {
        let vertex_count = self.positions.len();
        let position = self
            .positions
            .get_mut(index as usize)
            .ok_or(Error::InvalidIndex { index, vertex_count })?;
        *position += offset;
        Ok(())
    }

    fn check_index(&self, index: u32) -> Result<()> {
        if (index as usize) < self.positions.len() {
            Ok(())
        } else {
            Err(Error::InvalidIndex {
                index,
                vertex_count: self.positions.len(),
            })
        }
    }

    /// Append triangle (a, b, c)
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) -> Result<()> {
        for index in [a, b, c] {
            self.check_index(index)?;
        }
        self.indices.extend_from_slice(&[a, b, c]);
        Ok(())
    }

    /// Append the quad (a, b, c, d) as triangles (a, b, c) and (c, d, a)
    pub fn add_rectangle(&mut self, a: u32, b: u32, c: u32, d: u32) -> Result<()> {
        for index in [a, b, c, d] {
            self.check_index(index)?;
        }
        self.indices.extend_from_slice(&[a, b, c, c, d, a]);
        Ok(())
    }

    /// Append `num_sides` vertices on a circle around `orientation * Y`
    ///
    /// Vertex `i` sits at angle `2π·i/num_sides`, measured from the local X
    /// axis towards local Z. Returns the index of the first ring vertex.
    pub fn add_ring(
        &mut self,
        num_sides: u32,
        center: Vec3,
        radius: f32,
        orientation: Quat,
        color: Color,
    ) -> u32 {
        let start = self.positions.len() as u32;
        let step = std::f32::consts::TAU / num_sides.max(1) as f32;
        for i in 0..num_sides {
            let angle = step * i as f32;
            let offset = Vec3::new(angle.cos(), 0.0, angle.sin()) * radius;
            self.add_vertex(center + orientation * offset, color);
        }
        start
    }

    /// Index of the first of the last `count` vertices
    pub fn tail_start(&self, count: usize, operation: &'static str) -> Result<u32> {
        let available = self.positions.len();
        if available < count {
            return Err(Error::PreconditionViolation {
                operation,
                required: count,
                available,
            });
        }
        Ok((available - count) as u32)
    }

    /// Stitch the two most recently added rings into a tube section
    ///
    /// Emits `num_sides` rectangles (`2 * num_sides` triangles), wrapping the
    /// last side back to the first vertex.
    pub fn connect_rings(&mut self, num_sides: u32) -> Result<()> {
        let start = self.tail_start(2 * num_sides as usize, "connect_rings")?;
        for i in 0..num_sides {
            let cur = start + i;
            let next = if i + 1 < num_sides { cur + 1 } else { start };
            self.add_rectangle(cur + num_sides, next + num_sides, next, cur)?;
        }
        Ok(())
    }

    /// Close the most recent ring with a single apex vertex
    ///
    /// Adds exactly one vertex and `num_sides` triangles. Returns the apex index.
    pub fn add_cap(&mut self, num_sides: u32, apex: Vec3, color: Color) -> Result<u32> {
        let start = self.tail_start(num_sides as usize, "add_cap")?;
        let apex_index = self.add_vertex(apex, color);
        for i in 0..num_sides {
            let cur = start + i;
            let next = if i + 1 < num_sides { cur + 1 } else { start };
            self.add_triangle(cur, apex_index, next)?;
        }
        Ok(apex_index)
    }

    /// Fan-triangulate the most recent ring into a flat disc
    ///
    /// Emits `num_sides - 2` triangles and no vertices.
    pub fn add_disc(&mut self, num_sides: u32, facing: DiscFacing) -> Result<()> {
        let first = self.tail_start(num_sides as usize, "add_disc")?;
        for i in 0..num_sides.saturating_sub(2) {
            let (b, c) = (first + i + 1, first + i + 2);
            match facing {
                DiscFacing::Down => self.add_triangle(first, b, c)?,
                DiscFacing::Up => self.add_triangle(c, b, first)?,
            }
        }
        Ok(())
    }

    /// Build the committed representation without touching the buffer
    pub fn to_mesh_data(&self, options: &CommitOptions) -> MeshData {
        MeshData::from_geometry(&self.positions, &self.colors, &self.indices, options)
    }

    /// Write the accumulated geometry into `sink`
    ///
    /// This is the only place a sink's mesh is replaced. The buffer is
    /// borrowed immutably, so committing twice yields identical meshes.
    pub fn commit<S: MeshSink + ?Sized>(&self, sink: &mut S, options: &CommitOptions) {
        log::trace!(
            "Committing {} vertices, {} triangles",
            self.vertex_count(),
            self.triangle_count()
        );
        sink.commit(self.to_mesh_data(options));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::triangle_normal;
    use crate::mesh::color::palette;
    use crate::scene::MeshNode;

    fn ring_buffer(num_sides: u32, rings: u32) -> GeometryBuffer {
        let mut buffer = GeometryBuffer::new();
        for r in 0..rings {
            buffer.add_ring(
                num_sides,
                Vec3::Y * r as f32,
                1.0,
                Quat::IDENTITY,
                palette::BARK_BROWN,
            );
        }
        buffer
    }

    fn triangle(buffer: &GeometryBuffer, t: usize) -> (Vec3, Vec3, Vec3) {
        let i = &buffer.indices()[t * 3..t * 3 + 3];
        let p = buffer.positions();
        (p[i[0] as usize], p[i[1] as usize], p[i[2] as usize])
    }

    #[test]
    fn test_add_vertex_indices_are_monotonic() {
        let mut buffer = GeometryBuffer::new();
        for expected in 0..5u32 {
            let index = buffer.add_vertex(Vec3::splat(expected as f32), palette::GREEN);
            assert_eq!(index, expected);
        }
        assert_eq!(buffer.colors().len(), buffer.positions().len());
    }

    #[test]
    fn test_add_triangle_rejects_out_of_range() {
        let mut buffer = GeometryBuffer::new();
        buffer.add_vertex(Vec3::ZERO, palette::GREEN);
        buffer.add_vertex(Vec3::X, palette::GREEN);
        let err = buffer.add_triangle(0, 1, 2).unwrap_err();
        assert!(matches!(err, Error::InvalidIndex { index: 2, vertex_count: 2 }));
        assert_eq!(buffer.triangle_count(), 0);
    }

    #[test]
    fn test_add_rectangle_split() {
        let mut buffer = GeometryBuffer::new();
        for _ in 0..4 {
            buffer.add_vertex(Vec3::ZERO, palette::GREEN);
        }
        buffer.add_rectangle(0, 1, 2, 3).unwrap();
        assert_eq!(buffer.indices(), &[0, 1, 2, 2, 3, 0]);
    }

    #[test]
    fn test_add_ring_layout() {
        let mut buffer = GeometryBuffer::new();
        let center = Vec3::new(0.0, 2.0, 0.0);
        let start = buffer.add_ring(8, center, 3.0, Quat::IDENTITY, palette::GREEN);
        assert_eq!(start, 0);
        assert_eq!(buffer.vertex_count(), 8);

        let mut last_angle = -1.0;
        for p in buffer.positions() {
            let local = *p - center;
            assert!((local.length() - 3.0).abs() < 1e-5);
            assert!(local.y.abs() < 1e-6);
            let angle = local.z.atan2(local.x).rem_euclid(std::f32::consts::TAU);
            assert!(angle > last_angle, "ring vertices must increase in angle");
            last_angle = angle;
        }
    }

    #[test]
    fn test_add_ring_respects_orientation() {
        let mut buffer = GeometryBuffer::new();
        let tilt = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        buffer.add_ring(4, Vec3::ZERO, 1.0, tilt, palette::GREEN);
        let up = tilt * Vec3::Y;
        for p in buffer.positions() {
            assert!(p.dot(up).abs() < 1e-5);
        }
    }

    #[test]
    fn test_connect_rings_counts_for_all_sides() {
        for num_sides in 3..=16u32 {
            let mut buffer = ring_buffer(num_sides, 1);
            buffer.add_ring(num_sides, Vec3::Y, 0.8, Quat::IDENTITY, palette::GREEN);
            buffer.connect_rings(num_sides).unwrap();
            assert_eq!(buffer.triangle_count(), 2 * num_sides as usize);
            let count = buffer.vertex_count() as u32;
            assert!(buffer.indices().iter().all(|&i| i < count));
        }
    }

    #[test]
    fn test_connect_rings_faces_outward() {
        let mut buffer = ring_buffer(6, 2);
        buffer.connect_rings(6).unwrap();
        for t in 0..buffer.triangle_count() {
            let (a, b, c) = triangle(&buffer, t);
            let center = (a + b + c) / 3.0;
            let outward = Vec3::new(center.x, 0.0, center.z);
            assert!(triangle_normal(a, b, c).dot(outward) > 0.0);
        }
    }

    #[test]
    fn test_connect_rings_precondition() {
        let mut buffer = ring_buffer(5, 1);
        let err = buffer.connect_rings(5).unwrap_err();
        assert!(matches!(
            err,
            Error::PreconditionViolation { operation: "connect_rings", required: 10, available: 5 }
        ));
    }

    #[test]
    fn test_add_cap_adds_one_vertex() {
        for num_sides in 3..=12u32 {
            let mut buffer = ring_buffer(num_sides, 1);
            let before = buffer.vertex_count();
            let apex = buffer.add_cap(num_sides, Vec3::Y, palette::BARK_BROWN).unwrap();
            assert_eq!(apex as usize, before);
            assert_eq!(buffer.vertex_count(), before + 1);
            assert_eq!(buffer.triangle_count(), num_sides as usize);
            for t in 0..buffer.triangle_count() {
                let (a, b, c) = triangle(&buffer, t);
                assert!(triangle_normal(a, b, c).y > 0.0, "cap should face up");
            }
        }
    }

    #[test]
    fn test_add_cap_precondition() {
        let mut buffer = GeometryBuffer::new();
        buffer.add_vertex(Vec3::ZERO, palette::GREEN);
        assert!(matches!(
            buffer.add_cap(4, Vec3::Y, palette::GREEN),
            Err(Error::PreconditionViolation { operation: "add_cap", .. })
        ));
    }

    #[test]
    fn test_add_disc_facing() {
        let mut down = ring_buffer(8, 1);
        down.add_disc(8, DiscFacing::Down).unwrap();
        assert_eq!(down.triangle_count(), 6);
        for t in 0..down.triangle_count() {
            let (a, b, c) = triangle(&down, t);
            assert!(triangle_normal(a, b, c).y < 0.0);
        }

        let mut up = ring_buffer(8, 1);
        up.add_disc(8, DiscFacing::Up).unwrap();
        for t in 0..up.triangle_count() {
            let (a, b, c) = triangle(&up, t);
            assert!(triangle_normal(a, b, c).y > 0.0);
        }
    }

    #[test]
    fn test_displace_vertex() {
        let mut buffer = ring_buffer(4, 1);
        buffer.displace_vertex(2, Vec3::Y).unwrap();
        assert!((buffer.position(2).unwrap().y - 1.0).abs() < 1e-6);
        assert!(buffer.displace_vertex(9, Vec3::Y).is_err());
    }

    #[test]
    fn test_commit_is_idempotent() {
        let mut buffer = ring_buffer(6, 2);
        buffer.connect_rings(6).unwrap();
        buffer.add_cap(6, Vec3::Y * 2.0, palette::BARK_BROWN).unwrap();

        let options = CommitOptions::default();
        let mut first = MeshNode::new("first");
        let mut second = MeshNode::new("second");
        buffer.commit(&mut first, &options);
        buffer.commit(&mut second, &options);

        let a = first.mesh.as_ref().unwrap();
        let b = second.mesh.as_ref().unwrap();
        assert_eq!(a.positions, b.positions);
        assert_eq!(a.indices, b.indices);
        assert_eq!(a.colors, b.colors);
        assert_eq!(buffer.vertex_count(), a.vertex_count());
    }
}
