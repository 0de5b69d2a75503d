//! Flat ocean grid and its CPU-side displacement.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use noise::NoiseFn;

use super::wave::WaveField;
use crate::params::{OceanMesh, WaveParameters};

/// Vertex data for the ocean mesh (flat position, y filled by displacement)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
}

impl Vertex {
    /// Mesh-local (x, z), the domain of the wave field
    pub fn surface_point(&self) -> Vec2 {
        Vec2::new(self.position[0], self.position[2])
    }
}

/// Uniform tessellated plane centred on the origin in the XZ plane
///
/// Built once at startup; window resizes never touch it.
pub struct OceanGrid {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl OceanGrid {
    /// Create a flat grid with the given layout
    pub fn new(mesh: &OceanMesh) -> Self {
        let subdivisions = mesh.subdivisions;
        let spacing = mesh.spacing();
        let half_size = mesh.size / 2.0;
        let row = subdivisions + 1;

        let mut vertices = Vec::with_capacity(row * row);
        let mut indices = Vec::with_capacity(subdivisions * subdivisions * 6);

        for z in 0..=subdivisions {
            for x in 0..=subdivisions {
                vertices.push(Vertex {
                    position: [
                        x as f32 * spacing - half_size,
                        0.0,
                        z as f32 * spacing - half_size,
                    ],
                });
            }
        }

        // Counter-clockwise seen from +y
        for z in 0..subdivisions {
            for x in 0..subdivisions {
                let top_left = (z * row + x) as u32;
                let top_right = top_left + 1;
                let bottom_left = ((z + 1) * row + x) as u32;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[
                    top_left,
                    bottom_left,
                    top_right,
                    top_right,
                    bottom_left,
                    bottom_right,
                ]);
            }
        }

        Self { vertices, indices }
    }

    /// Set every vertex height to the wave elevation at `time_s`
    ///
    /// CPU counterpart of the vertex stage in `water.wgsl`.
    pub fn displace<N: NoiseFn<f64, 2>>(
        &mut self,
        field: &WaveField<N>,
        time_s: f32,
        params: &WaveParameters,
    ) {
        for vertex in &mut self.vertices {
            vertex.position[1] = field.elevation(vertex.surface_point(), time_s, params);
        }
    }

    /// Current per-vertex elevations, row-major in z then x
    pub fn elevations(&self) -> impl Iterator<Item = f32> + '_ {
        self.vertices.iter().map(|v| v.position[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise::GradientNoise;
    use crate::ocean::elevation;

    fn small_mesh() -> OceanMesh {
        OceanMesh {
            size: 20.0,
            subdivisions: 16,
        }
    }

    #[test]
    fn test_ocean_grid_creation() {
        let mesh = small_mesh();
        let grid = OceanGrid::new(&mesh);

        // Check vertex count: (subdivisions + 1)^2
        assert_eq!(grid.vertices.len(), (mesh.subdivisions + 1).pow(2));

        // Check triangle count: subdivisions^2 * 2 triangles * 3 indices
        assert_eq!(grid.indices.len(), mesh.subdivisions.pow(2) * 6);
    }

    #[test]
    fn test_grid_spans_plane() {
        let grid = OceanGrid::new(&small_mesh());
        let first = grid.vertices[0].position;
        let last = grid.vertices[grid.vertices.len() - 1].position;
        assert_eq!(first, [-10.0, 0.0, -10.0]);
        assert!((last[0] - 10.0).abs() < 1e-5);
        assert!((last[2] - 10.0).abs() < 1e-5);
        assert!(grid.elevations().all(|e| e == 0.0));
    }

    #[test]
    fn test_default_grid_resolution() {
        let mesh = OceanMesh::default();
        assert_eq!(mesh.subdivisions, 1024);
        assert!((mesh.spacing() - 20.0 / 1024.0).abs() < 1e-7);
    }

    #[test]
    fn test_triangles_face_up() {
        let grid = OceanGrid::new(&small_mesh());
        for tri in grid.indices.chunks(3).take(64) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| {
                glam::Vec3::from_array(grid.vertices[i as usize].position)
            });
            let normal = (b - a).cross(c - a);
            assert!(normal.y > 0.0);
        }
    }

    #[test]
    fn test_displace_matches_kernel() {
        let mut grid = OceanGrid::new(&small_mesh());
        let params = WaveParameters::default();
        grid.displace(&WaveField::new(GradientNoise), 2.5, &params);

        for vertex in grid.vertices.iter().step_by(7) {
            let expected = elevation(vertex.surface_point(), 2.5, &params);
            assert_eq!(vertex.position[1], expected);
        }
    }

    #[test]
    fn test_displace_keeps_xz() {
        let mut grid = OceanGrid::new(&small_mesh());
        let before: Vec<Vec2> = grid.vertices.iter().map(Vertex::surface_point).collect();
        grid.displace(&WaveField::<GradientNoise>::default(), 1.0, &WaveParameters::default());
        let after: Vec<Vec2> = grid.vertices.iter().map(Vertex::surface_point).collect();
        assert_eq!(before, after);
    }
}
