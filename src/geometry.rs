use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// GPU ready cube buffers: parallel attribute arrays plus triangle indices.
///
/// Positions and normals are three floats per vertex, texture coordinates
/// two; `indices` references the shared vertex index space.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MeshBuffers {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Number of distinct vertices in the attribute arrays.
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    /// Interleaves the attribute arrays as `position | normal | tex_coord`
    /// (eight floats per vertex) for upload into a single vertex buffer.
    pub fn interleaved(&self) -> Vec<f32> {
        let count = self.vertex_count();
        let mut data = Vec::with_capacity(count * 8);
        for i in 0..count {
            data.extend_from_slice(&self.positions[i * 3..i * 3 + 3]);
            data.extend_from_slice(&self.normals[i * 3..i * 3 + 3]);
            data.extend_from_slice(&self.tex_coords[i * 2..i * 2 + 2]);
        }
        data
    }
}

/// Flat quad buffers: positions plus triangle indices, no shading attributes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuadBuffers {
    pub positions: Vec<f32>,
    pub indices: Vec<u32>,
}

impl QuadBuffers {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }
}

struct Face {
    // Unit-cube corners in counter-clockwise order seen from outside.
    corners: [[f32; 3]; 4],
    normal: [f32; 3],
}

static FACES: [Face; 6] = [
    // front (+z)
    Face {
        corners: [
            [-0.5, -0.5, 0.5],
            [0.5, -0.5, 0.5],
            [0.5, 0.5, 0.5],
            [-0.5, 0.5, 0.5],
        ],
        normal: [0.0, 0.0, 1.0],
    },
    // back (-z)
    Face {
        corners: [
            [0.5, -0.5, -0.5],
            [-0.5, -0.5, -0.5],
            [-0.5, 0.5, -0.5],
            [0.5, 0.5, -0.5],
        ],
        normal: [0.0, 0.0, -1.0],
    },
    // left (-x)
    Face {
        corners: [
            [-0.5, -0.5, -0.5],
            [-0.5, -0.5, 0.5],
            [-0.5, 0.5, 0.5],
            [-0.5, 0.5, -0.5],
        ],
        normal: [-1.0, 0.0, 0.0],
    },
    // right (+x)
    Face {
        corners: [
            [0.5, -0.5, 0.5],
            [0.5, -0.5, -0.5],
            [0.5, 0.5, -0.5],
            [0.5, 0.5, 0.5],
        ],
        normal: [1.0, 0.0, 0.0],
    },
    // bottom (-y)
    Face {
        corners: [
            [-0.5, -0.5, -0.5],
            [0.5, -0.5, -0.5],
            [0.5, -0.5, 0.5],
            [-0.5, -0.5, 0.5],
        ],
        normal: [0.0, -1.0, 0.0],
    },
    // top (+y)
    Face {
        corners: [
            [-0.5, 0.5, 0.5],
            [0.5, 0.5, 0.5],
            [0.5, 0.5, -0.5],
            [-0.5, 0.5, -0.5],
        ],
        normal: [0.0, 1.0, 0.0],
    },
];

const FACE_TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];

/// Generates a unit cube scaled uniformly by `scale`.
///
/// Each of the six faces carries its own four vertices so the outward face
/// normal is constant across the face, and maps to the full unit square in
/// texture space: 24 vertices, 36 indices. Output is deterministic for a
/// given `scale`.
pub fn generate_cube(scale: f32) -> Result<MeshBuffers> {
    check_scale(scale)?;

    let mut mesh = MeshBuffers {
        positions: Vec::with_capacity(24 * 3),
        normals: Vec::with_capacity(24 * 3),
        tex_coords: Vec::with_capacity(24 * 2),
        indices: Vec::with_capacity(36),
    };

    for (face_index, face) in FACES.iter().enumerate() {
        for (corner, tex) in face.corners.iter().zip(FACE_TEX_COORDS.iter()) {
            mesh.positions
                .extend(corner.iter().map(|component| component * scale));
            mesh.normals.extend_from_slice(&face.normal);
            mesh.tex_coords.extend_from_slice(tex);
        }
        let base = (face_index * 4) as u32;
        mesh.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Ok(mesh)
}

/// Generates a unit quad in the xy-plane scaled uniformly by `scale`:
/// 4 vertices, 6 indices.
pub fn generate_square(scale: f32) -> Result<QuadBuffers> {
    check_scale(scale)?;

    let corners = [
        [-0.5, -0.5, 0.0],
        [0.5, -0.5, 0.0],
        [0.5, 0.5, 0.0],
        [-0.5, 0.5, 0.0],
    ];

    let mut positions = Vec::with_capacity(4 * 3);
    for corner in corners {
        positions.extend(corner.iter().map(|component| component * scale));
    }

    Ok(QuadBuffers {
        positions,
        indices: vec![0, 1, 2, 0, 2, 3],
    })
}

fn check_scale(scale: f32) -> Result<()> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(Error::invalid_argument(format!(
            "geometry scale must be finite and positive, got {scale}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_has_expected_buffer_sizes() {
        let mesh = generate_cube(1.0).unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.positions.len(), 24 * 3);
        assert_eq!(mesh.normals.len(), 24 * 3);
        assert_eq!(mesh.tex_coords.len(), 24 * 2);
        assert_eq!(mesh.indices.len(), 36);
        assert!(mesh.indices.iter().all(|&index| index < 24));
    }

    #[test]
    fn cube_positions_scale_linearly() {
        let unit = generate_cube(1.0).unwrap();
        let scaled = generate_cube(2.5).unwrap();
        let expected: Vec<f32> = unit.positions.iter().map(|p| p * 2.5).collect();
        assert_eq!(scaled.positions, expected);
        assert_eq!(scaled.normals, unit.normals);
        assert_eq!(scaled.tex_coords, unit.tex_coords);
        assert_eq!(scaled.indices, unit.indices);
    }

    #[test]
    fn cube_is_deterministic() {
        assert_eq!(generate_cube(3.0).unwrap(), generate_cube(3.0).unwrap());
    }

    #[test]
    fn cube_normals_are_constant_per_face_and_axis_aligned() {
        let mesh = generate_cube(1.0).unwrap();
        for face in 0..6 {
            let first = &mesh.normals[face * 12..face * 12 + 3];
            for corner in 0..4 {
                let offset = face * 12 + corner * 3;
                assert_eq!(&mesh.normals[offset..offset + 3], first);
            }
            let length: f32 = first.iter().map(|n| n * n).sum();
            assert!((length - 1.0).abs() < f32::EPSILON);
            assert_eq!(first.iter().filter(|n| **n != 0.0).count(), 1);
        }
    }

    #[test]
    fn cube_tex_coords_cover_unit_square() {
        let mesh = generate_cube(4.0).unwrap();
        assert!(mesh.tex_coords.iter().all(|&t| (0.0..=1.0).contains(&t)));
        for face in 0..6 {
            let face_coords = &mesh.tex_coords[face * 8..face * 8 + 8];
            assert!(face_coords.contains(&0.0));
            assert!(face_coords.contains(&1.0));
        }
    }

    #[test]
    fn interleaved_layout_is_eight_floats_per_vertex() {
        let mesh = generate_cube(1.0).unwrap();
        let data = mesh.interleaved();
        assert_eq!(data.len(), 24 * 8);
        // First vertex: position, normal, tex coord in order.
        assert_eq!(&data[0..3], &mesh.positions[0..3]);
        assert_eq!(&data[3..6], &mesh.normals[0..3]);
        assert_eq!(&data[6..8], &mesh.tex_coords[0..2]);
    }

    #[test]
    fn square_has_expected_buffer_sizes() {
        let quad = generate_square(2.0).unwrap();
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.positions.len(), 12);
        assert_eq!(quad.indices.len(), 6);
        assert!(quad.indices.iter().all(|&index| index < 4));
    }

    #[test]
    fn degenerate_scales_are_rejected() {
        for scale in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                generate_cube(scale),
                Err(Error::InvalidArgument { .. })
            ));
            assert!(matches!(
                generate_square(scale),
                Err(Error::InvalidArgument { .. })
            ));
        }
    }
}
