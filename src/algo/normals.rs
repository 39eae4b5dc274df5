//! Vertex normal computation.
//!
//! Per-vertex normals are the normalized sum of adjacent face normals,
//! weighted per [`NormalWeight`]. Degenerate and unused faces contribute
//! nothing, and every vertex referenced by at least one non-degenerate face
//! is guaranteed a finite, unit-length result — a vertex whose contributions
//! cancel falls back to the normal of its first contributing face rather
//! than emitting zero or NaN.
//!
//! # Example
//! ```
//! use meshprep::algo::{compute_normals, NormalOptions};
//! use nalgebra::{Point3, Vector3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let indices: Vec<u32> = vec![0, 1, 2];
//!
//! let normals = compute_normals(&indices, &positions, &NormalOptions::default()).unwrap();
//! assert!((normals[0] - Vector3::new(0.0, 0.0, 1.0)).norm() < 1e-6);
//! ```

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

use crate::error::Result;
use crate::mesh::{
    check_index_buffer, check_indices_in_range, face, is_degenerate_face, used_faces, MeshIndex,
};

/// How each face's normal is weighted into its corner vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalWeight {
    /// Weight by the angle the face subtends at the vertex. The usual
    /// choice: insensitive to tessellation density.
    #[default]
    ByAngle,

    /// Weight by face area.
    ByArea,

    /// Weight every face equally.
    Equal,
}

/// Options for [`compute_normals`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalOptions {
    /// Weighting scheme.
    pub weight: NormalWeight,

    /// Treat faces as clockwise-wound (flips every normal).
    pub clockwise: bool,

    /// Normalize the per-vertex results in parallel.
    pub parallel: bool,
}

impl NormalOptions {
    /// Use the given weighting scheme.
    pub fn with_weight(mut self, weight: NormalWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Interpret faces as clockwise-wound.
    pub fn clockwise(mut self) -> Self {
        self.clockwise = true;
        self
    }

    /// Enable parallel normalization.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// The angle at corner `apex` between the edges to the other two corners,
/// clamped into a safe acos domain.
fn corner_angle(apex: Point3<f32>, a: Point3<f32>, b: Point3<f32>) -> f32 {
    let u = a - apex;
    let v = b - apex;
    let denom = u.norm() * v.norm();
    if denom <= f32::EPSILON {
        return 0.0;
    }
    (u.dot(&v) / denom).clamp(-1.0, 1.0).acos()
}

/// Compute per-vertex normals from positions and an index buffer.
///
/// Unreferenced vertices (and vertices touched only by degenerate faces)
/// receive the zero vector; every other vertex gets a finite unit normal.
pub fn compute_normals<I: MeshIndex>(
    indices: &[I],
    positions: &[Point3<f32>],
    options: &NormalOptions,
) -> Result<Vec<Vector3<f32>>> {
    check_index_buffer::<I>(indices, positions.len())?;
    check_indices_in_range(indices, positions.len())?;

    let vertex_count = positions.len();
    let mut accum = vec![Vector3::zeros(); vertex_count];
    let mut first_face_normal: Vec<Option<Vector3<f32>>> = vec![None; vertex_count];
    let flip = if options.clockwise { -1.0 } else { 1.0 };

    for (_, tri) in used_faces(indices) {
        if is_degenerate_face(tri) {
            continue;
        }
        let v = [tri[0].to_usize(), tri[1].to_usize(), tri[2].to_usize()];
        let p = [positions[v[0]], positions[v[1]], positions[v[2]]];

        // Unnormalized cross product; its magnitude is twice the face area.
        let cross = (p[1] - p[0]).cross(&(p[2] - p[0])) * flip;
        let area2 = cross.norm();
        if !area2.is_finite() || area2 <= f32::MIN_POSITIVE {
            // Geometrically degenerate (collinear or coincident positions).
            continue;
        }
        let unit = cross / area2;

        for c in 0..3 {
            let weight = match options.weight {
                NormalWeight::ByAngle => {
                    corner_angle(p[c], p[(c + 1) % 3], p[(c + 2) % 3])
                }
                NormalWeight::ByArea => area2,
                NormalWeight::Equal => 1.0,
            };
            accum[v[c]] += unit * weight;
            if first_face_normal[v[c]].is_none() {
                first_face_normal[v[c]] = Some(unit);
            }
        }
    }

    let finalize = |(sum, first): (&Vector3<f32>, &Option<Vector3<f32>>)| -> Vector3<f32> {
        let Some(fallback) = first else {
            // Never touched by a non-degenerate face.
            return Vector3::zeros();
        };
        let len_sq = sum.norm_squared();
        if len_sq.is_finite() && len_sq > 1e-12 {
            sum / len_sq.sqrt()
        } else {
            // Contributions cancelled; fall back to the first face normal so
            // the result stays finite and unit-length.
            *fallback
        }
    };

    let normals = if options.parallel {
        accum
            .par_iter()
            .zip(first_face_normal.par_iter())
            .map(finalize)
            .collect()
    } else {
        accum
            .iter()
            .zip(first_face_normal.iter())
            .map(finalize)
            .collect()
    };

    Ok(normals)
}
