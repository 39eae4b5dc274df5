//! Vertex welding.
//!
//! The inverse of the cleaning passes: [`weld_vertices`] rewrites every
//! index onto its point representative, so positionally-coincident copies
//! collapse onto one vertex. Combined with
//! [`optimize_vertices`](super::optimize::optimize_vertices) and
//! [`finalize_ib`](super::optimize::finalize_ib) /
//! [`finalize_vb`](super::optimize::finalize_vb), this compacts the
//! now-unreferenced duplicates out of the mesh entirely.

use crate::error::{MeshError, Result};
use crate::mesh::{check_index_buffer, check_indices_in_range, face, is_unused_face, MeshIndex};

/// Rewrite every index of every used face onto its point representative.
///
/// Returns the number of indices changed. Sentinel entries in `point_reps`
/// stand for "itself"; unused faces pass through untouched.
///
/// # Example
/// ```
/// use meshprep::algo::weld_vertices;
/// use meshprep::topology::generate_point_reps;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0), // copy of vertex 1
/// ];
/// let mut indices: Vec<u32> = vec![0, 1, 2, 2, 3, 0];
///
/// let reps = generate_point_reps(&indices, &positions, 0.0).unwrap();
/// let changed = weld_vertices(&mut indices, &reps).unwrap();
/// assert_eq!(changed, 1);
/// assert_eq!(indices, vec![0, 1, 2, 2, 1, 0]);
/// ```
pub fn weld_vertices<I: MeshIndex>(indices: &mut [I], point_reps: &[I]) -> Result<usize> {
    let vertex_count = point_reps.len();
    check_index_buffer::<I>(indices, vertex_count)?;
    check_indices_in_range(indices, vertex_count)?;
    for &r in point_reps {
        if let Some(rep) = r.as_used() {
            if rep >= vertex_count {
                return Err(MeshError::invalid_param(
                    "point_reps",
                    rep,
                    "representative exceeds the vertex count",
                ));
            }
        }
    }

    let mut changed = 0usize;
    let face_count = indices.len() / 3;
    for f in 0..face_count {
        let tri = face(indices, f);
        if is_unused_face(tri) {
            continue;
        }
        for c in 0..3 {
            let v = tri[c].to_usize();
            if let Some(rep) = point_reps[v].as_used() {
                if rep != v {
                    indices[3 * f + c] = I::from_usize(rep);
                    changed += 1;
                }
            }
        }
    }
    Ok(changed)
}
