//! Vertex reordering for locality of reference.
//!
//! After faces are reordered, [`optimize_vertices`] assigns new vertex
//! indices in first-use order of the (already optimized) index buffer, so
//! vertex fetches walk the vertex buffer roughly sequentially.

use crate::error::Result;
use crate::mesh::{check_index_buffer, check_indices_in_range, used_faces, MeshIndex};

/// Compute a vertex remap in first-use order.
///
/// The result reads `remap[new_slot] = original_vertex`; vertices referenced
/// by no used face occupy the tail as unused-sentinel slots. The remap is a
/// bijection over the referenced vertices and is consumed by
/// [`finalize_ib`](super::finalize_ib) and
/// [`finalize_vb`](super::finalize_vb).
///
/// # Example
/// ```
/// use meshprep::algo::optimize::optimize_vertices;
///
/// let indices: Vec<u32> = vec![2, 0, 3, 3, 0, 1];
/// let remap = optimize_vertices(&indices, 5).unwrap();
/// // First use order: 2, 0, 3, 1; vertex 4 is unreferenced.
/// assert_eq!(remap, vec![2, 0, 3, 1, u32::MAX]);
/// ```
pub fn optimize_vertices<I: MeshIndex>(indices: &[I], vertex_count: usize) -> Result<Vec<I>> {
    check_index_buffer::<I>(indices, vertex_count)?;
    check_indices_in_range(indices, vertex_count)?;

    let mut remap = Vec::with_capacity(vertex_count);
    let mut assigned = vec![false; vertex_count];
    for (_, tri) in used_faces(indices) {
        for idx in tri {
            let v = idx.to_usize();
            if !assigned[v] {
                assigned[v] = true;
                remap.push(idx);
            }
        }
    }
    remap.resize(vertex_count, I::UNUSED);
    Ok(remap)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_use_order() {
        let indices: Vec<u32> = vec![4, 2, 0, 0, 2, 1];
        let remap = optimize_vertices(&indices, 5).unwrap();
        assert_eq!(remap, vec![4, 2, 0, 1, u32::MAX]);
    }

    #[test]
    fn test_identity_when_already_ordered() {
        let indices: Vec<u32> = vec![0, 1, 2, 1, 3, 2];
        let remap = optimize_vertices(&indices, 4).unwrap();
        assert_eq!(remap, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_unused_faces_do_not_assign() {
        let indices: Vec<u32> = vec![u32::MAX, u32::MAX, u32::MAX, 1, 0, 2];
        let remap = optimize_vertices(&indices, 3).unwrap();
        assert_eq!(remap, vec![1, 0, 2]);
    }
}
