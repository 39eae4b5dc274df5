//! Mesh concatenation bookkeeping.
//!
//! When several separately-processed meshes are merged into one vertex and
//! index buffer, each mesh's faces and vertices land at a contiguous offset
//! after everything merged before it. [`concatenate_mesh`] computes those
//! destination offsets and advances the running totals; it is pure
//! bookkeeping and touches no geometry.

use crate::error::{MeshError, Result};

/// Running totals across a sequence of [`concatenate_mesh`] calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConcatTotals {
    /// Faces merged so far.
    pub faces: u32,
    /// Vertices merged so far.
    pub vertices: u32,
}

/// Assign destination offsets for the next mesh being merged.
///
/// `face_dest[i]` receives the merged-buffer face index of this mesh's face
/// `i`, and likewise `vertex_dest`; both are the current totals plus the
/// local index. The totals then advance. Overflowing the 32-bit running
/// totals is a hard failure distinct from the per-call argument checks.
///
/// # Example
/// ```
/// use meshprep::algo::{concatenate_mesh, ConcatTotals};
///
/// let mut totals = ConcatTotals::default();
/// let mut faces = [0u32; 2];
/// let mut vertices = [0u32; 4];
/// concatenate_mesh(2, 4, &mut faces, &mut vertices, &mut totals).unwrap();
/// assert_eq!(faces, [0, 1]);
///
/// let mut faces2 = [0u32; 3];
/// let mut vertices2 = [0u32; 5];
/// concatenate_mesh(3, 5, &mut faces2, &mut vertices2, &mut totals).unwrap();
/// assert_eq!(faces2, [2, 3, 4]);
/// assert_eq!(vertices2, [4, 5, 6, 7, 8]);
/// assert_eq!(totals, ConcatTotals { faces: 5, vertices: 9 });
/// ```
pub fn concatenate_mesh(
    face_count: usize,
    vertex_count: usize,
    face_dest: &mut [u32],
    vertex_dest: &mut [u32],
    totals: &mut ConcatTotals,
) -> Result<()> {
    if face_count == 0 {
        return Err(MeshError::invalid_param(
            "face_count",
            face_count,
            "must be non-zero",
        ));
    }
    if vertex_count == 0 {
        return Err(MeshError::invalid_param(
            "vertex_count",
            vertex_count,
            "must be non-zero",
        ));
    }
    if face_dest.len() != face_count {
        return Err(MeshError::BufferSize {
            name: "face_dest",
            expected: face_count,
            actual: face_dest.len(),
        });
    }
    if vertex_dest.len() != vertex_count {
        return Err(MeshError::BufferSize {
            name: "vertex_dest",
            expected: vertex_count,
            actual: vertex_dest.len(),
        });
    }

    let new_faces = u32::try_from(face_count)
        .ok()
        .and_then(|n| totals.faces.checked_add(n))
        .ok_or(MeshError::ArithmeticOverflow {
            what: "running face total exceeds 32 bits",
        })?;
    let new_vertices = u32::try_from(vertex_count)
        .ok()
        .and_then(|n| totals.vertices.checked_add(n))
        .ok_or(MeshError::ArithmeticOverflow {
            what: "running vertex total exceeds 32 bits",
        })?;

    for (i, dest) in face_dest.iter_mut().enumerate() {
        *dest = totals.faces + i as u32;
    }
    for (i, dest) in vertex_dest.iter_mut().enumerate() {
        *dest = totals.vertices + i as u32;
    }
    totals.faces = new_faces;
    totals.vertices = new_vertices;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_merge_is_contiguous_and_disjoint() {
        let meshes = [(12usize, 8usize), (4, 6), (30, 17)];
        let mut totals = ConcatTotals::default();
        let mut all_faces: Vec<u32> = Vec::new();
        let mut all_vertices: Vec<u32> = Vec::new();

        for &(fc, vc) in &meshes {
            let mut fd = vec![0u32; fc];
            let mut vd = vec![0u32; vc];
            concatenate_mesh(fc, vc, &mut fd, &mut vd, &mut totals).unwrap();
            // Contiguous range starting at the previous total.
            assert_eq!(fd.first().copied(), Some(all_faces.len() as u32));
            assert!(fd.windows(2).all(|w| w[1] == w[0] + 1));
            all_faces.extend(fd);
            all_vertices.extend(vd);
        }

        let face_sum: usize = meshes.iter().map(|m| m.0).sum();
        let vertex_sum: usize = meshes.iter().map(|m| m.1).sum();
        assert_eq!(totals.faces as usize, face_sum);
        assert_eq!(totals.vertices as usize, vertex_sum);

        // Destinations cover 0..total exactly once.
        let expected: Vec<u32> = (0..face_sum as u32).collect();
        assert_eq!(all_faces, expected);
        let expected: Vec<u32> = (0..vertex_sum as u32).collect();
        assert_eq!(all_vertices, expected);
    }

    #[test]
    fn test_overflow_detected() {
        let mut totals = ConcatTotals {
            faces: u32::MAX - 1,
            vertices: 0,
        };
        let mut fd = vec![0u32; 2];
        let mut vd = vec![0u32; 1];
        let err = concatenate_mesh(2, 1, &mut fd, &mut vd, &mut totals).unwrap_err();
        assert!(matches!(err, MeshError::ArithmeticOverflow { .. }));
        // Totals untouched on failure.
        assert_eq!(totals.faces, u32::MAX - 1);
    }

    #[test]
    fn test_zero_counts_rejected() {
        let mut totals = ConcatTotals::default();
        assert!(concatenate_mesh(0, 1, &mut [], &mut [0], &mut totals).is_err());
        assert!(concatenate_mesh(1, 0, &mut [0], &mut [], &mut totals).is_err());
    }

    #[test]
    fn test_wrong_map_length_rejected() {
        let mut totals = ConcatTotals::default();
        let mut fd = vec![0u32; 3];
        let mut vd = vec![0u32; 4];
        let err = concatenate_mesh(2, 4, &mut fd, &mut vd, &mut totals).unwrap_err();
        assert!(matches!(err, MeshError::BufferSize { .. }));
    }
}
