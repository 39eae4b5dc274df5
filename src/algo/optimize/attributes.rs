//! Attribute sorting and subset extraction.
//!
//! Faces carrying per-face attribute ids (material, submesh, whatever the
//! caller groups by) are sorted into contiguous runs before attribute-aware
//! optimization, and the runs are described as subsets for draw-call
//! submission.

use crate::error::{MeshError, Result};
use crate::mesh::MeshIndex;

/// A contiguous run of faces sharing one attribute id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subset {
    /// First face of the run.
    pub offset: usize,
    /// Number of faces in the run.
    pub count: usize,
    /// The shared attribute id.
    pub attribute: u32,
}

/// Stable-sort faces by attribute id.
///
/// Returns the sorted attribute array and the face remap
/// (`remap[new_slot] = original_face`) that produces it; apply the remap
/// with [`reorder_ib`](super::reorder_ib). Faces sharing an id keep their
/// relative order.
///
/// # Example
/// ```
/// use meshprep::algo::optimize::attribute_sort;
///
/// let attributes = vec![2, 0, 2, 0];
/// let (sorted, remap): (Vec<u32>, Vec<u32>) = attribute_sort(&attributes).unwrap();
/// assert_eq!(sorted, vec![0, 0, 2, 2]);
/// assert_eq!(remap, vec![1, 3, 0, 2]);
/// ```
pub fn attribute_sort<I: MeshIndex>(attributes: &[u32]) -> Result<(Vec<u32>, Vec<I>)> {
    if attributes.is_empty() {
        return Err(MeshError::EmptyMesh);
    }
    if attributes.len() > I::capacity() {
        return Err(MeshError::ArithmeticOverflow {
            what: "face count exceeds the index width of the remap",
        });
    }

    let mut order: Vec<usize> = (0..attributes.len()).collect();
    order.sort_by_key(|&f| attributes[f]);

    let sorted = order.iter().map(|&f| attributes[f]).collect();
    let remap = order.into_iter().map(I::from_usize).collect();
    Ok((sorted, remap))
}

/// Describe the contiguous attribute runs of a (sorted or unsorted) face
/// attribute array as subsets.
pub fn compute_subsets(attributes: &[u32]) -> Vec<Subset> {
    let mut subsets = Vec::new();
    let mut start = 0usize;
    for f in 1..=attributes.len() {
        if f == attributes.len() || attributes[f] != attributes[start] {
            subsets.push(Subset {
                offset: start,
                count: f - start,
                attribute: attributes[start],
            });
            start = f;
        }
    }
    subsets
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_sort_is_stable() {
        let attributes = vec![1, 0, 1, 0, 1];
        let (sorted, remap): (Vec<u32>, Vec<u32>) = attribute_sort(&attributes).unwrap();
        assert_eq!(sorted, vec![0, 0, 1, 1, 1]);
        // Equal ids keep their original relative order.
        assert_eq!(remap, vec![1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_empty_rejected() {
        assert!(attribute_sort::<u32>(&[]).is_err());
    }

    #[test]
    fn test_compute_subsets() {
        let attributes = vec![0, 0, 1, 1, 1, 4];
        let subsets = compute_subsets(&attributes);
        assert_eq!(
            subsets,
            vec![
                Subset { offset: 0, count: 2, attribute: 0 },
                Subset { offset: 2, count: 3, attribute: 1 },
                Subset { offset: 5, count: 1, attribute: 4 },
            ]
        );
    }

    #[test]
    fn test_subsets_of_empty() {
        assert!(compute_subsets(&[]).is_empty());
    }

    #[test]
    fn test_sort_then_subsets_partition() {
        let attributes = vec![3, 1, 3, 2, 1, 1];
        let (sorted, _): (Vec<u32>, Vec<u32>) = attribute_sort(&attributes).unwrap();
        let subsets = compute_subsets(&sorted);
        let total: usize = subsets.iter().map(|s| s.count).sum();
        assert_eq!(total, attributes.len());
        for pair in subsets.windows(2) {
            assert_eq!(pair[0].offset + pair[0].count, pair[1].offset);
            assert!(pair[0].attribute < pair[1].attribute);
        }
    }
}
