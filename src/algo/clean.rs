//! Mesh cleaning.
//!
//! [`clean`] repairs the topological defects that break downstream
//! processing, by the one tool available to an index-buffer-level pass:
//! splitting a vertex into the original plus a duplicate and rewiring a
//! subset of its faces onto the duplicate. Three defects are handled:
//!
//! - **Backfacing duplicates** — two adjacent faces using the same three
//!   vertices (a coincident back-to-back pair) are disconnected by giving
//!   one side fresh vertices.
//! - **Bowties** — a vertex shared by disconnected face fans is split so
//!   each fan gets its own vertex.
//! - **Attribute boundaries** — when per-face attributes are supplied, no
//!   vertex remains shared between faces of different attributes.
//!
//! Asymmetric adjacency entries are tolerated and silently nulled to the
//! unused sentinel; only [`validate`](super::validate()) treats them as a
//! reportable problem. Unused faces pass through untouched and never
//! influence grouping.
//!
//! The returned duplicate list records, for each appended vertex, the
//! *original* vertex it was cloned from (entry `i` describes new vertex
//! `vertex_count + i`), in discovery order, so the caller can extend its
//! vertex attribute buffers to match — see
//! [`finalize_vb`](super::optimize::finalize_vb).

use crate::error::{MeshError, Result};
use crate::mesh::{
    check_index_buffer, check_indices_in_range, face, is_unused_face, used_faces, MeshIndex,
};
use crate::topology::star::{fan_groups, VertexStars};

/// Record a fresh duplicate of `source` (which may itself be a duplicate
/// created earlier in the same call; the list always stores the ultimate
/// original). Returns the new vertex index.
fn alloc_duplicate<I: MeshIndex>(
    duplicates: &mut Vec<I>,
    vertex_count: usize,
    source: usize,
) -> Result<I> {
    let new_index = vertex_count + duplicates.len();
    if new_index >= I::capacity() {
        return Err(MeshError::ArithmeticOverflow {
            what: "vertex duplication exceeds the index width",
        });
    }
    let original = if source < vertex_count {
        I::from_usize(source)
    } else {
        duplicates[source - vertex_count]
    };
    duplicates.push(original);
    Ok(I::from_usize(new_index))
}

/// Whether two faces use the same three vertices, in any order.
fn same_vertex_set<I: MeshIndex>(a: [I; 3], b: [I; 3]) -> bool {
    let mut a = a;
    let mut b = b;
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

/// Repair bowties, backfacing duplicates, and attribute-boundary sharing by
/// duplicating vertices.
///
/// `indices` is rewritten in place; `adjacency`, when supplied, is kept
/// consistent (neighbor face indices never change, but links between split
/// pairs are nulled). The backfacing and bowtie passes need adjacency; the
/// attribute pass needs only `attributes`. Returns the duplicate list; the
/// mesh's new vertex count is `vertex_count + duplicates.len()`.
///
/// # Example
/// ```
/// use meshprep::algo::clean;
///
/// // Two triangles meeting only at vertex 2: a bowtie.
/// let mut indices: Vec<u32> = vec![0, 1, 2, 2, 3, 4];
/// let mut adjacency: Vec<u32> = vec![u32::MAX; 6];
///
/// let duplicates = clean(&mut indices, 5, Some(&mut adjacency), None, true).unwrap();
/// assert_eq!(duplicates, vec![2]);
/// assert_eq!(indices, vec![0, 1, 2, 5, 3, 4]);
/// ```
pub fn clean<I: MeshIndex>(
    indices: &mut [I],
    vertex_count: usize,
    mut adjacency: Option<&mut [I]>,
    attributes: Option<&[u32]>,
    break_bowties: bool,
) -> Result<Vec<I>> {
    let face_count = check_index_buffer::<I>(indices, vertex_count)?;
    check_indices_in_range(indices, vertex_count)?;
    if used_faces(indices).next().is_some() && vertex_count < 3 {
        return Err(MeshError::TooFewVertices {
            vertices: vertex_count,
            required: 3,
        });
    }
    if let Some(adj) = adjacency.as_deref() {
        if adj.len() != indices.len() {
            return Err(MeshError::BufferSize {
                name: "adjacency",
                expected: indices.len(),
                actual: adj.len(),
            });
        }
    } else if break_bowties {
        return Err(MeshError::invalid_param(
            "adjacency",
            "None",
            "bowtie breaking requires adjacency",
        ));
    }
    if let Some(attrs) = attributes {
        if attrs.len() != face_count {
            return Err(MeshError::BufferSize {
                name: "attributes",
                expected: face_count,
                actual: attrs.len(),
            });
        }
    }

    let mut duplicates: Vec<I> = Vec::new();

    // Null asymmetric adjacency. Checked against a snapshot so one nulled
    // entry cannot cascade into its still-symmetric neighbors.
    if let Some(adj) = adjacency.as_deref_mut() {
        let snapshot = adj.to_vec();
        for f in 0..face_count {
            for e in 0..3 {
                let Some(g) = snapshot[3 * f + e].as_used() else {
                    continue;
                };
                if g >= face_count || g == f {
                    adj[3 * f + e] = I::UNUSED;
                    continue;
                }
                let reciprocated = (0..3).any(|k| snapshot[3 * g + k].as_used() == Some(f));
                if !reciprocated {
                    adj[3 * f + e] = I::UNUSED;
                }
            }
        }
    }

    // Disconnect backfacing duplicate pairs: the higher-indexed face of each
    // pair is rewired onto fresh vertices and the linking entries nulled.
    if let Some(adj) = adjacency.as_deref_mut() {
        let mut split = vec![false; face_count];
        for f in 0..face_count {
            let tri = face(indices, f);
            if is_unused_face(tri) || split[f] {
                continue;
            }
            for e in 0..3 {
                let Some(g) = adj[3 * f + e].as_used() else {
                    continue;
                };
                if g <= f || g >= face_count || split[g] {
                    continue;
                }
                let other = face(indices, g);
                if is_unused_face(other) || !same_vertex_set(tri, other) {
                    continue;
                }

                for c in 0..3 {
                    let old = indices[3 * g + c].to_usize();
                    indices[3 * g + c] = alloc_duplicate(&mut duplicates, vertex_count, old)?;
                }
                for k in 0..3 {
                    if adj[3 * f + k].as_used() == Some(g) {
                        adj[3 * f + k] = I::UNUSED;
                    }
                    if adj[3 * g + k].as_used() == Some(f) {
                        adj[3 * g + k] = I::UNUSED;
                    }
                }
                split[g] = true;
            }
        }
    }

    // Break bowties: every fan group beyond the one holding the lowest face
    // index gets its own copy of the vertex.
    if break_bowties {
        if let Some(adj) = adjacency.as_deref_mut() {
            let total = vertex_count + duplicates.len();
            let stars = VertexStars::build(indices, total);
            for v in 0..total {
                let groups = fan_groups(&stars, indices, adj, v);
                if groups.len() <= 1 {
                    continue;
                }
                for group in &groups[1..] {
                    let fresh = alloc_duplicate(&mut duplicates, vertex_count, v)?;
                    for &f in group {
                        for c in 0..3 {
                            if indices[3 * f + c].to_usize() == v {
                                indices[3 * f + c] = fresh;
                            }
                        }
                    }
                }
            }
        }
    }

    // Split vertices shared across attribute boundaries: the attribute of
    // the lowest-indexed face keeps the vertex, each further distinct id (in
    // order of its first face) gets a duplicate.
    if let Some(attrs) = attributes {
        let total = vertex_count + duplicates.len();
        let stars = VertexStars::build(indices, total);
        for v in 0..total {
            let star = stars.faces_of(v);
            if star.len() <= 1 {
                continue;
            }
            let mut assigned: Vec<(u32, I)> = vec![(attrs[star[0]], I::from_usize(v))];
            for &f in &star[1..] {
                let id = attrs[f];
                let target = match assigned.iter().find(|&&(a, _)| a == id) {
                    Some(&(_, idx)) => idx,
                    None => {
                        let fresh = alloc_duplicate(&mut duplicates, vertex_count, v)?;
                        assigned.push((id, fresh));
                        fresh
                    }
                };
                if target.to_usize() == v {
                    continue;
                }
                for c in 0..3 {
                    if indices[3 * f + c].to_usize() == v {
                        indices[3 * f + c] = target;
                    }
                }
            }
        }
    }

    Ok(duplicates)
}
