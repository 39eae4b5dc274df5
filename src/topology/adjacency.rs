//! Triangle adjacency derivation.
//!
//! The adjacency buffer parallels the index buffer: entry `3f + e` names the
//! face across edge `e` of face `f`, or the unused sentinel when the edge is
//! a boundary. Edge `e` is the edge *opposite* corner `e` in winding order,
//! joining corners `(e+1)%3` and `(e+2)%3`.
//!
//! Matching happens on point representatives rather than raw indices, so
//! faces meeting across a seam of duplicated vertices are still neighbors.
//! For each directed edge the neighbor is the first face (lowest face index)
//! owning the reversed edge; that tie-break is this crate's documented
//! behavior for non-manifold input, where more than one candidate can exist.

use ahash::AHashMap;
use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{check_index_buffer, check_indices_in_range, face, is_unused_face, MeshIndex};

use super::point_reps::generate_point_reps;

/// Resolve a point-representative array into plain `usize` entries,
/// validating length and range. `None` means identity.
fn resolve_reps<I: MeshIndex>(
    point_reps: Option<&[I]>,
    vertex_count: usize,
) -> Result<Vec<usize>> {
    match point_reps {
        None => Ok((0..vertex_count).collect()),
        Some(reps) => {
            if reps.len() != vertex_count {
                return Err(MeshError::BufferSize {
                    name: "point_reps",
                    expected: vertex_count,
                    actual: reps.len(),
                });
            }
            let mut out = Vec::with_capacity(vertex_count);
            for (v, &r) in reps.iter().enumerate() {
                match r.as_used() {
                    // A sentinel representative stands for "itself".
                    None => out.push(v),
                    Some(rep) if rep < vertex_count => out.push(rep),
                    Some(rep) => {
                        return Err(MeshError::invalid_param(
                            "point_reps",
                            rep,
                            "representative exceeds the vertex count",
                        ))
                    }
                }
            }
            Ok(out)
        }
    }
}

/// The two representative endpoints of edge `e` of a face, in winding order.
#[inline]
fn edge_reps<I: MeshIndex>(tri: [I; 3], e: usize, reps: &[usize]) -> (usize, usize) {
    let a = reps[tri[(e + 1) % 3].to_usize()];
    let b = reps[tri[(e + 2) % 3].to_usize()];
    (a, b)
}

/// Derive triangle adjacency from an index buffer and point representatives.
///
/// Pass `None` for `point_reps` to match on raw indices (identity
/// representatives). Unused faces contribute no edges and receive sentinel
/// adjacency on all three slots. Zero-length edges (both endpoints sharing a
/// representative) never match anything.
pub fn convert_point_reps_to_adjacency<I: MeshIndex>(
    indices: &[I],
    vertex_count: usize,
    point_reps: Option<&[I]>,
) -> Result<Vec<I>> {
    let face_count = check_index_buffer::<I>(indices, vertex_count)?;
    check_indices_in_range(indices, vertex_count)?;
    if face_count > I::capacity() {
        return Err(MeshError::ArithmeticOverflow {
            what: "face count exceeds the index width of the adjacency buffer",
        });
    }
    let reps = resolve_reps(point_reps, vertex_count)?;

    // Directed representative edge -> faces owning it, in ascending face
    // order. Insertion order is face order, so "first match" below is
    // independent of hash iteration.
    let mut edge_map: AHashMap<(usize, usize), Vec<usize>> =
        AHashMap::with_capacity(face_count * 3);
    for f in 0..face_count {
        let tri = face(indices, f);
        if is_unused_face(tri) {
            continue;
        }
        for e in 0..3 {
            let (a, b) = edge_reps(tri, e, &reps);
            if a == b {
                continue;
            }
            edge_map.entry((a, b)).or_default().push(f);
        }
    }

    let mut adjacency = vec![I::UNUSED; face_count * 3];
    for f in 0..face_count {
        let tri = face(indices, f);
        if is_unused_face(tri) {
            continue;
        }
        for e in 0..3 {
            let (a, b) = edge_reps(tri, e, &reps);
            if a == b {
                continue;
            }
            if let Some(candidates) = edge_map.get(&(b, a)) {
                if let Some(&g) = candidates.iter().find(|&&g| g != f) {
                    adjacency[3 * f + e] = I::from_usize(g);
                }
            }
        }
    }

    Ok(adjacency)
}

/// Derive both point representatives and triangle adjacency in one call.
///
/// # Example
/// ```
/// use meshprep::topology::generate_adjacency_and_point_reps;
/// use nalgebra::Point3;
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 1.0, 0.0),
/// ];
/// let indices: Vec<u32> = vec![0, 1, 2, 1, 3, 2];
///
/// let (reps, adjacency) = generate_adjacency_and_point_reps(&indices, &positions, 0.0).unwrap();
/// assert_eq!(reps, vec![0, 1, 2, 3]);
/// // The faces meet across the diagonal: edge 0 of face 0 (opposite its
/// // corner 0) and edge 1 of face 1.
/// assert_eq!(adjacency[0], 1);
/// assert_eq!(adjacency[3 + 1], 0);
/// ```
pub fn generate_adjacency_and_point_reps<I: MeshIndex>(
    indices: &[I],
    positions: &[Point3<f32>],
    epsilon: f32,
) -> Result<(Vec<I>, Vec<I>)> {
    let reps = generate_point_reps(indices, positions, epsilon)?;
    let adjacency = convert_point_reps_to_adjacency(indices, positions.len(), Some(&reps))?;
    Ok((reps, adjacency))
}

/// Derive triangle adjacency only, with positions matched within `epsilon`.
pub fn generate_adjacency<I: MeshIndex>(
    indices: &[I],
    positions: &[Point3<f32>],
    epsilon: f32,
) -> Result<Vec<I>> {
    Ok(generate_adjacency_and_point_reps(indices, positions, epsilon)?.1)
}

/// Expand a 3-index-per-face buffer into the 6-index-per-face layout used by
/// adjacency-aware geometry processing.
///
/// Output face `f` holds `[v0, a0, v1, a1, v2, a2]` where `a_k` is the vertex
/// of the neighboring face across edge `(v_k, v_{k+1})` that does not lie on
/// the shared edge. Where there is no neighbor (boundary), or the neighbor
/// has no off-edge vertex, `a_k` falls back to the face's own opposite
/// corner. Unused faces expand to six sentinels. The result is a fresh
/// buffer; the borrow checker rules out aliasing the input.
pub fn generate_gs_adjacency<I: MeshIndex>(
    indices: &[I],
    point_reps: &[I],
    adjacency: &[I],
    vertex_count: usize,
) -> Result<Vec<I>> {
    let face_count = check_index_buffer::<I>(indices, vertex_count)?;
    check_indices_in_range(indices, vertex_count)?;
    if adjacency.len() != indices.len() {
        return Err(MeshError::BufferSize {
            name: "adjacency",
            expected: indices.len(),
            actual: adjacency.len(),
        });
    }
    let reps = resolve_reps(Some(point_reps), vertex_count)?;

    let mut out = vec![I::UNUSED; face_count * 6];
    for f in 0..face_count {
        let tri = face(indices, f);
        if is_unused_face(tri) {
            continue;
        }
        for k in 0..3 {
            out[6 * f + 2 * k] = tri[k];

            // Edge (corner k, corner k+1) is edge (k+2)%3 in the
            // opposite-corner numbering.
            let e = (k + 2) % 3;
            let own_opposite = tri[e];
            let ra = reps[tri[k].to_usize()];
            let rb = reps[tri[(k + 1) % 3].to_usize()];

            let neighbor_vertex = adjacency[3 * f + e]
                .as_used()
                .filter(|&g| g < face_count)
                .map(|g| face(indices, g))
                .filter(|&g_tri| !is_unused_face(g_tri))
                .and_then(|g_tri| {
                    g_tri
                        .into_iter()
                        .find(|&v| reps[v.to_usize()] != ra && reps[v.to_usize()] != rb)
                });

            out[6 * f + 2 * k + 1] = neighbor_vertex.unwrap_or(own_opposite);
        }
    }

    Ok(out)
}
