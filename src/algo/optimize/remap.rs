//! Remap validation and application.
//!
//! Face and vertex remaps produced by the optimization passes read
//! `remap[new_slot] = original`, with unused-sentinel entries for discarded
//! slots. Before any remap is applied it is validated as a bijection over
//! its used domain; a remap that repeats or fabricates entries is rejected,
//! never silently applied.
//!
//! Every application function here takes its inputs by shared borrow and
//! writes a fresh buffer (or, for the explicit `_in_place` variant, mutates
//! one buffer against an immutably borrowed remap), so the unsafe aliasing
//! combinations of the pointer-based reference designs cannot be expressed
//! at all.

use crate::error::{MeshError, Result};
use crate::mesh::MeshIndex;

/// Validate a remap as a bijection over its used domain: every non-sentinel
/// entry in range and no entry repeated. Returns the used-entry count.
fn check_remap<I: MeshIndex>(remap: &[I], domain: usize, kind: &'static str) -> Result<usize> {
    if remap.len() != domain {
        return Err(MeshError::BufferSize {
            name: "remap",
            expected: domain,
            actual: remap.len(),
        });
    }
    let mut seen = vec![false; domain];
    let mut used = 0usize;
    for (slot, entry) in remap.iter().enumerate() {
        let Some(old) = entry.as_used() else {
            continue;
        };
        if old >= domain {
            return Err(MeshError::InvalidRemap {
                kind,
                detail: format!("slot {} names {} beyond the domain {}", slot, old, domain),
            });
        }
        if seen[old] {
            return Err(MeshError::InvalidRemap {
                kind,
                detail: format!("{} appears more than once", old),
            });
        }
        seen[old] = true;
        used += 1;
    }
    Ok(used)
}

/// Additionally require that all used entries form a prefix (no sentinel
/// gaps before a used slot), so positions in the remap double as compacted
/// output positions.
fn check_prefix_remap<I: MeshIndex>(
    remap: &[I],
    domain: usize,
    kind: &'static str,
) -> Result<usize> {
    let used = check_remap(remap, domain, kind)?;
    if remap[..used].iter().any(|e| e.is_unused()) {
        return Err(MeshError::InvalidRemap {
            kind,
            detail: "sentinel slot precedes a used slot".into(),
        });
    }
    Ok(used)
}

/// Invert a remap: `inverse[original] = new_slot`, sentinel for originals no
/// slot names.
fn invert_remap<I: MeshIndex>(remap: &[I]) -> Vec<I> {
    let mut inverse = vec![I::UNUSED; remap.len()];
    for (slot, entry) in remap.iter().enumerate() {
        if let Some(old) = entry.as_used() {
            inverse[old] = I::from_usize(slot);
        }
    }
    inverse
}

/// Apply a face remap to an index buffer.
///
/// Output face `j` is input face `face_remap[j]`; sentinel slots (discarded
/// faces) become whole unused faces.
pub fn reorder_ib<I: MeshIndex>(indices: &[I], face_remap: &[I]) -> Result<Vec<I>> {
    let face_count = indices.len() / 3;
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(MeshError::invalid_param(
            "indices",
            indices.len(),
            "length must be a non-zero multiple of 3",
        ));
    }
    check_remap(face_remap, face_count, "face")?;

    let mut out = vec![I::UNUSED; indices.len()];
    for (slot, entry) in face_remap.iter().enumerate() {
        if let Some(old) = entry.as_used() {
            out[3 * slot..3 * slot + 3].copy_from_slice(&indices[3 * old..3 * old + 3]);
        }
    }
    Ok(out)
}

/// Apply a face remap to an index buffer and its adjacency together.
///
/// The adjacency output renumbers neighbor faces into their new positions;
/// neighbors that the remap discarded become boundaries. Input and output
/// adjacency are necessarily distinct buffers here, which is exactly the
/// combination the pointer-based designs have to reject at runtime.
pub fn reorder_ib_and_adjacency<I: MeshIndex>(
    indices: &[I],
    adjacency: &[I],
    face_remap: &[I],
) -> Result<(Vec<I>, Vec<I>)> {
    if adjacency.len() != indices.len() {
        return Err(MeshError::BufferSize {
            name: "adjacency",
            expected: indices.len(),
            actual: adjacency.len(),
        });
    }
    let out_indices = reorder_ib(indices, face_remap)?;
    let inverse = invert_remap(face_remap);

    let mut out_adjacency = vec![I::UNUSED; adjacency.len()];
    for (slot, entry) in face_remap.iter().enumerate() {
        let Some(old) = entry.as_used() else {
            continue;
        };
        for e in 0..3 {
            out_adjacency[3 * slot + e] = match adjacency[3 * old + e].as_used() {
                Some(neighbor) if neighbor < inverse.len() => inverse[neighbor],
                _ => I::UNUSED,
            };
        }
    }
    Ok((out_indices, out_adjacency))
}

/// Apply a vertex remap to an index buffer, returning the renumbered copy.
///
/// Every index is replaced by the new position of its vertex. Sentinel
/// indices (unused faces) pass through. An index referencing a vertex the
/// remap discarded is an error.
pub fn finalize_ib<I: MeshIndex>(indices: &[I], vertex_remap: &[I]) -> Result<Vec<I>> {
    let mut out = indices.to_vec();
    finalize_ib_in_place(&mut out, vertex_remap)?;
    Ok(out)
}

/// In-place variant of [`finalize_ib`].
pub fn finalize_ib_in_place<I: MeshIndex>(indices: &mut [I], vertex_remap: &[I]) -> Result<()> {
    if indices.is_empty() || indices.len() % 3 != 0 {
        return Err(MeshError::invalid_param(
            "indices",
            indices.len(),
            "length must be a non-zero multiple of 3",
        ));
    }
    check_remap(vertex_remap, vertex_remap.len(), "vertex")?;
    let inverse = invert_remap(vertex_remap);

    for (i, idx) in indices.iter_mut().enumerate() {
        let Some(v) = idx.as_used() else {
            continue;
        };
        if v >= inverse.len() {
            return Err(MeshError::IndexOutOfRange {
                face: i / 3,
                index: v,
                limit: inverse.len(),
            });
        }
        let new = inverse[v];
        if new.is_unused() {
            return Err(MeshError::InvalidRemap {
                kind: "vertex",
                detail: format!("index buffer references discarded vertex {}", v),
            });
        }
        *idx = new;
    }
    Ok(())
}

/// Finalize a vertex buffer: append the duplicates recorded by
/// [`clean`](crate::algo::clean()) and apply a vertex remap.
///
/// Generic over the vertex element type, so it applies equally to
/// positions, normals, UVs, or interleaved structs. `duplicates` entries
/// must reference original vertices (as `clean` guarantees). When a remap
/// is supplied it must cover the *expanded* buffer
/// (`vertices.len() + duplicates.len()`), with all used slots in a prefix;
/// discarded trailing vertices are dropped from the output.
pub fn finalize_vb<T: Clone, I: MeshIndex>(
    vertices: &[T],
    duplicates: &[I],
    vertex_remap: Option<&[I]>,
) -> Result<Vec<T>> {
    if vertices.is_empty() {
        return Err(MeshError::invalid_param(
            "vertices",
            0usize,
            "must be non-empty",
        ));
    }
    for (i, d) in duplicates.iter().enumerate() {
        match d.as_used() {
            Some(src) if src < vertices.len() => {}
            _ => {
                return Err(MeshError::invalid_param(
                    "duplicates",
                    i,
                    "duplicate source must reference an original vertex",
                ))
            }
        }
    }

    let mut expanded = Vec::with_capacity(vertices.len() + duplicates.len());
    expanded.extend_from_slice(vertices);
    expanded.extend(duplicates.iter().map(|d| vertices[d.to_usize()].clone()));

    let Some(remap) = vertex_remap else {
        return Ok(expanded);
    };
    let used = check_prefix_remap(remap, expanded.len(), "vertex")?;

    let mut out = Vec::with_capacity(used);
    for entry in &remap[..used] {
        // The prefix check guarantees these slots are used.
        out.push(expanded[entry.to_usize()].clone());
    }
    Ok(out)
}
