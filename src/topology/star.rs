//! Per-vertex face stars and fan connectivity.
//!
//! The *star* of a vertex is the set of used faces referencing it. Splitting
//! a star into edge-connected *fan groups* is the primitive behind both
//! bowtie detection (more than one group = bowtie) and bowtie repair (each
//! extra group is rewired to a duplicate vertex).

use crate::mesh::{face, is_unused_face, MeshIndex};

/// CSR-layout star table: for every vertex, its incident used faces in
/// ascending face order.
pub(crate) struct VertexStars {
    offsets: Vec<usize>,
    faces: Vec<usize>,
}

impl VertexStars {
    /// Build the star table. Faces referencing a vertex at two corners
    /// (degenerate) list it once. Indices at or above `vertex_count` are
    /// ignored rather than assumed valid.
    pub fn build<I: MeshIndex>(indices: &[I], vertex_count: usize) -> Self {
        let face_count = indices.len() / 3;

        let mut counts = vec![0usize; vertex_count];
        for f in 0..face_count {
            let tri = face(indices, f);
            if is_unused_face(tri) {
                continue;
            }
            for_each_unique_corner(tri, vertex_count, |v| counts[v] += 1);
        }

        let mut offsets = vec![0usize; vertex_count + 1];
        for v in 0..vertex_count {
            offsets[v + 1] = offsets[v] + counts[v];
        }

        let mut faces = vec![0usize; offsets[vertex_count]];
        let mut cursor = offsets.clone();
        for f in 0..face_count {
            let tri = face(indices, f);
            if is_unused_face(tri) {
                continue;
            }
            for_each_unique_corner(tri, vertex_count, |v| {
                faces[cursor[v]] = f;
                cursor[v] += 1;
            });
        }

        Self { offsets, faces }
    }

    /// The used faces incident to vertex `v`, ascending.
    #[inline]
    pub fn faces_of(&self, v: usize) -> &[usize] {
        &self.faces[self.offsets[v]..self.offsets[v + 1]]
    }
}

/// Visit each distinct in-range corner of a face once, skipping repeats of
/// earlier corners (degenerate faces).
#[inline]
fn for_each_unique_corner<I: MeshIndex>(
    tri: [I; 3],
    vertex_count: usize,
    mut visit: impl FnMut(usize),
) {
    for c in 0..3 {
        let v = tri[c].to_usize();
        if v >= vertex_count {
            continue;
        }
        if (0..c).any(|p| tri[p] == tri[c]) {
            continue;
        }
        visit(v);
    }
}

fn find_root(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Split the star of vertex `v` into edge-connected fan groups.
///
/// Two star faces belong to one group when they are adjacency neighbors
/// across an edge incident to `v`. Groups come out ordered by their lowest
/// face index, with faces ascending inside each group; group 0 therefore
/// contains the lowest-indexed face of the star.
pub(crate) fn fan_groups<I: MeshIndex>(
    stars: &VertexStars,
    indices: &[I],
    adjacency: &[I],
    v: usize,
) -> Vec<Vec<usize>> {
    let star = stars.faces_of(v);
    if star.len() <= 1 {
        return if star.is_empty() {
            Vec::new()
        } else {
            vec![vec![star[0]]]
        };
    }

    let face_count = indices.len() / 3;
    let mut parent: Vec<usize> = (0..star.len()).collect();

    for (slot, &f) in star.iter().enumerate() {
        let tri = face(indices, f);
        for c in 0..3 {
            if tri[c].to_usize() != v {
                continue;
            }
            // Corner c lies on edges (c+1)%3 and (c+2)%3.
            for e in [(c + 1) % 3, (c + 2) % 3] {
                let Some(g) = adjacency[3 * f + e].as_used() else {
                    continue;
                };
                if g >= face_count {
                    continue;
                }
                // Neighbor must also be in this star.
                let Ok(other_slot) = star.binary_search(&g) else {
                    continue;
                };
                let ra = find_root(&mut parent, slot);
                let rb = find_root(&mut parent, other_slot);
                if ra != rb {
                    // Keep the smaller slot as root so group order follows
                    // face order.
                    let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
                    parent[hi] = lo;
                }
            }
        }
    }

    let mut groups: Vec<Vec<usize>> = Vec::new();
    let mut group_of_root = vec![usize::MAX; star.len()];
    for slot in 0..star.len() {
        let root = find_root(&mut parent, slot);
        if group_of_root[root] == usize::MAX {
            group_of_root[root] = groups.len();
            groups.push(Vec::new());
        }
        groups[group_of_root[root]].push(star[slot]);
    }
    groups
}
