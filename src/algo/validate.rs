//! Mesh validation.
//!
//! [`validate`] checks an index buffer (and optionally its adjacency) for
//! topological well-formedness. Structural problems — out-of-range indices,
//! malformed adjacency references — are always errors. Everything else is
//! opt-in through [`ValidateOptions`]: degenerate faces, backfacing
//! duplicates, bowties, unused vertices, and asymmetric adjacency are
//! tolerated by default and only become failures when their flag is set.
//!
//! Unlike the rest of the crate, validation does not stop at the first
//! problem: every violation of every enabled check is described into the
//! caller's message list, and a single aggregate error is returned at the
//! end, so one call can reveal every topology problem in a mesh at once.
//!
//! # Example
//! ```
//! use meshprep::algo::{validate, ValidateOptions};
//!
//! // Face 1 is degenerate (vertex 3 repeated).
//! let indices: Vec<u32> = vec![0, 1, 2, 3, 3, 2];
//!
//! // Tolerated by default...
//! assert!(validate(&indices, 4, None, &ValidateOptions::default(), None).is_ok());
//!
//! // ...but a failure when asked for.
//! let mut messages = Vec::new();
//! let options = ValidateOptions::default().degenerate();
//! let result = validate(&indices, 4, None, &options, Some(&mut messages));
//! assert!(result.is_err());
//! assert_eq!(messages.len(), 1);
//! ```

use crate::error::{MeshError, Result};
use crate::mesh::{
    check_index_buffer, face, is_degenerate_face, is_unused_face, referenced_vertices, MeshIndex,
};
use crate::topology::star::{fan_groups, VertexStars};

/// Which optional checks [`validate`] performs.
///
/// All flags default to off; the default configuration still performs the
/// structural checks (index range, adjacency referential consistency), which
/// cannot be disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateOptions {
    /// Fail on degenerate faces (two or more equal indices).
    pub degenerate: bool,

    /// Fail on backfacing duplicates: a face and its adjacency neighbor
    /// using the same three vertices.
    pub backfacing: bool,

    /// Fail on bowties: a vertex shared by two or more face fans that do not
    /// connect through shared edges.
    pub bowties: bool,

    /// Fail on vertices referenced by no used face.
    pub unused: bool,

    /// Fail on asymmetric adjacency: `adjacency[f][e] == g` with no edge of
    /// `g` pointing back at `f`.
    pub asymmetric_adjacency: bool,
}

impl ValidateOptions {
    /// Enable the degenerate-face check.
    pub fn degenerate(mut self) -> Self {
        self.degenerate = true;
        self
    }

    /// Enable the backfacing-duplicate check. Requires adjacency.
    pub fn backfacing(mut self) -> Self {
        self.backfacing = true;
        self
    }

    /// Enable the bowtie check. Requires adjacency.
    pub fn bowties(mut self) -> Self {
        self.bowties = true;
        self
    }

    /// Enable the unused-vertex check.
    pub fn unused(mut self) -> Self {
        self.unused = true;
        self
    }

    /// Enable the asymmetric-adjacency check. Requires adjacency.
    pub fn asymmetric_adjacency(mut self) -> Self {
        self.asymmetric_adjacency = true;
        self
    }

    /// Enable every optional check.
    pub fn all() -> Self {
        Self {
            degenerate: true,
            backfacing: true,
            bowties: true,
            unused: true,
            asymmetric_adjacency: true,
        }
    }
}

/// Validate an index buffer, and optionally its adjacency, against the
/// enabled checks.
///
/// Violations accumulate as human-readable lines in `messages` (when
/// provided) instead of failing fast; if any enabled check found a problem,
/// the call returns [`MeshError::Validation`] carrying the total count.
/// Malformed *arguments* (wrong buffer sizes, checks that need adjacency
/// without adjacency supplied) return immediately without touching
/// `messages`.
pub fn validate<I: MeshIndex>(
    indices: &[I],
    vertex_count: usize,
    adjacency: Option<&[I]>,
    options: &ValidateOptions,
    mut messages: Option<&mut Vec<String>>,
) -> Result<()> {
    let face_count = check_index_buffer::<I>(indices, vertex_count)?;

    if let Some(adj) = adjacency {
        if adj.len() != indices.len() {
            return Err(MeshError::BufferSize {
                name: "adjacency",
                expected: indices.len(),
                actual: adj.len(),
            });
        }
    } else if options.backfacing || options.bowties || options.asymmetric_adjacency {
        return Err(MeshError::invalid_param(
            "adjacency",
            "None",
            "the backfacing, bowtie, and asymmetric-adjacency checks require adjacency",
        ));
    }

    let mut failures = 0usize;
    let mut report = |msg: String| {
        failures += 1;
        if let Some(out) = messages.as_mut() {
            out.push(msg);
        }
    };

    // Structural: indices in range, sentinel used for whole faces only.
    for f in 0..face_count {
        let tri = face(indices, f);
        if is_unused_face(tri) {
            if !tri.iter().all(|i| i.is_unused()) {
                report(format!(
                    "face {} mixes the reserved unused sentinel with real indices",
                    f
                ));
            }
            continue;
        }
        for idx in tri {
            let v = idx.to_usize();
            if v >= vertex_count {
                report(format!(
                    "face {} references vertex {} beyond the declared count {}",
                    f, v, vertex_count
                ));
            }
        }
    }

    // Structural: adjacency referential consistency.
    if let Some(adj) = adjacency {
        for f in 0..face_count {
            for e in 0..3 {
                let Some(g) = adj[3 * f + e].as_used() else {
                    continue;
                };
                if g >= face_count {
                    report(format!(
                        "face {} edge {} names neighbor {} beyond the face count {}",
                        f, e, g, face_count
                    ));
                } else if g == f {
                    report(format!("face {} edge {} names the face itself", f, e));
                }
            }
        }
    }

    if options.degenerate {
        for f in 0..face_count {
            let tri = face(indices, f);
            if !is_unused_face(tri) && is_degenerate_face(tri) {
                report(format!("face {} is degenerate", f));
            }
        }
    }

    if options.unused {
        for (v, used) in referenced_vertices(indices, vertex_count)
            .into_iter()
            .enumerate()
        {
            if !used {
                report(format!("vertex {} is referenced by no face", v));
            }
        }
    }

    if let Some(adj) = adjacency {
        if options.asymmetric_adjacency {
            for f in 0..face_count {
                for e in 0..3 {
                    let Some(g) = adj[3 * f + e].as_used() else {
                        continue;
                    };
                    if g >= face_count || g == f {
                        continue; // already reported structurally
                    }
                    let reciprocated = (0..3).any(|k| adj[3 * g + k].as_used() == Some(f));
                    if !reciprocated {
                        report(format!(
                            "face {} edge {} names neighbor {}, which does not point back",
                            f, e, g
                        ));
                    }
                }
            }
        }

        if options.backfacing {
            for f in 0..face_count {
                let tri = face(indices, f);
                if is_unused_face(tri) {
                    continue;
                }
                for e in 0..3 {
                    let Some(g) = adj[3 * f + e].as_used() else {
                        continue;
                    };
                    if g <= f || g >= face_count {
                        continue; // each pair reported once
                    }
                    if (0..e).any(|k| adj[3 * f + k].as_used() == Some(g)) {
                        continue; // pair already seen across an earlier edge
                    }
                    let other = face(indices, g);
                    if is_unused_face(other) {
                        continue;
                    }
                    if same_vertex_set(tri, other) {
                        report(format!(
                            "faces {} and {} are backfacing duplicates sharing the same vertices",
                            f, g
                        ));
                    }
                }
            }
        }

        if options.bowties {
            let stars = VertexStars::build(indices, vertex_count);
            for v in 0..vertex_count {
                let groups = fan_groups(&stars, indices, adj, v);
                if groups.len() > 1 {
                    report(format!(
                        "vertex {} is a bowtie shared by {} disconnected face fans",
                        v,
                        groups.len()
                    ));
                }
            }
        }
    }

    if failures > 0 {
        Err(MeshError::Validation { failures })
    } else {
        Ok(())
    }
}

/// Whether two faces use the same three vertices, in any order.
fn same_vertex_set<I: MeshIndex>(a: [I; 3], b: [I; 3]) -> bool {
    let mut a = a;
    let mut b = b;
    a.sort_unstable();
    b.sort_unstable();
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::convert_point_reps_to_adjacency;

    fn adjacency_of(indices: &[u32], vertex_count: usize) -> Vec<u32> {
        convert_point_reps_to_adjacency(indices, vertex_count, None).unwrap()
    }

    #[test]
    fn test_default_accepts_quad() {
        let indices: Vec<u32> = vec![0, 1, 2, 1, 3, 2];
        let adjacency = adjacency_of(&indices, 4);
        let options = ValidateOptions::default();
        assert!(validate(&indices, 4, Some(&adjacency), &options, None).is_ok());
    }

    #[test]
    fn test_out_of_range_always_fails() {
        let indices: Vec<u32> = vec![0, 1, 7];
        let mut messages = Vec::new();
        let err = validate(
            &indices,
            3,
            None,
            &ValidateOptions::default(),
            Some(&mut messages),
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::Validation { failures: 1 }));
        assert!(messages[0].contains("vertex 7"));
    }

    #[test]
    fn test_partial_sentinel_flagged() {
        let indices: Vec<u32> = vec![0, u32::MAX, 2];
        let err = validate(&indices, 3, None, &ValidateOptions::default(), None).unwrap_err();
        assert!(matches!(err, MeshError::Validation { failures: 1 }));
    }

    #[test]
    fn test_degenerate_flag() {
        let indices: Vec<u32> = vec![0, 1, 2, 3, 3, 2];
        assert!(validate(&indices, 4, None, &ValidateOptions::default(), None).is_ok());
        let err =
            validate(&indices, 4, None, &ValidateOptions::default().degenerate(), None)
                .unwrap_err();
        assert!(matches!(err, MeshError::Validation { failures: 1 }));
    }

    #[test]
    fn test_unused_vertex_flag() {
        let indices: Vec<u32> = vec![0, 1, 2];
        assert!(validate(&indices, 5, None, &ValidateOptions::default(), None).is_ok());
        let mut messages = Vec::new();
        let err = validate(
            &indices,
            5,
            None,
            &ValidateOptions::default().unused(),
            Some(&mut messages),
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::Validation { failures: 2 }));
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn test_bowtie_flag() {
        // Two triangles meeting only at vertex 2.
        let indices: Vec<u32> = vec![0, 1, 2, 2, 3, 4];
        let adjacency = adjacency_of(&indices, 5);
        assert!(validate(
            &indices,
            5,
            Some(&adjacency),
            &ValidateOptions::default(),
            None
        )
        .is_ok());
        let err = validate(
            &indices,
            5,
            Some(&adjacency),
            &ValidateOptions::default().bowties(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::Validation { failures: 1 }));
    }

    #[test]
    fn test_bowtie_check_requires_adjacency() {
        let indices: Vec<u32> = vec![0, 1, 2];
        let err = validate(&indices, 3, None, &ValidateOptions::default().bowties(), None)
            .unwrap_err();
        assert!(matches!(err, MeshError::InvalidParameter { .. }));
    }

    #[test]
    fn test_backfacing_flag() {
        // The same triangle twice, wound oppositely: coincident back-to-back
        // pair, connected through adjacency.
        let indices: Vec<u32> = vec![0, 1, 2, 2, 1, 0];
        let adjacency = adjacency_of(&indices, 3);
        assert!(adjacency[..3].iter().any(|&g| g == 1));

        assert!(validate(
            &indices,
            3,
            Some(&adjacency),
            &ValidateOptions::default(),
            None
        )
        .is_ok());
        let mut messages = Vec::new();
        let err = validate(
            &indices,
            3,
            Some(&adjacency),
            &ValidateOptions::default().backfacing(),
            Some(&mut messages),
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::Validation { failures: 1 }));
        assert!(messages[0].contains("backfacing"));
    }

    #[test]
    fn test_asymmetric_adjacency_flag() {
        let indices: Vec<u32> = vec![0, 1, 2, 1, 3, 2];
        let mut adjacency = adjacency_of(&indices, 4);
        // Break one direction of the diagonal link.
        adjacency[3 + 1] = u32::MAX;

        assert!(validate(
            &indices,
            4,
            Some(&adjacency),
            &ValidateOptions::default(),
            None
        )
        .is_ok());
        let err = validate(
            &indices,
            4,
            Some(&adjacency),
            &ValidateOptions::default().asymmetric_adjacency(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::Validation { failures: 1 }));
    }

    #[test]
    fn test_messages_accumulate_across_checks() {
        // Degenerate face 1, unused vertex 4, and an out-of-range index on
        // face 2: one call reports all three.
        let indices: Vec<u32> = vec![0, 1, 2, 3, 3, 2, 0, 1, 9];
        let mut messages = Vec::new();
        let err = validate(
            &indices,
            5,
            None,
            &ValidateOptions::default().degenerate().unused(),
            Some(&mut messages),
        )
        .unwrap_err();
        assert!(matches!(err, MeshError::Validation { failures: 3 }));
        assert_eq!(messages.len(), 3);
    }
}
