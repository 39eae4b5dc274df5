//! Point representative derivation.
//!
//! A *point representative* is the canonical vertex index for a cluster of
//! positionally-coincident vertices. Meshes authored for rendering routinely
//! carry several copies of the same position (one per normal or UV seam);
//! topological operations need to see those copies as one point. The
//! representative of every vertex in a coincidence class is the lowest
//! original index in the class, representatives are their own
//! representatives, and vertices referenced by no used face map to
//! themselves.

use ahash::AHashMap;
use nalgebra::Point3;

use crate::error::{MeshError, Result};
use crate::mesh::{check_index_buffer, check_indices_in_range, referenced_vertices, MeshIndex};

/// Quantize one coordinate to a grid cell, saturating on non-finite input.
#[inline]
fn floor_cell(x: f32, inv_cell: f32) -> i64 {
    let scaled = x as f64 * inv_cell as f64;
    if !scaled.is_finite() {
        return if scaled.is_sign_positive() {
            i64::MAX
        } else {
            i64::MIN
        };
    }
    scaled.floor() as i64
}

#[inline]
fn cell_key(p: &Point3<f32>, inv_cell: f32) -> (i64, i64, i64) {
    (
        floor_cell(p.x, inv_cell),
        floor_cell(p.y, inv_cell),
        floor_cell(p.z, inv_cell),
    )
}

/// Bit-exact position key. Collapses -0.0 onto +0.0 so exact matching agrees
/// with floating-point equality.
#[inline]
fn exact_key(p: &Point3<f32>) -> (u32, u32, u32) {
    #[inline]
    fn bits(x: f32) -> u32 {
        if x == 0.0 {
            0.0f32.to_bits()
        } else {
            x.to_bits()
        }
    }
    (bits(p.x), bits(p.y), bits(p.z))
}

/// Compute point representatives for every vertex.
///
/// Vertices whose positions coincide within `epsilon` (Euclidean distance)
/// share one representative: the lowest original index among them.
/// `epsilon == 0.0` requires exact floating-point equality. Vertices not
/// referenced by any used face always map to themselves.
///
/// # Example
/// ```
/// use meshprep::topology::generate_point_reps;
/// use nalgebra::Point3;
///
/// // Two triangles meeting along a seam of duplicated positions.
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0), // duplicate of vertex 1
///     Point3::new(0.0, 1.0, 0.0), // duplicate of vertex 2
///     Point3::new(1.0, 1.0, 0.0),
/// ];
/// let indices: Vec<u32> = vec![0, 1, 2, 3, 5, 4];
///
/// let reps = generate_point_reps(&indices, &positions, 0.0).unwrap();
/// assert_eq!(reps, vec![0, 1, 2, 1, 2, 5]);
/// ```
pub fn generate_point_reps<I: MeshIndex>(
    indices: &[I],
    positions: &[Point3<f32>],
    epsilon: f32,
) -> Result<Vec<I>> {
    check_index_buffer::<I>(indices, positions.len())?;
    check_indices_in_range(indices, positions.len())?;
    if !epsilon.is_finite() || epsilon < 0.0 {
        return Err(MeshError::invalid_param(
            "epsilon",
            epsilon,
            "must be finite and non-negative",
        ));
    }

    let vertex_count = positions.len();
    let referenced = referenced_vertices(indices, vertex_count);
    let mut reps: Vec<I> = (0..vertex_count).map(I::from_usize).collect();

    if epsilon == 0.0 {
        // Exact matching: hash the raw coordinate bits. The first vertex seen
        // at a position (lowest index, since we scan ascending) becomes the
        // representative for every later copy.
        let mut first_at: AHashMap<(u32, u32, u32), usize> =
            AHashMap::with_capacity(vertex_count);
        for v in 0..vertex_count {
            if !referenced[v] {
                continue;
            }
            let rep = *first_at.entry(exact_key(&positions[v])).or_insert(v);
            reps[v] = I::from_usize(rep);
        }
    } else {
        // Tolerance matching: bucket vertices into cells of width epsilon and
        // scan the 27-cell neighborhood, so any pair within epsilon lands in
        // adjacent cells. Among all assigned vertices in range, adopt the
        // lowest representative; scanning ascending keeps the result
        // deterministic and idempotent.
        let inv_cell = 1.0 / epsilon;
        let eps_sq = epsilon as f64 * epsilon as f64;
        let mut cells: AHashMap<(i64, i64, i64), Vec<usize>> = AHashMap::new();

        for v in 0..vertex_count {
            if !referenced[v] {
                continue;
            }
            let p = &positions[v];
            let (cx, cy, cz) = cell_key(p, inv_cell);

            let mut best: Option<usize> = None;
            for dx in -1..=1i64 {
                for dy in -1..=1i64 {
                    for dz in -1..=1i64 {
                        let key = (
                            cx.saturating_add(dx),
                            cy.saturating_add(dy),
                            cz.saturating_add(dz),
                        );
                        let Some(bucket) = cells.get(&key) else {
                            continue;
                        };
                        for &u in bucket {
                            let q = &positions[u];
                            let d = (p.x as f64 - q.x as f64).powi(2)
                                + (p.y as f64 - q.y as f64).powi(2)
                                + (p.z as f64 - q.z as f64).powi(2);
                            if d <= eps_sq {
                                let rep = reps[u].to_usize();
                                if best.map_or(true, |b| rep < b) {
                                    best = Some(rep);
                                }
                            }
                        }
                    }
                }
            }

            if let Some(rep) = best {
                reps[v] = I::from_usize(rep);
            }
            cells.entry((cx, cy, cz)).or_default().push(v);
        }
    }

    Ok(reps)
}
