//! Tangent frame computation.
//!
//! Per-vertex tangents and bitangents are accumulated from each face's
//! UV-space Jacobian relative to its position-space triangle, then
//! orthonormalized against the supplied vertex normal (Gram-Schmidt). The
//! four-component form packs the handedness sign into `.w`, such that
//! `bitangent = cross(normal, tangent) * w`.
//!
//! Degenerate UV configurations — zero U-delta, zero V-delta, entirely zero
//! UVs — still produce a finite, unit-length frame: the accumulation bias
//! keeps the per-face contribution finite, and vertices whose accumulated
//! tangent collapses fall back to a frame derived from the coordinate axis
//! least aligned with the normal. The result is never NaN and never zero.

use nalgebra::{Point3, Vector2, Vector3, Vector4};

use crate::error::{MeshError, Result};
use crate::mesh::{
    check_index_buffer, check_indices_in_range, face, is_degenerate_face, used_faces, MeshIndex,
};

/// Per-vertex tangents and bitangents, parallel to the vertex buffer.
#[derive(Debug, Clone)]
pub struct TangentFrame {
    /// Unit tangents, orthogonal to the supplied normals.
    pub tangents: Vec<Vector3<f32>>,
    /// Unit bitangents, orthogonal to both normal and tangent.
    pub bitangents: Vec<Vector3<f32>>,
}

/// UV-determinant threshold below which a face's Jacobian is treated as
/// degenerate and the unscaled direction is used instead.
const UV_DET_EPSILON: f32 = 1e-7;

/// Raw accumulated (unorthonormalized) tangent directions.
struct Accumulated {
    tangents: Vec<Vector3<f32>>,
    bitangents: Vec<Vector3<f32>>,
}

fn accumulate<I: MeshIndex>(
    indices: &[I],
    positions: &[Point3<f32>],
    texcoords: &[Vector2<f32>],
) -> Accumulated {
    let vertex_count = positions.len();
    let mut acc = Accumulated {
        tangents: vec![Vector3::zeros(); vertex_count],
        bitangents: vec![Vector3::zeros(); vertex_count],
    };

    for (_, tri) in used_faces(indices) {
        if is_degenerate_face(tri) {
            continue;
        }
        let v = [tri[0].to_usize(), tri[1].to_usize(), tri[2].to_usize()];
        let e0 = positions[v[1]] - positions[v[0]];
        let e1 = positions[v[2]] - positions[v[0]];
        let duv0 = texcoords[v[1]] - texcoords[v[0]];
        let duv1 = texcoords[v[2]] - texcoords[v[0]];

        let det = duv0.x * duv1.y - duv1.x * duv0.y;
        let r = if det.abs() <= UV_DET_EPSILON {
            1.0
        } else {
            1.0 / det
        };

        let tangent = (e0 * duv1.y - e1 * duv0.y) * r;
        let bitangent = (e1 * duv0.x - e0 * duv1.x) * r;
        if !(tangent.iter().all(|c| c.is_finite())
            && bitangent.iter().all(|c| c.is_finite()))
        {
            continue;
        }

        for &vi in &v {
            acc.tangents[vi] += tangent;
            acc.bitangents[vi] += bitangent;
        }
    }

    acc
}

/// The unit coordinate axis least aligned with `n`.
fn least_aligned_axis(n: &Vector3<f32>) -> Vector3<f32> {
    let ax = n.x.abs();
    let ay = n.y.abs();
    let az = n.z.abs();
    if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    }
}

/// Project `v` into the plane orthogonal to unit `n` and normalize, falling
/// back to an axis-derived direction when the projection collapses.
fn orthonormalize(n: &Vector3<f32>, v: &Vector3<f32>) -> Vector3<f32> {
    let projected = v - n * n.dot(v);
    let len_sq = projected.norm_squared();
    if len_sq.is_finite() && len_sq > 1e-12 {
        return projected / len_sq.sqrt();
    }
    let axis = least_aligned_axis(n);
    let fallback = axis - n * n.dot(&axis);
    fallback.normalize()
}

/// One vertex's finished frame: unit tangent, unit bitangent, handedness.
fn finish_vertex(
    normal: &Vector3<f32>,
    raw_tangent: &Vector3<f32>,
    raw_bitangent: &Vector3<f32>,
) -> (Vector3<f32>, Vector3<f32>, f32) {
    // A zero or non-finite normal still needs a usable frame; substitute +Z.
    let n_len = normal.norm_squared();
    let n = if n_len.is_finite() && n_len > 1e-12 {
        normal / n_len.sqrt()
    } else {
        Vector3::z()
    };

    let tangent = orthonormalize(&n, raw_tangent);
    let reference = n.cross(&tangent);
    let w = if reference.dot(raw_bitangent) < 0.0 {
        -1.0
    } else {
        1.0
    };
    (tangent, reference * w, w)
}

fn check_frame_inputs<I: MeshIndex>(
    indices: &[I],
    positions: &[Point3<f32>],
    normals: &[Vector3<f32>],
    texcoords: &[Vector2<f32>],
) -> Result<()> {
    check_index_buffer::<I>(indices, positions.len())?;
    check_indices_in_range(indices, positions.len())?;
    if normals.len() != positions.len() {
        return Err(MeshError::BufferSize {
            name: "normals",
            expected: positions.len(),
            actual: normals.len(),
        });
    }
    if texcoords.len() != positions.len() {
        return Err(MeshError::BufferSize {
            name: "texcoords",
            expected: positions.len(),
            actual: texcoords.len(),
        });
    }
    Ok(())
}

/// Compute per-vertex tangents and bitangents.
///
/// `normals` must parallel `positions`; each output frame is
/// orthonormalized against the corresponding normal. Every output vector is
/// finite and unit-length, including for vertices with degenerate UVs.
///
/// # Example
/// ```
/// use meshprep::algo::compute_tangent_frame;
/// use nalgebra::{Point3, Vector2, Vector3};
///
/// let positions = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.0, 1.0, 0.0),
/// ];
/// let normals = vec![Vector3::new(0.0, 0.0, 1.0); 3];
/// let texcoords = vec![
///     Vector2::new(0.0, 0.0),
///     Vector2::new(1.0, 0.0),
///     Vector2::new(0.0, 1.0),
/// ];
/// let indices: Vec<u32> = vec![0, 1, 2];
///
/// let frame = compute_tangent_frame(&indices, &positions, &normals, &texcoords).unwrap();
/// // U increases along +X, so the tangent points along +X.
/// assert!((frame.tangents[0] - Vector3::new(1.0, 0.0, 0.0)).norm() < 1e-5);
/// ```
pub fn compute_tangent_frame<I: MeshIndex>(
    indices: &[I],
    positions: &[Point3<f32>],
    normals: &[Vector3<f32>],
    texcoords: &[Vector2<f32>],
) -> Result<TangentFrame> {
    check_frame_inputs(indices, positions, normals, texcoords)?;
    let acc = accumulate(indices, positions, texcoords);

    let mut frame = TangentFrame {
        tangents: Vec::with_capacity(positions.len()),
        bitangents: Vec::with_capacity(positions.len()),
    };
    for v in 0..positions.len() {
        let (t, b, _) = finish_vertex(&normals[v], &acc.tangents[v], &acc.bitangents[v]);
        frame.tangents.push(t);
        frame.bitangents.push(b);
    }
    Ok(frame)
}

/// Compute per-vertex tangents with handedness packed in `.w`.
///
/// The bitangent is reconstructed as `cross(normal, tangent.xyz) * w`.
pub fn compute_tangent_frame4<I: MeshIndex>(
    indices: &[I],
    positions: &[Point3<f32>],
    normals: &[Vector3<f32>],
    texcoords: &[Vector2<f32>],
) -> Result<Vec<Vector4<f32>>> {
    check_frame_inputs(indices, positions, normals, texcoords)?;
    let acc = accumulate(indices, positions, texcoords);

    let mut out = Vec::with_capacity(positions.len());
    for v in 0..positions.len() {
        let (t, _, w) = finish_vertex(&normals[v], &acc.tangents[v], &acc.bitangents[v]);
        out.push(Vector4::new(t.x, t.y, t.z, w));
    }
    Ok(out)
}
