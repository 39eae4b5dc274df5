//! # Meshprep
//!
//! CPU-side preprocessing for indexed triangle meshes bound for GPU
//! rendering.
//!
//! Meshprep derives topology (triangle adjacency, point representatives),
//! repairs broken topology (bowties, backfacing duplicates, attribute-split
//! boundaries), computes differential-geometry attributes (vertex normals,
//! tangent frames), and reorders faces and vertices for post-transform
//! vertex-cache efficiency. Everything operates on flat caller-owned
//! buffers — there is no retained mesh object, no I/O, and no rendering.
//!
//! ## Features
//!
//! - **Two index widths**: every operation is generic over [`MeshIndex`]
//!   (`u16` and `u32`), with each width's maximum value reserved as the
//!   unused sentinel
//! - **Topology derivation**: spatial-hash point representatives, triangle
//!   adjacency matched across seams of duplicated vertices
//! - **Aggregated validation**: one call reports every topology problem
//! - **Repair by duplication**: bowtie, backfacing, and attribute-boundary
//!   cleaving with a deterministic duplicate list
//! - **Cache optimization**: strip-order and simulated-cache face
//!   reordering, first-use vertex reordering, ACMR/ATVR measurement
//!
//! [`MeshIndex`]: mesh::MeshIndex
//!
//! ## Quick Start
//!
//! ```
//! use meshprep::prelude::*;
//! use nalgebra::Point3;
//!
//! // A quad with a seam of duplicated positions (vertices 3 and 4 copy
//! // 1 and 2).
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//! ];
//! let mut indices: Vec<u32> = vec![0, 1, 2, 3, 5, 4];
//!
//! // Derive connectivity: the seam still connects through representatives.
//! let (reps, mut adjacency) =
//!     generate_adjacency_and_point_reps(&indices, &positions, 0.0).unwrap();
//! assert_eq!(adjacency[0], 1);
//!
//! // Validate, clean, and compute normals.
//! validate(&indices, 6, Some(&adjacency), &ValidateOptions::default(), None).unwrap();
//! let duplicates = clean(&mut indices, 6, Some(&mut adjacency), None, true).unwrap();
//! assert!(duplicates.is_empty());
//! let normals = compute_normals(&indices, &positions, &NormalOptions::default()).unwrap();
//! assert!(normals[0].z > 0.99);
//! ```
//!
//! ## Optimization Pipeline
//!
//! ```
//! use meshprep::prelude::*;
//!
//! # let indices: Vec<u32> = vec![0, 1, 2, 1, 3, 2];
//! # let vertex_count = 4;
//! # let adjacency =
//! #     meshprep::topology::convert_point_reps_to_adjacency(&indices, vertex_count, None)
//! #         .unwrap();
//! // Reorder faces for the vertex cache, then vertices for locality.
//! let face_remap = optimize_faces(&indices, &adjacency, FaceOptimization::default()).unwrap();
//! let (indices, adjacency) =
//!     reorder_ib_and_adjacency(&indices, &adjacency, &face_remap).unwrap();
//! let vertex_remap = optimize_vertices(&indices, vertex_count).unwrap();
//! let indices = finalize_ib(&indices, &vertex_remap).unwrap();
//!
//! let metrics = vertex_cache_miss_rate(&indices, vertex_count, 16).unwrap();
//! assert!(metrics.acmr <= 3.0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;
pub mod topology;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use meshprep::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::optimize::{
        attribute_sort, compute_subsets, finalize_ib, finalize_vb, optimize_faces,
        optimize_faces_ex, optimize_vertices, reorder_ib, reorder_ib_and_adjacency,
        vertex_cache_miss_rate, CacheMetrics, FaceOptimization, Subset,
    };
    pub use crate::algo::{
        clean, compute_normals, compute_tangent_frame, compute_tangent_frame4,
        concatenate_mesh, validate, weld_vertices, ConcatTotals, NormalOptions, NormalWeight,
        TangentFrame, ValidateOptions,
    };
    pub use crate::error::{MeshError, Result};
    pub use crate::mesh::MeshIndex;
    pub use crate::topology::{
        convert_point_reps_to_adjacency, generate_adjacency, generate_adjacency_and_point_reps,
        generate_gs_adjacency, generate_point_reps,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::{Point3, Vector2};

    fn cube() -> (Vec<Point3<f32>>, Vec<u32>) {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(1.0, 0.0, 1.0),
            Point3::new(1.0, 1.0, 1.0),
            Point3::new(0.0, 1.0, 1.0),
        ];
        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2,
            4, 5, 6, 4, 6, 7,
            0, 1, 5, 0, 5, 4,
            3, 6, 2, 3, 7, 6,
            1, 2, 6, 1, 6, 5,
            0, 4, 7, 0, 7, 3,
        ];
        (positions, indices)
    }

    /// The cube end to end: adjacency, validation, cleaning, normals,
    /// tangents, optimization, finalization. A clean convex manifold must
    /// come through with zero duplicates and the exact reference cache
    /// metrics.
    #[test]
    fn test_cube_end_to_end() {
        let (positions, mut indices) = cube();

        let (_, mut adjacency) =
            generate_adjacency_and_point_reps(&indices, &positions, 0.0).unwrap();
        assert!(adjacency.iter().all(|&a| a != u32::MAX));

        let strict = ValidateOptions::all();
        validate(&indices, 8, Some(&adjacency), &strict, None).unwrap();

        let duplicates = clean(&mut indices, 8, Some(&mut adjacency), None, true).unwrap();
        assert!(duplicates.is_empty(), "a clean convex manifold never splits");

        let normals =
            compute_normals(&indices, &positions, &NormalOptions::default()).unwrap();
        assert!(normals.iter().all(|n| (n.norm() - 1.0).abs() < 1e-5));

        // Degenerate UVs must still yield a usable frame.
        let texcoords = vec![Vector2::zeros(); 8];
        let frame =
            compute_tangent_frame(&indices, &positions, &normals, &texcoords).unwrap();
        assert!(frame.tangents.iter().all(|t| (t.norm() - 1.0).abs() < 1e-5));

        let face_remap =
            optimize_faces(&indices, &adjacency, FaceOptimization::default()).unwrap();
        let (indices, _adjacency) =
            reorder_ib_and_adjacency(&indices, &adjacency, &face_remap).unwrap();
        let vertex_remap = optimize_vertices(&indices, 8).unwrap();
        let indices = finalize_ib(&indices, &vertex_remap).unwrap();
        let final_positions =
            finalize_vb(&positions, &duplicates, Some(&vertex_remap)).unwrap();
        assert_eq!(final_positions.len(), 8);

        validate(&indices, 8, None, &ValidateOptions::default(), None).unwrap();

        // With the cache at least as large as the vertex count, every vertex
        // is transformed exactly once no matter the order: the reference
        // figures are exact.
        for cache_size in [12, 16] {
            let metrics = vertex_cache_miss_rate(&indices, 8, cache_size).unwrap();
            assert!((metrics.acmr - 8.0 / 12.0).abs() < 1e-4);
            assert!((metrics.atvr - 1.0).abs() < 1e-4);
        }
    }

    /// The same pipeline is generic over the narrow index width.
    #[test]
    fn test_cube_end_to_end_u16() {
        let (positions, indices) = cube();
        let mut indices: Vec<u16> = indices.into_iter().map(|i| i as u16).collect();

        let (_, mut adjacency) =
            generate_adjacency_and_point_reps(&indices, &positions, 0.0).unwrap();
        let duplicates = clean(&mut indices, 8, Some(&mut adjacency), None, true).unwrap();
        assert!(duplicates.is_empty());

        let face_remap =
            optimize_faces(&indices, &adjacency, FaceOptimization::default()).unwrap();
        let reordered = reorder_ib(&indices, &face_remap).unwrap();
        let metrics = vertex_cache_miss_rate(&reordered, 8, 12).unwrap();
        assert!((metrics.atvr - 1.0).abs() < 1e-4);
    }
}
