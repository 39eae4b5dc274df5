//! Core index-buffer types and helpers.
//!
//! Meshes in this crate are plain indexed triangle lists: a caller-owned
//! index buffer of `3 * face_count` entries grouped in consecutive triples,
//! plus parallel per-vertex attribute arrays (positions, normals, UVs).
//! There is no retained mesh object; every operation is a pure function over
//! these buffers.
//!
//! # Index widths and the unused sentinel
//!
//! Index buffers are generic over [`MeshIndex`], implemented for `u16` and
//! `u32`. Each width reserves its maximum value as the *unused* sentinel: a
//! face containing it is absent and participates in no topology, an adjacency
//! entry holding it is a boundary edge, and a remap entry holding it is a
//! discarded slot.
//!
//! ```
//! use meshprep::mesh::{face, is_unused_face};
//!
//! let indices: Vec<u32> = vec![0, 1, 2, u32::MAX, u32::MAX, u32::MAX];
//! assert!(!is_unused_face(face(&indices, 0)));
//! assert!(is_unused_face(face(&indices, 1)));
//! ```

mod buffers;
mod index;

pub use buffers::{
    check_index_buffer, check_indices_in_range, face, is_degenerate_face, is_unused_face,
    referenced_vertices, used_faces,
};
pub use index::MeshIndex;
