//! Mesh processing algorithms.
//!
//! This module contains the processing passes that run between loading a
//! raw indexed triangle mesh and handing finalized buffers to the GPU:
//!
//! - **Validation**: [`validate`] — structural and topological checks with
//!   aggregated diagnostics
//! - **Cleaning**: [`clean`] — bowtie, backfacing-duplicate, and
//!   attribute-boundary repair by vertex duplication
//! - **Welding**: [`weld_vertices`] — collapse positionally-coincident
//!   vertices onto their representatives
//! - **Differential geometry**: [`compute_normals`],
//!   [`compute_tangent_frame`] — per-vertex normals and tangent frames
//! - **Cache optimization**: the [`optimize`] module — face and vertex
//!   reordering, remap application, attribute sorting
//! - **Concatenation**: [`concatenate_mesh`] — destination offsets for
//!   merging meshes

pub mod clean;
pub mod concat;
pub mod normals;
pub mod optimize;
pub mod tangents;
pub mod validate;
pub mod weld;

pub use clean::clean;
pub use concat::{concatenate_mesh, ConcatTotals};
pub use normals::{compute_normals, NormalOptions, NormalWeight};
pub use tangents::{compute_tangent_frame, compute_tangent_frame4, TangentFrame};
pub use validate::{validate, ValidateOptions};
pub use weld::weld_vertices;
