//! Topology derivation: point representatives and triangle adjacency.
//!
//! Everything downstream of raw index buffers starts here. The two derived
//! arrays are:
//!
//! - **Point representatives** ([`generate_point_reps`]): for every vertex,
//!   the canonical (lowest) index among all vertices at the same position
//!   within a tolerance. See [`point representatives`](generate_point_reps).
//! - **Triangle adjacency** ([`generate_adjacency_and_point_reps`],
//!   [`convert_point_reps_to_adjacency`]): for every face edge, the face
//!   across it, matched through representatives so seams of duplicated
//!   vertices still connect.
//!
//! [`generate_gs_adjacency`] additionally expands an index buffer into the
//! 6-index-per-face layout consumed by adjacency-aware geometry processing.

mod adjacency;
mod point_reps;
pub(crate) mod star;

pub use adjacency::{
    convert_point_reps_to_adjacency, generate_adjacency, generate_adjacency_and_point_reps,
    generate_gs_adjacency,
};
pub use point_reps::generate_point_reps;
