//! Error types for meshprep.
//!
//! This module defines all error types used throughout the library.

use thiserror::Error;

/// Result type alias using [`MeshError`].
pub type Result<T> = std::result::Result<T, MeshError>;

/// Errors that can occur during mesh processing.
#[derive(Error, Debug)]
pub enum MeshError {
    /// The mesh has no faces, or every face is marked unused.
    #[error("mesh has no usable faces")]
    EmptyMesh,

    /// Invalid parameter value.
    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value (as string).
        value: String,
        /// Reason the value is invalid.
        reason: &'static str,
    },

    /// A buffer has the wrong length for the declared mesh dimensions.
    #[error("buffer {name} has length {actual}, expected {expected}")]
    BufferSize {
        /// Buffer name.
        name: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        actual: usize,
    },

    /// Face or vertex count arithmetic would overflow the index width.
    #[error("arithmetic overflow: {what}")]
    ArithmeticOverflow {
        /// Description of the overflowing quantity.
        what: &'static str,
    },

    /// An index in the buffer exceeds the declared vertex count.
    #[error("face {face} references vertex {index}, but only {limit} vertices were declared")]
    IndexOutOfRange {
        /// The face containing the bad index.
        face: usize,
        /// The out-of-range index value.
        index: usize,
        /// The declared vertex count.
        limit: usize,
    },

    /// Validation found one or more topology violations.
    #[error("mesh validation failed with {failures} problem(s)")]
    Validation {
        /// Number of violations found.
        failures: usize,
    },

    /// A face or vertex remap is not a bijection over its used domain.
    #[error("invalid {kind} remap: {detail}")]
    InvalidRemap {
        /// Which remap kind ("face" or "vertex").
        kind: &'static str,
        /// Description of the defect.
        detail: String,
    },

    /// The mesh has too few vertices for its index buffer to be valid.
    #[error("mesh has {vertices} vertices but requires at least {required}")]
    TooFewVertices {
        /// Declared vertex count.
        vertices: usize,
        /// Minimum required.
        required: usize,
    },
}

impl MeshError {
    /// Create an invalid parameter error.
    pub fn invalid_param<T: std::fmt::Display>(
        name: &'static str,
        value: T,
        reason: &'static str,
    ) -> Self {
        MeshError::InvalidParameter {
            name,
            value: value.to_string(),
            reason,
        }
    }
}
