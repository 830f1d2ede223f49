//! Error types for model-refine
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Main error type for model transformation operations
#[derive(Error, Debug)]
pub enum TransformError {
    /// An old-graph port was queried for translation before its producer was
    /// visited. Indicates a broken dependency-order guarantee or a reference
    /// to a port outside the source model.
    #[error("no correspondence registered for {0}: dependency order violated or port not part of the source model")]
    MissingPortMapping(String),

    /// A node's refine behavior failed to map one or more of its original
    /// output ports
    #[error("node {0} did not map all of its output ports during transformation")]
    IncompleteOutputMapping(String),

    /// The fixpoint loop failed to reach a compilable model within the
    /// iteration cap
    #[error("refinement budget exceeded after {iterations} iterations: node {node} is still not compilable")]
    RefinementBudgetExceeded {
        /// Name of one node that still fails the compilability predicate
        node: String,
        /// Number of refinement iterations performed
        iterations: usize,
    },

    /// A port reference does not resolve inside the model it was presented to
    #[error("invalid port reference: {0}")]
    InvalidPortReference(String),

    /// Value types disagree where they are required to match
    #[error("value type mismatch: {0}")]
    TypeMismatch(String),

    /// Element counts disagree where they are required to match
    #[error("element count mismatch: {0}")]
    SizeMismatch(String),

    /// A port elements reference selects zero elements
    #[error("port elements must reference at least one element")]
    EmptyElements,

    /// Invalid node configuration
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// Generic internal error
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for model transformation operations
pub type ModelResult<T> = Result<T, TransformError>;
