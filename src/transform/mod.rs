//! Model transformation module
//!
//! This module provides the copy/refine protocol operating over arbitrary
//! node implementations:
//!
//! - [`ModelTransformer`]: the transformation engine
//! - [`TransformContext`]: per-transformation policy (compilability
//!   predicate, iteration cap)
//! - [`RefineStats`]: statistics from a refine run
//!
//! # Overview
//!
//! A caller owns a source [`Model`](crate::model::Model) and asks a fresh
//! transformer to copy or refine it. The transformer never mutates the
//! source; it builds a new model and keeps a correspondence map from old
//! port identities to new ones, so callers holding old-graph references can
//! find their counterparts afterwards.
//!
//! # Example
//!
//! ```ignore
//! use model_refine::prelude::*;
//!
//! let context = TransformContext::with_predicate(|node| node.kind() != "concat");
//! let mut transformer = ModelTransformer::new();
//!
//! let refined = transformer.refine_model(&model, &context)?;
//! assert!(transformer.is_model_compilable());
//!
//! // Map an old output into the refined model.
//! let new_port = transformer.corresponding_output_port(old_port);
//! ```

pub mod context;
pub mod transformer;

pub use context::{
    CompilabilityPredicate, TransformContext, DEFAULT_MAX_REFINEMENT_ITERATIONS,
};
pub use transformer::{ModelTransformer, RefineStats};
