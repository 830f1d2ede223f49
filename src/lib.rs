//! # model-refine
//!
//! Graph-transformation core for a model-compilation framework.
//!
//! A *model* is a typed dataflow graph: nodes represent computations and
//! typed ports represent the data flowing between them. This crate provides
//! the entity model for such graphs and a transformation engine that clones
//! them and iteratively rewrites ("refines") them until every node satisfies
//! a target-specific compilability predicate, or a refinement budget is
//! exhausted.
//!
//! ## Features
//!
//! - **Typed ports**: element-counted, value-typed outputs; inputs assembled
//!   from slices of one or more upstream outputs
//! - **Polymorphic nodes**: node kinds implement copy/refine behaviors; the
//!   engine never needs concrete types
//! - **Identity-preserving rewriting**: every old port maps to its new-graph
//!   counterpart, queryable after the transformation
//! - **Bounded fixpoint refinement**: iterates to compilability, converting
//!   non-termination into a diagnosable failure
//!
//! ## Example
//!
//! ```ignore
//! use model_refine::prelude::*;
//!
//! let mut model = Model::new();
//! let source = model.add_node(InputNode::new(ValueType::Real, 4))?;
//! let elements = model.output_elements(source, 0)?;
//! let sink = model.add_node(OutputNode::new(elements))?;
//!
//! let context = TransformContext::with_predicate(|node| node.kind() != "concat");
//! let mut transformer = ModelTransformer::new();
//! let refined = transformer.refine_model(&model, &context)?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod model;
pub mod node;
pub mod nodes;
pub mod port;
pub mod transform;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use model_refine::prelude::*`
pub mod prelude {
    pub use crate::error::{ModelResult, TransformError};
    pub use crate::model::{Model, ModelId};
    pub use crate::node::{Node, NodeBase, NodeId, NodeRef};
    pub use crate::nodes::{ConcatNode, InputNode, OutputNode, PassthroughNode};
    pub use crate::port::{
        InputPort, OutputPort, OutputPortRef, PortDirection, PortElements, PortRange, PortRef,
        ValueType,
    };
    pub use crate::transform::{
        ModelTransformer, RefineStats, TransformContext, DEFAULT_MAX_REFINEMENT_ITERATIONS,
    };
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{ModelResult, TransformError};
pub use model::Model;
pub use node::Node;
pub use transform::{ModelTransformer, TransformContext};

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
