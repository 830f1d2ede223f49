//! Minimal concrete node catalog
//!
//! The transformation engine is agnostic to node kinds; this module ships
//! the small structural catalog needed to author models and exercise the
//! copy/refine protocol:
//!
//! - [`InputNode`]: a source producing a declared number of elements
//! - [`OutputNode`]: a sink mirroring an arbitrary element reference
//! - [`PassthroughNode`]: identity wiring over one element reference
//! - [`ConcatNode`]: concatenation of several element references; its
//!   refine behavior demonstrates structural decomposition
//!
//! None of these nodes define numeric semantics; they exist to shape graphs.

/// Concatenating node
pub mod concat;
/// Model entry points
pub mod input_node;
/// Model exit points
pub mod output_node;
/// Identity wiring
pub mod passthrough;

pub use concat::ConcatNode;
pub use input_node::InputNode;
pub use output_node::OutputNode;
pub use passthrough::PassthroughNode;
