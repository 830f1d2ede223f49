//! Nodes: the polymorphic vertices of a model
//!
//! A node owns a fixed set of input and output ports and carries two
//! transformation behaviors consumed by the engine:
//!
//! - [`Node::copy`]: rebuild a self-equivalent node in a destination model,
//!   with all inputs translated to the destination's port identities.
//! - [`Node::refine`]: emit a replacement subgraph instead; defaults to
//!   `copy` for nodes that have no finer-grained decomposition.
//!
//! Node implementors embed a [`NodeBase`] holding the common state (port
//! vectors and the identity assigned at model insertion) and expose it via
//! [`Node::base`]. The engine only ever sees nodes through `Box<dyn Node>`
//! handles owned by a [`Model`](crate::model::Model).
//!
//! # Implementing a node
//!
//! ```ignore
//! use model_refine::prelude::*;
//!
//! #[derive(Debug)]
//! struct Double {
//!     base: NodeBase,
//! }
//!
//! impl Double {
//!     fn new(elements: PortElements) -> Self {
//!         let input = InputPort::from_elements(elements);
//!         let output = OutputPort::new(input.value_type(), input.size());
//!         Self { base: NodeBase::new(vec![input], vec![output]) }
//!     }
//! }
//!
//! impl Node for Double {
//!     fn base(&self) -> &NodeBase { &self.base }
//!     fn base_mut(&mut self) -> &mut NodeBase { &mut self.base }
//!     fn kind(&self) -> &'static str { "double" }
//!
//!     fn copy(&self, transformer: &mut ModelTransformer) -> ModelResult<()> {
//!         let elements = transformer.transform_port_elements(self.inputs()[0].elements())?;
//!         let new_node = transformer.add_node(Double::new(elements))?;
//!         transformer.map_output_port(self.output_ref(0)?, OutputPortRef::new(new_node, 0))
//!     }
//! }
//! ```

use std::fmt;

use crate::error::{ModelResult, TransformError};
use crate::model::ModelId;
use crate::port::{InputPort, OutputPort, OutputPortRef};
use crate::transform::ModelTransformer;

/// Dense per-model node identifier, assigned at insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The numeric index of this id within its model
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle addressing one node of one model
///
/// Carries the owning model's epoch so a reference from another model is
/// detectable without consulting the model itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    model: ModelId,
    node: NodeId,
}

impl NodeRef {
    pub(crate) fn new(model: ModelId, node: NodeId) -> Self {
        Self { model, node }
    }

    /// The owning model's epoch
    pub fn model(&self) -> ModelId {
        self.model
    }

    /// The node id within the owning model
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[cfg(test)]
    pub(crate) fn dangling_for_tests() -> Self {
        Self::new(ModelId::next(), NodeId(0))
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.node)
    }
}

/// Common state embedded in every node implementor
///
/// Holds the input/output port vectors and the identity bound when the node
/// is inserted into a model. A node that has not been inserted yet has no
/// binding; its port references cannot be formed until insertion.
#[derive(Debug)]
pub struct NodeBase {
    binding: Option<NodeRef>,
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
}

impl NodeBase {
    /// Create the base state for a node with the given ports
    pub fn new(inputs: Vec<InputPort>, outputs: Vec<OutputPort>) -> Self {
        Self {
            binding: None,
            inputs,
            outputs,
        }
    }

    /// The identity assigned at model insertion, if any
    pub fn binding(&self) -> Option<NodeRef> {
        self.binding
    }

    pub(crate) fn bind(&mut self, node_ref: NodeRef) {
        self.binding = Some(node_ref);
    }

    /// The node's input ports
    pub fn inputs(&self) -> &[InputPort] {
        &self.inputs
    }

    /// The node's output ports
    pub fn outputs(&self) -> &[OutputPort] {
        &self.outputs
    }
}

/// A polymorphic graph vertex
///
/// The three required methods expose the embedded [`NodeBase`] and the node
/// kind; `copy` and `refine` are the transformation behaviors described in
/// the module documentation. All remaining methods are provided.
pub trait Node: fmt::Debug {
    /// The embedded common state
    fn base(&self) -> &NodeBase;

    /// Mutable access to the embedded common state
    fn base_mut(&mut self) -> &mut NodeBase;

    /// The node-kind name used in diagnostics, e.g. `"concat"`
    fn kind(&self) -> &'static str;

    /// Rebuild a self-equivalent node in the transformer's destination model
    ///
    /// Implementations must translate their inputs with
    /// [`ModelTransformer::transform_port_elements`], insert the replacement
    /// with [`ModelTransformer::add_node`], and register a correspondence for
    /// every original output with [`ModelTransformer::map_output_port`].
    fn copy(&self, transformer: &mut ModelTransformer) -> ModelResult<()>;

    /// Emit a replacement subgraph in the transformer's destination model
    ///
    /// The default behaves exactly like [`Node::copy`]. Overriding nodes may
    /// add any number of nodes, but must still cover the full original
    /// output set with correspondence entries; an uncovered output is a
    /// contract violation detected by the engine.
    fn refine(&self, transformer: &mut ModelTransformer) -> ModelResult<()> {
        self.copy(transformer)
    }

    /// The node's input ports
    fn inputs(&self) -> &[InputPort] {
        self.base().inputs()
    }

    /// The node's output ports
    fn outputs(&self) -> &[OutputPort] {
        self.base().outputs()
    }

    /// The identity assigned at model insertion
    ///
    /// Fails for a node that has not been inserted into a model.
    fn bound_ref(&self) -> ModelResult<NodeRef> {
        self.base().binding().ok_or_else(|| {
            TransformError::InvalidNode(format!("{} node is not bound to a model", self.kind()))
        })
    }

    /// Reference to this node's `index`-th output port
    fn output_ref(&self, index: usize) -> ModelResult<OutputPortRef> {
        if index >= self.outputs().len() {
            return Err(TransformError::InvalidPortReference(format!(
                "{} node has {} outputs, requested index {}",
                self.kind(),
                self.outputs().len(),
                index
            )));
        }
        Ok(OutputPortRef::new(self.bound_ref()?, index))
    }

    /// Display name: the kind plus the bound node id, e.g. `"concat_3"`
    fn name(&self) -> String {
        match self.base().binding() {
            Some(node_ref) => format!("{}_{}", self.kind(), node_ref.node()),
            None => self.kind().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::nodes::InputNode;
    use crate::port::ValueType;

    #[test]
    fn test_unbound_node_has_no_ref() {
        let node = InputNode::new(ValueType::Real, 4);
        assert!(node.bound_ref().is_err());
        assert_eq!(node.name(), "input");
    }

    #[test]
    fn test_bound_node_name_and_refs() {
        let mut model = Model::new();
        let node_ref = model.add_node(InputNode::new(ValueType::Real, 4)).unwrap();

        let node = model.get(node_ref.node()).unwrap();
        assert_eq!(node.bound_ref().unwrap(), node_ref);
        assert_eq!(node.name(), format!("input_{}", node_ref.node()));
        assert_eq!(node.output_ref(0).unwrap(), OutputPortRef::new(node_ref, 0));
        assert!(node.output_ref(1).is_err());
    }
}
