//! Model: the owned collection of nodes forming a dataflow graph
//!
//! A [`Model`] owns its nodes behind type-erased handles and preserves
//! insertion order. Because a node's inputs may only reference ports of
//! nodes already present at insertion time, the reference graph is acyclic
//! by construction and insertion order is one valid dependency order; the
//! canonical dependency-respecting traversal used by computation and
//! transformation is [`Model::dependency_order`].
//!
//! Every model carries a unique epoch ([`ModelId`]) stamped into all node
//! and port handles it issues, so a handle presented to the wrong model is
//! rejected instead of silently resolving to an unrelated node.
//!
//! # Example
//!
//! ```ignore
//! use model_refine::prelude::*;
//!
//! let mut model = Model::new();
//! let source = model.add_node(InputNode::new(ValueType::Real, 4))?;
//! let elements = model.output_elements(source, 0)?;
//! let sink = model.add_node(OutputNode::new(elements.slice(0, 2)?))?;
//! assert_eq!(model.len(), 2);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::error::{ModelResult, TransformError};
use crate::node::{Node, NodeId, NodeRef};
use crate::port::{InputPort, OutputPort, OutputPortRef, PortElements};

/// Per-model epoch identifier
///
/// Drawn from a process-wide counter; two models never share an epoch, so a
/// stale or cross-model handle is detectable in O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        ModelId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// The owned collection of nodes forming a dataflow graph
#[derive(Debug)]
pub struct Model {
    id: ModelId,
    nodes: IndexMap<NodeId, Box<dyn Node>>,
    next_node: u32,
}

impl Model {
    /// Create an empty model with a fresh epoch
    pub fn new() -> Self {
        Self {
            id: ModelId::next(),
            nodes: IndexMap::new(),
            next_node: 0,
        }
    }

    /// This model's epoch
    pub fn id(&self) -> ModelId {
        self.id
    }

    /// Number of nodes in the model
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the model contains no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // ========================================================================
    // Node insertion
    // ========================================================================

    /// Insert a node, binding its identity and validating its inputs
    ///
    /// Every input must reference output ports of nodes already present in
    /// this model, with agreeing value types, in-bounds element ranges, and
    /// a total element count equal to the input's declared count. Since the
    /// node being inserted cannot be referenced yet, cycles cannot form.
    pub fn add_node<N: Node + 'static>(&mut self, mut node: N) -> ModelResult<NodeRef> {
        for input in node.base().inputs() {
            self.validate_input(input)?;
        }

        let id = NodeId(self.next_node);
        let node_ref = NodeRef::new(self.id, id);
        node.base_mut().bind(node_ref);
        self.next_node += 1;
        self.nodes.insert(id, Box::new(node));

        Ok(node_ref)
    }

    fn validate_input(&self, input: &InputPort) -> ModelResult<()> {
        let elements = input.elements();

        if elements.value_type() != input.value_type() {
            return Err(TransformError::TypeMismatch(format!(
                "input declares {} but references {} elements",
                input.value_type(),
                elements.value_type()
            )));
        }
        if elements.size() != input.size() {
            return Err(TransformError::SizeMismatch(format!(
                "input declares {} elements but references {}",
                input.size(),
                elements.size()
            )));
        }

        for range in elements.ranges() {
            let port_ref = range.port();
            if port_ref.node().model() != self.id {
                return Err(TransformError::InvalidPortReference(format!(
                    "{} belongs to model {}, not {}",
                    port_ref,
                    port_ref.node().model(),
                    self.id
                )));
            }

            let node = self.nodes.get(&port_ref.node().node()).ok_or_else(|| {
                TransformError::InvalidPortReference(format!(
                    "{} references a node not present in the model",
                    port_ref
                ))
            })?;

            let output = node.outputs().get(port_ref.port()).ok_or_else(|| {
                TransformError::InvalidPortReference(format!(
                    "{} has no output port {}",
                    node.name(),
                    port_ref.port()
                ))
            })?;

            if output.value_type() != elements.value_type() {
                return Err(TransformError::TypeMismatch(format!(
                    "{} produces {} but the reference expects {}",
                    port_ref,
                    output.value_type(),
                    elements.value_type()
                )));
            }
            if range.start() + range.count() > output.size() {
                return Err(TransformError::InvalidPortReference(format!(
                    "range [{}..{}) exceeds the {} elements of {}",
                    range.start(),
                    range.start() + range.count(),
                    output.size(),
                    port_ref
                )));
            }
        }

        Ok(())
    }

    // ========================================================================
    // Node accessors
    // ========================================================================

    /// Get a node by id
    pub fn get(&self, id: NodeId) -> Option<&dyn Node> {
        self.nodes.get(&id).map(|node| node.as_ref())
    }

    /// Get a node by handle, rejecting handles from other models
    pub fn get_ref(&self, node_ref: NodeRef) -> Option<&dyn Node> {
        if node_ref.model() != self.id {
            return None;
        }
        self.get(node_ref.node())
    }

    /// Iterate over node ids in insertion order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    /// Iterate over nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &dyn Node> {
        self.nodes.values().map(|node| node.as_ref())
    }

    // ========================================================================
    // Port accessors
    // ========================================================================

    /// Look up the output port addressed by `port_ref`
    pub fn output_port(&self, port_ref: OutputPortRef) -> Option<OutputPort> {
        self.get_ref(port_ref.node())?
            .outputs()
            .get(port_ref.port())
            .copied()
    }

    /// Build an element reference covering the whole `port`-th output of `node`
    ///
    /// The value type and element count are resolved from the model.
    pub fn output_elements(&self, node: NodeRef, port: usize) -> ModelResult<PortElements> {
        let port_ref = OutputPortRef::new(node, port);
        let output = self.output_port(port_ref).ok_or_else(|| {
            TransformError::InvalidPortReference(format!("{} does not resolve in this model", port_ref))
        })?;

        PortElements::range(output.value_type(), port_ref, 0, output.size())
    }

    // ========================================================================
    // Traversal
    // ========================================================================

    /// Node ids in dependency-respecting order
    ///
    /// Every node appears after all nodes whose output ports it references.
    /// Computed by a depth-first walk over input references; stable across
    /// calls for an unchanged model.
    pub fn dependency_order(&self) -> Vec<NodeId> {
        let mut visited = FxHashSet::default();
        let mut order = Vec::with_capacity(self.nodes.len());

        for &id in self.nodes.keys() {
            self.visit_dependencies(id, &mut visited, &mut order);
        }

        order
    }

    fn visit_dependencies(
        &self,
        id: NodeId,
        visited: &mut FxHashSet<NodeId>,
        order: &mut Vec<NodeId>,
    ) {
        if !visited.insert(id) {
            return;
        }

        if let Some(node) = self.get(id) {
            for input in node.inputs() {
                for range in input.elements().ranges() {
                    self.visit_dependencies(range.port().node().node(), visited, order);
                }
            }
        }

        order.push(id);
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}
