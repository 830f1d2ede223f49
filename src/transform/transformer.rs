//! The model transformation engine
//!
//! [`ModelTransformer`] orchestrates the two transformation operations over a
//! source model: structural cloning ([`ModelTransformer::copy_model`]) and
//! bounded fixpoint refinement ([`ModelTransformer::refine_model`]). During
//! either operation it visits source nodes in dependency order and asks each
//! node to reconstruct itself in the destination model; node implementations
//! call back into the builder API to translate their input references and to
//! register their output-port correspondences.
//!
//! A transformer instance is transient and single-use: construct it, run one
//! copy or refine call, then query the retained correspondence map. Running
//! a second call on the same instance resets all prior state.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::error::{ModelResult, TransformError};
use crate::model::{Model, ModelId};
use crate::node::{Node, NodeRef};
use crate::port::{OutputPortRef, PortDirection, PortElements, PortRange, PortRef};
use crate::transform::context::TransformContext;

/// Statistics from a refine run
#[derive(Debug, Default, Clone, Copy)]
pub struct RefineStats {
    /// Number of refinement passes performed
    pub iterations: usize,
    /// Number of node visits that invoked the refine behavior
    pub nodes_refined: usize,
    /// Number of node visits that invoked the copy behavior
    pub nodes_copied: usize,
}

/// Orchestrates model copying and refinement
///
/// Owns the model under construction and the map from every old port
/// identity encountered to its corresponding new port. The destination
/// model's ownership transfers to the caller when the call returns; the
/// transformer retains only the correspondence map for post-hoc queries.
#[derive(Debug, Default)]
pub struct ModelTransformer {
    dest: Model,
    context: TransformContext,
    /// Epoch of the model a pass is currently reading from; `None` outside
    /// an active pass.
    source_id: Option<ModelId>,
    /// Correspondences registered during the current pass.
    pass_map: FxHashMap<PortRef, PortRef>,
    /// Correspondences from the original source model to the final model,
    /// composed across refinement passes.
    port_map: FxHashMap<PortRef, PortRef>,
    stats: RefineStats,
    is_model_compilable: bool,
}

impl ModelTransformer {
    /// Create a transformer with no retained state
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Transformation operations
    // ========================================================================

    /// Return a structural clone of `model`
    ///
    /// Visits the source in dependency order and invokes each node's copy
    /// behavior, so every node resolves its inputs against already-created
    /// ports. On success the clone is isomorphic to the source and every old
    /// output port has exactly one corresponding new port.
    pub fn copy_model(&mut self, model: &Model, context: &TransformContext) -> ModelResult<Model> {
        self.reset(context);
        debug!(nodes = model.len(), "copying model");

        let new_model = self.run_pass(model, false)?;
        self.port_map = self.pass_map.clone();

        Ok(new_model)
    }

    /// Iteratively refine `model` until it is compilable or the budget runs out
    ///
    /// Each pass visits the current model in dependency order; a node already
    /// satisfying the context's predicate is copied unchanged, any other node
    /// is asked to refine itself into a replacement subgraph. With no
    /// predicate set, exactly one pass runs and every node refines once.
    /// Otherwise passes repeat until all nodes satisfy the predicate; if the
    /// iteration cap is reached first, the call fails naming the first
    /// still-uncompilable node in dependency order.
    pub fn refine_model(&mut self, model: &Model, context: &TransformContext) -> ModelResult<Model> {
        self.reset(context);
        let single_pass = !self.context.has_predicate();
        let max_iterations = self.context.max_refinement_iterations();

        let mut current = self.run_pass(model, true)?;
        self.port_map = self.pass_map.clone();
        self.stats.iterations = 1;

        loop {
            self.is_model_compilable = self.model_is_compilable(&current);
            debug!(
                iteration = self.stats.iterations,
                nodes = current.len(),
                compilable = self.is_model_compilable,
                "refinement pass complete"
            );

            if single_pass || self.is_model_compilable {
                return Ok(current);
            }
            if self.stats.iterations >= max_iterations {
                return Err(TransformError::RefinementBudgetExceeded {
                    node: self.uncompilable_node_name(&current),
                    iterations: self.stats.iterations,
                });
            }

            let next = self.run_pass(&current, true)?;
            self.compose_correspondences();
            self.stats.iterations += 1;
            current = next;
        }
    }

    // ========================================================================
    // Builder API, called by node implementations during an active pass
    // ========================================================================

    /// Create a new node in the destination model
    pub fn add_node<N: Node + 'static>(&mut self, node: N) -> ModelResult<NodeRef> {
        self.ensure_active()?;
        self.dest.add_node(node)
    }

    /// Translate old-graph element references into destination identities
    ///
    /// Substitutes every referenced old port via the correspondence map.
    /// A missing entry means the traversal's dependency guarantee was
    /// violated, or the reference never belonged to the source model; both
    /// are fatal.
    pub fn transform_port_elements(&self, elements: &PortElements) -> ModelResult<PortElements> {
        self.ensure_active()?;

        let mut ranges = SmallVec::new();
        for range in elements.ranges() {
            let key = PortRef::output(range.port());
            let mapped = self
                .pass_map
                .get(&key)
                .ok_or_else(|| TransformError::MissingPortMapping(range.port().to_string()))?;
            let new_port = mapped.as_output().ok_or_else(|| {
                TransformError::Internal(format!("{} is mapped to an input port", range.port()))
            })?;
            ranges.push(PortRange::new(new_port, range.start(), range.count()));
        }

        PortElements::from_ranges(elements.value_type(), ranges)
    }

    /// Register an output-port correspondence
    ///
    /// Re-mapping an already-mapped old port overwrites the prior entry;
    /// this is how a refine behavior declares that an old output is now
    /// realized by a different new output.
    pub fn map_output_port(&mut self, old: OutputPortRef, new: OutputPortRef) -> ModelResult<()> {
        self.map_port(PortRef::output(old), PortRef::output(new))
    }

    /// Register a correspondence for any port; last write wins
    pub fn map_port(&mut self, old: PortRef, new: PortRef) -> ModelResult<()> {
        self.ensure_active()?;

        if Some(old.node().model()) != self.source_id {
            return Err(TransformError::InvalidPortReference(format!(
                "{} does not belong to the model being transformed",
                old
            )));
        }
        if self.dest.get_ref(new.node()).is_none() {
            return Err(TransformError::InvalidPortReference(format!(
                "{} does not belong to the model under construction",
                new
            )));
        }
        if let Some(out_ref) = new.as_output() {
            if self.dest.output_port(out_ref).is_none() {
                return Err(TransformError::InvalidPortReference(format!(
                    "{} does not resolve in the model under construction",
                    new
                )));
            }
        }

        self.pass_map.insert(old, new);
        Ok(())
    }

    /// The context in use by the transformer
    pub fn context(&self) -> &TransformContext {
        &self.context
    }

    /// Mutable access to the active context
    ///
    /// Lets node refine behaviors make context-sensitive decisions.
    pub fn context_mut(&mut self) -> &mut TransformContext {
        &mut self.context
    }

    /// Read access to the model under construction
    ///
    /// Only meaningful during an active pass; after a copy or refine call
    /// returns, the destination model has been handed to the caller.
    pub fn model(&self) -> &Model {
        &self.dest
    }

    // ========================================================================
    // Post-hoc correspondence queries
    // ========================================================================

    /// The new-graph output port corresponding to `old`
    ///
    /// `None` if the queried port was never part of the transformed model or
    /// was dropped rather than mapped.
    pub fn corresponding_output_port(&self, old: OutputPortRef) -> Option<OutputPortRef> {
        self.port_map
            .get(&PortRef::output(old))
            .and_then(|mapped| mapped.as_output())
    }

    /// The new-graph node corresponding to `old`
    ///
    /// Resolved through the correspondence of the node's first output port;
    /// a node with no outputs, or one dropped during refinement, yields
    /// `None`.
    pub fn corresponding_node(&self, old: NodeRef) -> Option<NodeRef> {
        self.corresponding_output_port(OutputPortRef::new(old, 0))
            .map(|port| port.node())
    }

    /// The new-graph port corresponding to any old port
    ///
    /// Output ports resolve through the correspondence map directly; input
    /// ports resolve through their owning node's correspondence, keeping the
    /// port index.
    pub fn corresponding_port(&self, old: PortRef) -> Option<PortRef> {
        if let Some(mapped) = self.port_map.get(&old) {
            return Some(*mapped);
        }

        match old.direction() {
            PortDirection::Input => self
                .corresponding_node(old.node())
                .map(|node| PortRef::input(node, old.index())),
            PortDirection::Output => None,
        }
    }

    /// Statistics from the most recent refine run
    pub fn stats(&self) -> &RefineStats {
        &self.stats
    }

    /// Whether the most recent refine run reached a compilable model
    pub fn is_model_compilable(&self) -> bool {
        self.is_model_compilable
    }

    // ========================================================================
    // Pass machinery
    // ========================================================================

    fn reset(&mut self, context: &TransformContext) {
        self.dest = Model::new();
        self.context = context.clone();
        self.source_id = None;
        self.pass_map.clear();
        self.port_map.clear();
        self.stats = RefineStats::default();
        self.is_model_compilable = false;
    }

    fn ensure_active(&self) -> ModelResult<()> {
        if self.source_id.is_none() {
            return Err(TransformError::Internal(
                "builder API called outside an active copy or refine pass".to_string(),
            ));
        }
        Ok(())
    }

    /// Run one pass over `source`, producing the next model
    fn run_pass(&mut self, source: &Model, refine: bool) -> ModelResult<Model> {
        self.dest = Model::new();
        self.pass_map.clear();
        self.source_id = Some(source.id());

        for id in source.dependency_order() {
            let Some(node) = source.get(id) else { continue };

            if refine && !self.node_already_compilable(node) {
                trace!(node = %node.name(), "refining node");
                self.stats.nodes_refined += 1;
                node.refine(self)?;
            } else {
                trace!(node = %node.name(), "copying node");
                self.stats.nodes_copied += 1;
                node.copy(self)?;
            }

            self.check_output_mapping(node)?;
        }

        self.source_id = None;
        Ok(std::mem::take(&mut self.dest))
    }

    /// Whether `node` already satisfies the predicate and may be copied
    /// during a refine pass
    ///
    /// With no predicate set every node refines, so this is `false`; the
    /// single-pass short-circuit in `refine_model` is what stops iteration.
    fn node_already_compilable(&self, node: &dyn Node) -> bool {
        self.context.has_predicate() && self.context.is_node_compilable(node)
    }

    /// Verify the visited node covered its full original output set
    fn check_output_mapping(&self, node: &dyn Node) -> ModelResult<()> {
        let node_ref = node.bound_ref()?;

        for index in 0..node.outputs().len() {
            let key = PortRef::output(OutputPortRef::new(node_ref, index));
            if !self.pass_map.contains_key(&key) {
                return Err(TransformError::IncompleteOutputMapping(node.name()));
            }
        }

        Ok(())
    }

    fn model_is_compilable(&self, model: &Model) -> bool {
        model
            .nodes()
            .all(|node| self.context.is_node_compilable(node))
    }

    /// Compose the source→current map with the current→next pass map
    ///
    /// Entries whose intermediate port was dropped in the newer pass vanish;
    /// a later lookup of such a port reports not-found.
    fn compose_correspondences(&mut self) {
        let mut composed = FxHashMap::default();
        composed.reserve(self.port_map.len());

        for (&src, &mid) in &self.port_map {
            if let Some(&dst) = self.pass_map.get(&mid) {
                composed.insert(src, dst);
            }
        }

        self.port_map = composed;
    }

    /// Name of one node that fails the predicate, first in dependency order
    fn uncompilable_node_name(&self, model: &Model) -> String {
        for id in model.dependency_order() {
            if let Some(node) = model.get(id) {
                if !self.context.is_node_compilable(node) {
                    return node.name();
                }
            }
        }
        "<none>".to_string()
    }
}
