//! Per-transformation policy
//!
//! A [`TransformContext`] carries the compilability predicate steering
//! refinement, plus the refinement iteration cap. It is cloned into the
//! transformer at the start of a copy or refine call and stays readable and
//! writable by node refine behaviors through
//! [`ModelTransformer::context_mut`](crate::transform::ModelTransformer::context_mut).

use std::fmt;
use std::sync::Arc;

use crate::node::Node;

/// Default refinement iteration cap
///
/// Refinement is a rewrite system without a general termination proof; the
/// cap converts non-termination into a bounded, diagnosable failure.
pub const DEFAULT_MAX_REFINEMENT_ITERATIONS: usize = 10;

/// Caller-supplied predicate deciding whether a node needs further refinement
pub type CompilabilityPredicate = Arc<dyn Fn(&dyn Node) -> bool + Send + Sync>;

/// Policy for one copy or refine call
///
/// An unset predicate means "always compilable": refinement performs exactly
/// one pass with no fixpoint check, and every node is asked to refine once.
#[derive(Clone)]
pub struct TransformContext {
    is_node_compilable: Option<CompilabilityPredicate>,
    max_refinement_iterations: usize,
}

impl TransformContext {
    /// Create a context with no predicate and the default iteration cap
    pub fn new() -> Self {
        Self {
            is_node_compilable: None,
            max_refinement_iterations: DEFAULT_MAX_REFINEMENT_ITERATIONS,
        }
    }

    /// Create a context with the given compilability predicate
    pub fn with_predicate<F>(predicate: F) -> Self
    where
        F: Fn(&dyn Node) -> bool + Send + Sync + 'static,
    {
        Self {
            is_node_compilable: Some(Arc::new(predicate)),
            max_refinement_iterations: DEFAULT_MAX_REFINEMENT_ITERATIONS,
        }
    }

    /// Override the refinement iteration cap
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_refinement_iterations = max_iterations;
        self
    }

    /// Install or replace the compilability predicate
    pub fn set_predicate<F>(&mut self, predicate: F)
    where
        F: Fn(&dyn Node) -> bool + Send + Sync + 'static,
    {
        self.is_node_compilable = Some(Arc::new(predicate));
    }

    /// Remove the compilability predicate
    pub fn clear_predicate(&mut self) {
        self.is_node_compilable = None;
    }

    /// Whether a predicate is set
    pub fn has_predicate(&self) -> bool {
        self.is_node_compilable.is_some()
    }

    /// The installed predicate, if any
    pub fn predicate(&self) -> Option<&CompilabilityPredicate> {
        self.is_node_compilable.as_ref()
    }

    /// Evaluate the predicate for `node`; an unset predicate means compilable
    pub fn is_node_compilable(&self, node: &dyn Node) -> bool {
        match &self.is_node_compilable {
            Some(predicate) => predicate.as_ref()(node),
            None => true,
        }
    }

    /// The refinement iteration cap
    pub fn max_refinement_iterations(&self) -> usize {
        self.max_refinement_iterations
    }
}

impl Default for TransformContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TransformContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformContext")
            .field("has_predicate", &self.has_predicate())
            .field("max_refinement_iterations", &self.max_refinement_iterations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::InputNode;
    use crate::port::ValueType;

    #[test]
    fn test_default_context() {
        let ctx = TransformContext::default();
        assert!(!ctx.has_predicate());
        assert_eq!(
            ctx.max_refinement_iterations(),
            DEFAULT_MAX_REFINEMENT_ITERATIONS
        );

        // Unset predicate treats every node as compilable.
        let node = InputNode::new(ValueType::Real, 1);
        assert!(ctx.is_node_compilable(&node));
    }

    #[test]
    fn test_predicate_steering() {
        let ctx = TransformContext::with_predicate(|node| node.kind() != "input");
        let node = InputNode::new(ValueType::Real, 1);
        assert!(ctx.has_predicate());
        assert!(!ctx.is_node_compilable(&node));
    }

    #[test]
    fn test_clear_predicate() {
        let mut ctx = TransformContext::with_predicate(|_| false);
        ctx.clear_predicate();
        assert!(!ctx.has_predicate());
    }
}
