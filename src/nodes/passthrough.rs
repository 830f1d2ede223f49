//! Identity wiring

use crate::error::ModelResult;
use crate::node::{Node, NodeBase};
use crate::port::{InputPort, OutputPort, OutputPortRef, PortElements};
use crate::transform::ModelTransformer;

/// Identity wiring over one element reference
///
/// Consumes an arbitrary (possibly composite) element reference and exposes
/// it unchanged as a single output. Refinement decompositions use this node
/// to re-expose elements that are now assembled from several upstream ports.
#[derive(Debug)]
pub struct PassthroughNode {
    base: NodeBase,
}

impl PassthroughNode {
    /// Create a passthrough over `elements`
    pub fn new(elements: PortElements) -> Self {
        let input = InputPort::from_elements(elements);
        let output = OutputPort::new(input.value_type(), input.size());

        Self {
            base: NodeBase::new(vec![input], vec![output]),
        }
    }
}

impl Node for PassthroughNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "passthrough"
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> ModelResult<()> {
        let elements = transformer.transform_port_elements(self.inputs()[0].elements())?;
        let new_node = transformer.add_node(PassthroughNode::new(elements))?;
        transformer.map_output_port(self.output_ref(0)?, OutputPortRef::new(new_node, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::nodes::InputNode;
    use crate::port::ValueType;
    use crate::transform::TransformContext;

    #[test]
    fn test_passthrough_mirrors_elements() {
        let mut model = Model::new();
        let a = model.add_node(InputNode::new(ValueType::Real, 4)).unwrap();
        let elements = model.output_elements(a, 0).unwrap();

        let b = model
            .add_node(PassthroughNode::new(elements.slice(1, 2).unwrap()))
            .unwrap();

        let node = model.get_ref(b).unwrap();
        assert_eq!(node.inputs()[0].size(), 2);
        assert_eq!(node.outputs()[0].size(), 2);
        assert_eq!(node.outputs()[0].value_type(), ValueType::Real);
    }

    #[test]
    fn test_passthrough_copy_rewires() {
        let mut model = Model::new();
        let a = model.add_node(InputNode::new(ValueType::Real, 4)).unwrap();
        let elements = model.output_elements(a, 0).unwrap();
        let b = model.add_node(PassthroughNode::new(elements)).unwrap();

        let mut transformer = ModelTransformer::new();
        let copied = transformer
            .copy_model(&model, &TransformContext::default())
            .unwrap();
        assert_eq!(copied.len(), 2);

        // The copied passthrough's input references the copied source.
        let new_a = transformer
            .corresponding_output_port(OutputPortRef::new(a, 0))
            .unwrap();
        let new_b = transformer.corresponding_node(b).unwrap();
        let ranges: Vec<_> = copied.get_ref(new_b).unwrap().inputs()[0]
            .elements()
            .ranges()
            .to_vec();
        assert_eq!(ranges.len(), 1);
        assert_eq!(ranges[0].port(), new_a);
    }
}
