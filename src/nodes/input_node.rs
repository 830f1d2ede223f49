//! Model entry points

use crate::error::ModelResult;
use crate::node::{Node, NodeBase};
use crate::port::{OutputPort, OutputPortRef, ValueType};
use crate::transform::ModelTransformer;

/// A source node: no inputs, one output of a declared type and size
///
/// Input nodes are where externally supplied data enters a model; the graph
/// core only tracks their shape.
#[derive(Debug)]
pub struct InputNode {
    base: NodeBase,
    value_type: ValueType,
    size: usize,
}

impl InputNode {
    /// Create a source producing `size` elements of `value_type`
    pub fn new(value_type: ValueType, size: usize) -> Self {
        Self {
            base: NodeBase::new(vec![], vec![OutputPort::new(value_type, size)]),
            value_type,
            size,
        }
    }

    /// The produced value type
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// The produced element count
    pub fn size(&self) -> usize {
        self.size
    }
}

impl Node for InputNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "input"
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> ModelResult<()> {
        let new_node = transformer.add_node(InputNode::new(self.value_type, self.size))?;
        transformer.map_output_port(self.output_ref(0)?, OutputPortRef::new(new_node, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::transform::TransformContext;

    #[test]
    fn test_input_node_shape() {
        let node = InputNode::new(ValueType::Integer, 8);
        assert!(node.inputs().is_empty());
        assert_eq!(node.outputs().len(), 1);
        assert_eq!(node.outputs()[0].value_type(), ValueType::Integer);
        assert_eq!(node.outputs()[0].size(), 8);
    }

    #[test]
    fn test_input_node_copy() {
        let mut model = Model::new();
        let a = model.add_node(InputNode::new(ValueType::Real, 4)).unwrap();

        let mut transformer = ModelTransformer::new();
        let copied = transformer
            .copy_model(&model, &TransformContext::default())
            .unwrap();

        assert_eq!(copied.len(), 1);
        let new_port = transformer
            .corresponding_output_port(OutputPortRef::new(a, 0))
            .unwrap();
        assert_eq!(copied.output_port(new_port).unwrap().size(), 4);
    }
}
