//! Concatenating node

use crate::error::{ModelResult, TransformError};
use crate::node::{Node, NodeBase};
use crate::nodes::PassthroughNode;
use crate::port::{InputPort, OutputPort, OutputPortRef, PortElements};
use crate::transform::ModelTransformer;

/// Concatenates several element references into one output
///
/// Takes n parts as n inputs and produces a single output of the total
/// element count. All parts must share one value type.
///
/// Its refine behavior replaces the node with a single [`PassthroughNode`]
/// whose input is the composite of the translated parts, demonstrating that
/// a logical input can be assembled from multiple upstream outputs without a
/// dedicated node.
#[derive(Debug)]
pub struct ConcatNode {
    base: NodeBase,
}

impl ConcatNode {
    /// Create a concatenation of `parts`, in order
    pub fn new(parts: Vec<PortElements>) -> ModelResult<Self> {
        if parts.is_empty() {
            return Err(TransformError::EmptyElements);
        }

        let value_type = parts[0].value_type();
        for part in &parts {
            if part.value_type() != value_type {
                return Err(TransformError::TypeMismatch(format!(
                    "cannot concatenate {} elements with {} elements",
                    value_type,
                    part.value_type()
                )));
            }
        }

        let total: usize = parts.iter().map(PortElements::size).sum();
        let inputs = parts.into_iter().map(InputPort::from_elements).collect();
        let outputs = vec![OutputPort::new(value_type, total)];

        Ok(Self {
            base: NodeBase::new(inputs, outputs),
        })
    }

    fn translated_parts(&self, transformer: &ModelTransformer) -> ModelResult<Vec<PortElements>> {
        self.inputs()
            .iter()
            .map(|input| transformer.transform_port_elements(input.elements()))
            .collect()
    }
}

impl Node for ConcatNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "concat"
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> ModelResult<()> {
        let parts = self.translated_parts(transformer)?;
        let new_node = transformer.add_node(ConcatNode::new(parts)?)?;
        transformer.map_output_port(self.output_ref(0)?, OutputPortRef::new(new_node, 0))
    }

    fn refine(&self, transformer: &mut ModelTransformer) -> ModelResult<()> {
        let parts = self.translated_parts(transformer)?;
        let combined = PortElements::concat(parts)?;
        let new_node = transformer.add_node(PassthroughNode::new(combined))?;
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

    fn two_source_concat() -> (Model, OutputPortRef, OutputPortRef, crate::node::NodeRef) {
        let mut model = Model::new();
        let s1 = model.add_node(InputNode::new(ValueType::Real, 2)).unwrap();
        let s2 = model.add_node(InputNode::new(ValueType::Real, 3)).unwrap();
        let concat = model
            .add_node(
                ConcatNode::new(vec![
                    model.output_elements(s1, 0).unwrap(),
                    model.output_elements(s2, 0).unwrap(),
                ])
                .unwrap(),
            )
            .unwrap();

        (
            model,
            OutputPortRef::new(s1, 0),
            OutputPortRef::new(s2, 0),
            concat,
        )
    }

    #[test]
    fn test_concat_shape() {
        let (model, _, _, concat) = two_source_concat();
        let node = model.get_ref(concat).unwrap();

        assert_eq!(node.inputs().len(), 2);
        assert_eq!(node.outputs()[0].size(), 5);
    }

    #[test]
    fn test_concat_type_mismatch_rejected() {
        let mut model = Model::new();
        let s1 = model.add_node(InputNode::new(ValueType::Real, 2)).unwrap();
        let s2 = model
            .add_node(InputNode::new(ValueType::Integer, 2))
            .unwrap();

        let result = ConcatNode::new(vec![
            model.output_elements(s1, 0).unwrap(),
            model.output_elements(s2, 0).unwrap(),
        ]);
        assert!(matches!(result, Err(TransformError::TypeMismatch(_))));
    }

    #[test]
    fn test_concat_refines_to_passthrough() {
        let (model, s1, s2, concat) = two_source_concat();

        let mut transformer = ModelTransformer::new();
        let refined = transformer
            .refine_model(&model, &TransformContext::default())
            .unwrap();

        // One decomposition round: sources copied, concat replaced.
        assert_eq!(refined.len(), 3);
        let new_concat = transformer.corresponding_node(concat).unwrap();
        let node = refined.get_ref(new_concat).unwrap();
        assert_eq!(node.kind(), "passthrough");

        // The replacement's single input is the ordered composite of both
        // translated sources.
        let ranges = node.inputs()[0].elements().ranges().to_vec();
        assert_eq!(ranges.len(), 2);
        assert_eq!(
            ranges[0].port(),
            transformer.corresponding_output_port(s1).unwrap()
        );
        assert_eq!(
            ranges[1].port(),
            transformer.corresponding_output_port(s2).unwrap()
        );
        assert_eq!(node.outputs()[0].size(), 5);
    }
}
