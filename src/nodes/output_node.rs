//! Model exit points

use crate::error::ModelResult;
use crate::node::{Node, NodeBase};
use crate::port::{InputPort, OutputPort, OutputPortRef, PortElements};
use crate::transform::ModelTransformer;

/// A sink node marking where data leaves a model
///
/// Consumes one element reference and exposes an output mirroring it, so
/// downstream consumers (and transformers) address model results through a
/// stable port rather than whatever internal port happens to produce them.
#[derive(Debug)]
pub struct OutputNode {
    base: NodeBase,
}

impl OutputNode {
    /// Create a sink over `elements`
    pub fn new(elements: PortElements) -> Self {
        let input = InputPort::from_elements(elements);
        let output = OutputPort::new(input.value_type(), input.size());

        Self {
            base: NodeBase::new(vec![input], vec![output]),
        }
    }
}

impl Node for OutputNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        "output"
    }

    fn copy(&self, transformer: &mut ModelTransformer) -> ModelResult<()> {
        let elements = transformer.transform_port_elements(self.inputs()[0].elements())?;
        let new_node = transformer.add_node(OutputNode::new(elements))?;
        transformer.map_output_port(self.output_ref(0)?, OutputPortRef::new(new_node, 0))
    }
}
