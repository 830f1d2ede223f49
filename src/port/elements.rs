//! Composite output-port element references
//!
//! A [`PortElements`] value is an ordered reference into one or more output
//! ports of the same value type. It is the unit consumed by input ports: a
//! single logical input can select a sub-range of one upstream output, or
//! concatenate ranges taken from several upstream outputs.

use smallvec::SmallVec;

use crate::error::{ModelResult, TransformError};
use crate::port::{OutputPortRef, ValueType};

/// A contiguous sub-range of one output port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PortRange {
    port: OutputPortRef,
    start: usize,
    count: usize,
}

impl PortRange {
    /// Create a range covering `count` elements of `port` starting at `start`
    pub fn new(port: OutputPortRef, start: usize, count: usize) -> Self {
        Self { port, start, count }
    }

    /// The referenced output port
    pub fn port(&self) -> OutputPortRef {
        self.port
    }

    /// Index of the first referenced element
    pub fn start(&self) -> usize {
        self.start
    }

    /// Number of referenced elements
    pub fn count(&self) -> usize {
        self.count
    }
}

/// An ordered, possibly composite reference into one or more output ports
///
/// All referenced ports must produce the same value type. Element order is
/// the concatenation order of the ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortElements {
    value_type: ValueType,
    ranges: SmallVec<[PortRange; 2]>,
}

impl PortElements {
    /// Create a reference to a single range of one output port
    ///
    /// Prefer [`Model::output_elements`](crate::model::Model::output_elements)
    /// for whole-port references; it resolves the value type and count from
    /// the model.
    pub fn range(
        value_type: ValueType,
        port: OutputPortRef,
        start: usize,
        count: usize,
    ) -> ModelResult<Self> {
        if count == 0 {
            return Err(TransformError::EmptyElements);
        }

        let mut ranges = SmallVec::new();
        ranges.push(PortRange::new(port, start, count));
        Ok(Self { value_type, ranges })
    }

    /// Assemble elements from pre-built ranges
    pub(crate) fn from_ranges(
        value_type: ValueType,
        ranges: SmallVec<[PortRange; 2]>,
    ) -> ModelResult<Self> {
        if ranges.iter().map(PortRange::count).sum::<usize>() == 0 {
            return Err(TransformError::EmptyElements);
        }

        Ok(Self { value_type, ranges })
    }

    /// Concatenate several element references, preserving order
    ///
    /// All parts must have the same value type.
    pub fn concat<I>(parts: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = PortElements>,
    {
        let mut iter = parts.into_iter();
        let mut combined = iter.next().ok_or(TransformError::EmptyElements)?;

        for part in iter {
            if part.value_type != combined.value_type {
                return Err(TransformError::TypeMismatch(format!(
                    "cannot concatenate {} elements with {} elements",
                    combined.value_type, part.value_type
                )));
            }
            combined.ranges.extend(part.ranges);
        }

        Ok(combined)
    }

    /// Select a sub-range of `count` elements starting at `start`
    ///
    /// The selection may span range boundaries of a composite reference.
    pub fn slice(&self, start: usize, count: usize) -> ModelResult<Self> {
        if count == 0 {
            return Err(TransformError::EmptyElements);
        }
        if start + count > self.size() {
            return Err(TransformError::SizeMismatch(format!(
                "slice [{}..{}) exceeds the {} referenced elements",
                start,
                start + count,
                self.size()
            )));
        }

        let mut ranges = SmallVec::new();
        let mut skip = start;
        let mut take = count;

        for range in &self.ranges {
            if take == 0 {
                break;
            }
            if skip >= range.count {
                skip -= range.count;
                continue;
            }

            let offset = skip;
            let available = range.count - offset;
            let taken = available.min(take);
            ranges.push(PortRange::new(range.port, range.start + offset, taken));

            skip = 0;
            take -= taken;
        }

        Self::from_ranges(self.value_type, ranges)
    }

    /// The common value type of all referenced elements
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Total number of referenced elements
    pub fn size(&self) -> usize {
        self.ranges.iter().map(PortRange::count).sum()
    }

    /// The ranges making up this reference, in element order
    pub fn ranges(&self) -> &[PortRange] {
        &self.ranges
    }
}
