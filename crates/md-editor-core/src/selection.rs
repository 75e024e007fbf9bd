use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary {
    pub node: NodeId,
    pub offset: usize,
}

impl Boundary {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// A snapshot of one selection range. It is a plain value: mutating the
/// document afterwards does not update it, re-read it from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Boundary,
    pub end: Boundary,
}

impl Range {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self { start, end }
    }

    pub fn collapsed_at(node: NodeId, offset: usize) -> Self {
        let point = Boundary::new(node, offset);
        Self {
            start: point,
            end: point,
        }
    }

    /// Spans the whole content of `node`.
    pub fn select_node_contents(doc: &Document, node: NodeId) -> Self {
        Self::new(
            Boundary::new(node, 0),
            Boundary::new(node, doc.node_length(node)),
        )
    }

    pub fn start_container(&self) -> NodeId {
        self.start.node
    }

    pub fn start_offset(&self) -> usize {
        self.start.offset
    }

    pub fn end_container(&self) -> NodeId {
        self.end.node
    }

    pub fn end_offset(&self) -> usize {
        self.end.offset
    }

    pub fn collapsed(&self) -> bool {
        self.start == self.end
    }

    pub fn single_container(&self) -> bool {
        self.start.node == self.end.node
    }

    pub fn collapse_to_start(self) -> Self {
        Self {
            start: self.start,
            end: self.start,
        }
    }
}

/// The host's live selection. The document owns one and keeps its ranges
/// valid across tree mutations.
pub trait SelectionProvider {
    fn range_count(&self) -> usize;
    fn range_at(&self, index: usize) -> Option<Range>;
    fn add_range(&mut self, range: Range);
    fn remove_all_ranges(&mut self);
}

#[derive(Debug, Default, Clone)]
pub struct LiveSelection {
    ranges: Vec<Range>,
}

impl LiveSelection {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionProvider for LiveSelection {
    fn range_count(&self) -> usize {
        self.ranges.len()
    }

    fn range_at(&self, index: usize) -> Option<Range> {
        self.ranges.get(index).copied()
    }

    fn add_range(&mut self, range: Range) {
        // Single-range surface, like every browser except old Firefox.
        self.ranges.clear();
        self.ranges.push(range);
    }

    fn remove_all_ranges(&mut self) {
        self.ranges.clear();
    }
}
