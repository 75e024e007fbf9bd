use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use slotmap::{SlotMap, new_key_type};

use crate::error::DomError;
use crate::selection::{Boundary, LiveSelection, Range, SelectionProvider};

new_key_type! { pub struct NodeId; }

pub type Attrs = BTreeMap<String, String>;

pub const NBSP: char = '\u{a0}';

const VOID_TAGS: &[&str] = &["br", "hr", "img", "input", "wbr"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element { tag: String, attrs: Attrs },
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element { .. })
    }
}

/// The host surface: a mutable node tree plus the live selection and focus
/// state that belong to it.
pub struct Document {
    arena: SlotMap<NodeId, NodeData>,
    root: NodeId,
    active_element: Option<NodeId>,
    selection: Box<dyn SelectionProvider>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("nodes", &self.arena.len())
            .field("active_element", &self.active_element)
            .finish()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_selection(Box::new(LiveSelection::new()))
    }

    pub fn with_selection(selection: Box<dyn SelectionProvider>) -> Self {
        let mut arena = SlotMap::with_key();
        let root = arena.insert(NodeData::new(NodeKind::Document));
        Self {
            arena,
            root,
            active_element: None,
            selection,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.insert(NodeData::new(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Attrs::new(),
        }))
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.arena
            .insert(NodeData::new(NodeKind::Text(text.into())))
    }

    pub fn create_comment(&mut self, text: impl Into<String>) -> NodeId {
        self.arena
            .insert(NodeData::new(NodeKind::Comment(text.into())))
    }

    pub fn exists(&self, node: NodeId) -> bool {
        self.arena.contains_key(node)
    }

    pub fn kind(&self, node: NodeId) -> Option<&NodeKind> {
        self.arena.get(node).map(|data| &data.kind)
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Text(_)))
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), Some(NodeKind::Element { .. }))
    }

    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            _ => None,
        }
    }

    pub fn is_tag(&self, node: NodeId, names: &[&str]) -> bool {
        self.local_name(node)
            .is_some_and(|name| names.iter().any(|n| n.eq_ignore_ascii_case(name)))
    }

    pub fn node_name(&self, node: NodeId) -> String {
        match self.kind(node) {
            Some(NodeKind::Document) => "#document".to_string(),
            Some(NodeKind::Element { tag, .. }) => tag.to_ascii_uppercase(),
            Some(NodeKind::Text(_)) => "#text".to_string(),
            Some(NodeKind::Comment(_)) => "#comment".to_string(),
            None => String::new(),
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.get(node)?.parent
    }

    pub fn parent_element(&self, node: NodeId) -> Option<NodeId> {
        self.parent(node).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.arena
            .get(node)
            .map(|data| data.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|c| self.is_element(*c))
            .collect()
    }

    pub fn has_child_nodes(&self, node: NodeId) -> bool {
        !self.children(node).is_empty()
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    pub fn child_at(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).get(index).copied()
    }

    pub fn index_of(&self, node: NodeId) -> Option<usize> {
        let parent = self.parent(node)?;
        self.children(parent).iter().position(|c| *c == node)
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let ix = self.index_of(node)?;
        self.child_at(parent, ix + 1)
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.parent(node)?;
        let ix = self.index_of(node)?;
        ix.checked_sub(1).and_then(|ix| self.child_at(parent, ix))
    }

    pub fn next_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.next_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.next_sibling(sibling);
        }
        None
    }

    pub fn previous_element_sibling(&self, node: NodeId) -> Option<NodeId> {
        let mut current = self.previous_sibling(node);
        while let Some(sibling) = current {
            if self.is_element(sibling) {
                return Some(sibling);
            }
            current = self.previous_sibling(sibling);
        }
        None
    }

    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).iter().copied().find(|c| self.is_element(*c))
    }

    pub fn last_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node)
            .iter()
            .rev()
            .copied()
            .find(|c| self.is_element(*c))
    }

    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |n| self.parent(*n))
    }

    /// Inclusive, like `Node.contains`.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor == node || self.ancestors(node).any(|a| a == ancestor)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.exists(node) && self.contains(self.root, node)
    }

    /// Depth-first, document order, `node` excluded.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        fn walk(doc: &Document, node: NodeId, out: &mut Vec<NodeId>) {
            for &child in doc.children(node) {
                out.push(child);
                walk(doc, child, out);
            }
        }
        let mut out = Vec::new();
        walk(self, node, &mut out);
        out
    }

    pub fn find_all(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.is_tag(*n, &[tag]))
            .collect()
    }

    pub fn find_first(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| self.is_tag(*n, &[tag]))
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        if let Some(NodeData {
            kind: NodeKind::Element { attrs, .. },
            ..
        }) = self.arena.get_mut(node)
        {
            attrs.insert(name.to_ascii_lowercase(), value.into());
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let Some(NodeData {
            kind: NodeKind::Element { attrs, .. },
            ..
        }) = self.arena.get_mut(node)
        {
            attrs.remove(&name.to_ascii_lowercase());
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|list| list.split_ascii_whitespace().any(|c| c == class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let next = match self.attr(node, "class") {
            Some(list) if !list.trim().is_empty() => format!("{} {class}", list.trim()),
            _ => class.to_string(),
        };
        self.set_attr(node, "class", next);
    }

    pub fn is_content_editable(&self, node: NodeId) -> bool {
        self.attr(node, "contenteditable")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    /// Character data of a text or comment node.
    pub fn data(&self, node: NodeId) -> Option<&str> {
        match self.kind(node)? {
            NodeKind::Text(text) | NodeKind::Comment(text) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn text_content(&self, node: NodeId) -> String {
        match self.kind(node) {
            Some(NodeKind::Text(text)) | Some(NodeKind::Comment(text)) => text.clone(),
            Some(NodeKind::Element { .. }) | Some(NodeKind::Document) => {
                let mut out = String::new();
                for n in self.descendants(node) {
                    if let Some(NodeKind::Text(text)) = self.kind(n) {
                        out.push_str(text);
                    }
                }
                out
            }
            None => String::new(),
        }
    }

    /// DOM node length: characters for character data, children otherwise.
    pub fn node_length(&self, node: NodeId) -> usize {
        match self.kind(node) {
            Some(NodeKind::Text(text)) | Some(NodeKind::Comment(text)) => text.chars().count(),
            Some(_) => self.children(node).len(),
            None => 0,
        }
    }

    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        let data = self.arena.get_mut(node).ok_or(DomError::StaleNode(node))?;
        match &mut data.kind {
            NodeKind::Text(current) | NodeKind::Comment(current) => {
                let old_len = current.chars().count();
                *current = text.to_string();
                self.adjust_ranges(|b| {
                    if b.node == node && b.offset > 0 && b.offset <= old_len {
                        b.offset = 0;
                    }
                });
                Ok(())
            }
            NodeKind::Element { .. } | NodeKind::Document => {
                for child in self.children(node).to_vec() {
                    self.detach(child);
                }
                if !text.is_empty() {
                    let text = self.create_text(text);
                    self.append_child(node, text)?;
                }
                Ok(())
            }
        }
    }

    /// Empty block placeholder: the element's content becomes a single `<br>`.
    pub fn set_inner_br(&mut self, node: NodeId) -> Result<NodeId, DomError> {
        self.set_text_content(node, "")?;
        let br = self.create_element("br");
        self.append_child(node, br)?;
        Ok(br)
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        self.insert_before(parent, child, None)?;
        Ok(child)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        let parent_data = self.arena.get(parent).ok_or(DomError::StaleNode(parent))?;
        if !parent_data.is_container() {
            return Err(DomError::NotAContainer(parent));
        }
        if !self.exists(child) {
            return Err(DomError::StaleNode(child));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest { parent, child });
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(DomError::NotAChild {
                    parent,
                    child: reference,
                });
            }
            if reference == child {
                return Ok(());
            }
        }

        self.detach(child);

        let children = &mut self.arena[parent].children;
        let index = match reference {
            Some(reference) => children
                .iter()
                .position(|c| *c == reference)
                .unwrap_or(children.len()),
            None => children.len(),
        };
        children.insert(index, child);
        self.arena[child].parent = Some(parent);

        self.adjust_ranges(|b| {
            if b.node == parent && b.offset > index {
                b.offset += 1;
            }
        });
        Ok(())
    }

    pub fn insert_after(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        let next = self.next_sibling(reference);
        self.insert_before(parent, child, next)
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId, DomError> {
        if !self.exists(child) {
            return Err(DomError::StaleNode(child));
        }
        if self.parent(child) != Some(parent) {
            return Err(DomError::NotAChild { parent, child });
        }
        self.detach(child);
        Ok(child)
    }

    /// Removes `node` from its parent. Live range boundaries inside the
    /// removed subtree move to the removal point.
    ///
    /// The subtree stays in the arena, as a removed DOM node stays alive
    /// while referenced, so ids held by callers keep answering queries.
    /// Call [`Document::release`] once nothing needs it.
    pub fn detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.parent(node) else {
            return false;
        };
        let Some(index) = self.index_of(node) else {
            return false;
        };
        self.arena[parent].children.remove(index);
        self.arena[node].parent = None;

        if self.active_element.is_some_and(|a| self.contains(node, a)) {
            self.active_element = None;
        }

        let removed: Vec<NodeId> = std::iter::once(node)
            .chain(self.descendants(node))
            .collect();
        self.adjust_ranges(|b| {
            if removed.contains(&b.node) {
                b.node = parent;
                b.offset = index;
            } else if b.node == parent && b.offset > index {
                b.offset -= 1;
            }
        });
        true
    }

    /// Frees a detached subtree from the arena and returns how many nodes
    /// were dropped. Its ids become stale afterwards.
    pub fn release(&mut self, node: NodeId) -> Result<usize, DomError> {
        if !self.exists(node) {
            return Err(DomError::StaleNode(node));
        }
        if node == self.root || self.parent(node).is_some() {
            return Err(DomError::StillAttached(node));
        }
        let freed: Vec<NodeId> = std::iter::once(node)
            .chain(self.descendants(node))
            .collect();
        if self.active_element.is_some_and(|a| freed.contains(&a)) {
            self.active_element = None;
        }
        for id in &freed {
            self.arena.remove(*id);
        }
        Ok(freed.len())
    }

    /// Nodes held by the arena, detached ones included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// `Text.splitText`: keeps the first `offset` characters in `node` and
    /// moves the rest into a new following sibling, which is returned.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let Some(NodeKind::Text(text)) = self.kind(node) else {
            return Err(DomError::NotText(node));
        };
        let byte_ix = char_to_byte(text, offset);
        let (head, tail) = text.split_at(byte_ix);
        let (head, tail) = (head.to_string(), tail.to_string());

        let new_node = self.create_text(tail);
        if let Some(parent) = self.parent(node) {
            self.insert_after(parent, new_node, node)?;
        }
        if let NodeKind::Text(text) = &mut self.arena[node].kind {
            *text = head;
        }
        self.adjust_ranges(|b| {
            if b.node == node && b.offset > offset {
                b.node = new_node;
                b.offset -= offset;
            }
        });
        Ok(new_node)
    }

    pub fn focus(&mut self, node: NodeId) {
        if self.exists(node) {
            self.active_element = Some(node);
        }
    }

    pub fn blur(&mut self) {
        self.active_element = None;
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active_element
    }

    pub fn selection(&self) -> &dyn SelectionProvider {
        self.selection.as_ref()
    }

    pub fn selection_mut(&mut self) -> &mut dyn SelectionProvider {
        self.selection.as_mut()
    }

    fn adjust_ranges(&mut self, mut adjust: impl FnMut(&mut Boundary)) {
        let count = self.selection.range_count();
        if count == 0 {
            return;
        }
        let mut ranges: Vec<Range> = (0..count)
            .filter_map(|ix| self.selection.range_at(ix))
            .collect();
        let before = ranges.clone();
        for range in &mut ranges {
            adjust(&mut range.start);
            adjust(&mut range.end);
        }
        if ranges == before {
            return;
        }
        self.selection.remove_all_ranges();
        for range in ranges {
            self.selection.add_range(range);
        }
    }

    pub fn append_fragment(
        &mut self,
        parent: NodeId,
        fragment: &Fragment,
    ) -> Result<NodeId, DomError> {
        let node = self.build_fragment(fragment)?;
        self.append_child(parent, node)
    }

    pub fn build_fragment(&mut self, fragment: &Fragment) -> Result<NodeId, DomError> {
        match fragment {
            Fragment::Text(t) => Ok(self.create_text(t.text.clone())),
            Fragment::Comment(c) => Ok(self.create_comment(c.text.clone())),
            Fragment::Element(el) => {
                let node = self.create_element(&el.tag);
                for (k, v) in &el.attrs {
                    self.set_attr(node, k, v.clone());
                }
                for child in &el.children {
                    self.append_fragment(node, child)?;
                }
                Ok(node)
            }
        }
    }

    pub fn snapshot(&self, node: NodeId) -> Option<Fragment> {
        Some(match self.kind(node)? {
            NodeKind::Text(text) => Fragment::text(text.clone()),
            NodeKind::Comment(text) => Fragment::Comment(TextFragment { text: text.clone() }),
            NodeKind::Element { tag, attrs } => Fragment::Element(ElementFragment {
                tag: tag.clone(),
                attrs: attrs.clone(),
                children: self
                    .children(node)
                    .iter()
                    .filter_map(|c| self.snapshot(*c))
                    .collect(),
            }),
            NodeKind::Document => Fragment::Element(ElementFragment {
                tag: "#document".to_string(),
                attrs: Attrs::new(),
                children: self
                    .children(node)
                    .iter()
                    .filter_map(|c| self.snapshot(*c))
                    .collect(),
            }),
        })
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    pub fn inner_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => escape_text(text, out),
            Some(NodeKind::Comment(text)) => {
                let _ = write!(out, "<!--{text}-->");
            }
            Some(NodeKind::Element { tag, attrs }) => {
                out.push('<');
                out.push_str(tag);
                for (k, v) in attrs {
                    let _ = write!(out, " {k}=\"{}\"", v.replace('"', "&quot;"));
                }
                out.push('>');
                if VOID_TAGS.contains(&tag.as_str()) {
                    return;
                }
                for &child in self.children(node) {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
            Some(NodeKind::Document) => {
                for &child in self.children(node) {
                    self.write_html(child, out);
                }
            }
            None => {}
        }
    }
}

fn escape_text(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            NBSP => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

pub(crate) fn char_to_byte(text: &str, offset: usize) -> usize {
    text.char_indices()
        .nth(offset)
        .map(|(ix, _)| ix)
        .unwrap_or(text.len())
}

/// Characters of `text` before the char `offset`.
pub fn text_before(text: &str, offset: usize) -> &str {
    &text[..char_to_byte(text, offset)]
}

pub fn text_after(text: &str, offset: usize) -> &str {
    &text[char_to_byte(text, offset)..]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Fragment {
    Element(ElementFragment),
    Text(TextFragment),
    Comment(TextFragment),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementFragment {
    pub tag: String,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Fragment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
}

impl Fragment {
    pub fn element(tag: impl Into<String>, children: impl IntoIterator<Item = Fragment>) -> Self {
        Fragment::Element(ElementFragment {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: children.into_iter().collect(),
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Fragment::Text(TextFragment { text: text.into() })
    }

    pub fn comment(text: impl Into<String>) -> Self {
        Fragment::Comment(TextFragment { text: text.into() })
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::element("p", [Self::text(text)])
    }

    /// `<div contenteditable="true">` holding `children`.
    pub fn editable(children: impl IntoIterator<Item = Fragment>) -> Self {
        Self::element("div", children).attr("contenteditable", "true")
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let Fragment::Element(el) = &mut self {
            el.attrs.insert(name.into(), value.into());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_offsets_respect_multibyte_text() {
        assert_eq!(text_before("żółw", 2), "żó");
        assert_eq!(text_after("żółw", 2), "łw");
        assert_eq!(text_before("ab", 10), "ab");
    }
}
