use crate::config::EditorConfig;
use crate::dom::{Document, NBSP, NodeId, text_before};
use crate::selection::{Boundary, Range};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Start,
    #[default]
    End,
}

/// Selection and structural edit primitives shared by the shorthand plugins.
///
/// Nothing here panics on a missing selection or a missing ancestor: those
/// cases come back as `None`/`false` so callers can chain fallbacks.
#[derive(Debug, Clone, Default)]
pub struct ContentEditableEditor {
    config: EditorConfig,
}

impl ContentEditableEditor {
    pub fn new(config: EditorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The first range of the live selection.
    pub fn get_range(&self, doc: &Document) -> Option<Range> {
        let selection = doc.selection();
        if selection.range_count() == 0 {
            return None;
        }
        selection
            .range_at(0)
            .filter(|r| doc.exists(r.start.node) && doc.exists(r.end.node))
    }

    fn set_range(&self, doc: &mut Document, range: Range) {
        let selection = doc.selection_mut();
        selection.remove_all_ranges();
        selection.add_range(range);
    }

    pub fn clear_selection(&self, doc: &mut Document) {
        doc.selection_mut().remove_all_ranges();
    }

    pub fn focus_first_available(&self, doc: &mut Document, content: NodeId, align: Align) {
        doc.focus(content);
        let Some(node) = self.find_first_text(doc, content) else {
            self.clear_selection(doc);
            return;
        };
        self.focus_node(doc, node, align);
    }

    pub fn focus_node(&self, doc: &mut Document, node: NodeId, align: Align) {
        if !doc.exists(node) {
            return;
        }
        // Prefer the text node over the element; WebKit always does.
        let selectable = self.find_first_text(doc, node).unwrap_or(node);
        let offset = match align {
            Align::Start => 0,
            Align::End => doc.node_length(selectable),
        };
        self.set_range(doc, Range::collapsed_at(selectable, offset));
    }

    pub fn find_first_text(&self, doc: &Document, element: NodeId) -> Option<NodeId> {
        for &node in doc.children(element) {
            if doc.is_text(node) {
                return Some(node);
            }
            if !doc.is_element(node) {
                continue;
            }
            if let Some(found) = self.find_first_text(doc, node) {
                return Some(found);
            }
        }
        None
    }

    pub fn next_line(&self, doc: &mut Document, align: Align) {
        self.move_line(doc, align, Document::next_element_sibling);
    }

    pub fn previous_line(&self, doc: &mut Document, align: Align) {
        self.move_line(doc, align, Document::previous_element_sibling);
    }

    fn move_line(
        &self,
        doc: &mut Document,
        align: Align,
        sibling: fn(&Document, NodeId) -> Option<NodeId>,
    ) {
        let Some(range) = self.get_range(doc) else {
            return;
        };
        let Some(block) = self.find_parent_block_element(doc, range.end_container()) else {
            return;
        };
        let Some(line) = sibling(doc, block) else {
            return;
        };
        let target = self.find_first_text(doc, line).unwrap_or(line);
        self.focus_node(doc, target, align);
    }

    /// Collapsed caret at the start of `node`.
    pub fn select_collapsed(&self, doc: &mut Document, node: NodeId) {
        let selectable = if doc.is_text(node) {
            node
        } else if doc.is_element(node) {
            self.find_first_text(doc, node).unwrap_or(node)
        } else {
            return;
        };
        self.set_range(doc, Range::collapsed_at(selectable, 0));
    }

    pub fn select_node_content(&self, doc: &mut Document, node: NodeId) {
        if !doc.exists(node) {
            return;
        }
        let range = Range::select_node_contents(doc, node);
        self.set_range(doc, range);
    }

    pub fn select_content(&self, doc: &mut Document, node: NodeId) {
        self.select_node_content(doc, node);
    }

    pub fn replace_node(&self, doc: &mut Document, node: NodeId, replacement: NodeId) -> bool {
        let Some(parent) = doc.parent(node) else {
            return false;
        };
        if doc.insert_before(parent, replacement, Some(node)).is_err() {
            return false;
        }
        doc.detach(node)
    }

    /// Inserts an empty paragraph (holding a `<br>`) next to `ref_node`.
    pub fn insert_new_line(
        &self,
        doc: &mut Document,
        ref_node: NodeId,
        after: bool,
    ) -> Option<NodeId> {
        let parent = doc.parent(ref_node)?;
        let line = doc.create_element(&self.config.paragraph_tag);
        doc.set_inner_br(line).ok()?;
        self.insert_flanking(doc, parent, line, ref_node, after)?;
        Some(line)
    }

    fn insert_flanking(
        &self,
        doc: &mut Document,
        parent: NodeId,
        node: NodeId,
        ref_node: NodeId,
        after: bool,
    ) -> Option<()> {
        let reference = if !after {
            Some(ref_node)
        } else if doc.last_element_child(parent) == Some(ref_node) {
            None
        } else {
            doc.next_element_sibling(ref_node)
        };
        doc.insert_before(parent, node, reference).ok()
    }

    pub fn add_headline(
        &self,
        doc: &mut Document,
        weight: u8,
        ref_node: NodeId,
        after: bool,
    ) -> Option<NodeId> {
        let weight = weight.clamp(1, 6);
        let title = doc.create_element(&format!("h{weight}"));
        doc.set_inner_br(title).ok()?;
        let node = self.find_parent_non_text_element(doc, ref_node)?;
        if doc.is_content_editable(node) {
            let anchor = child_containing(doc, node, ref_node);
            doc.insert_before(node, title, anchor).ok()?;
            return Some(title);
        }
        let parent = doc.parent(node)?;
        self.insert_flanking(doc, parent, title, node, after)?;
        Some(title)
    }

    pub fn find_parent_block_element(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        let mut target = node;
        loop {
            if doc
                .local_name(target)
                .is_some_and(|tag| self.config.is_block_tag(tag))
            {
                return Some(target);
            }
            target = doc.parent_element(target)?;
        }
    }

    pub fn find_parent_non_text_element(&self, doc: &Document, node: NodeId) -> Option<NodeId> {
        let mut target = node;
        loop {
            if doc
                .local_name(target)
                .is_some_and(|tag| !self.config.is_inline_tag(tag))
            {
                return Some(target);
            }
            let parent = doc.parent_element(target)?;
            if doc.is_content_editable(parent) {
                return Some(parent);
            }
            target = parent;
        }
    }

    /// Turns the line holding a fenced code marker into `pre > code` and
    /// selects the placeholder inside the new `code` element.
    pub fn replace_code_block(&self, doc: &mut Document, range: &Range) -> Option<NodeId> {
        let container = range.start_container();
        let text = doc.text_content(container);
        let marker = text_before(&text, range.start_offset()).trim();
        let mut lang = marker.replacen("```", "", 1).trim().to_string();
        if lang.is_empty() {
            if let Some(next) = doc.next_sibling(container).filter(|n| doc.is_text(*n)) {
                lang = doc.text_content(next).trim().to_string();
            }
        }
        if lang.is_empty() {
            lang = self.config.default_code_language.clone();
        }

        let block = self.find_parent_block_element(doc, container)?;
        // The editable root itself is never replaced.
        let anchor = if doc.is_content_editable(block) {
            Some(child_containing(doc, block, container)?)
        } else {
            None
        };

        let pre = doc.create_element("pre");
        let code = doc.create_element("code");
        doc.add_class(code, &format!("language-{lang}"));
        doc.append_child(pre, code).ok()?;
        doc.set_text_content(code, &self.config.code_placeholder).ok()?;

        if let Some(anchor) = anchor {
            doc.insert_before(block, pre, Some(anchor)).ok()?;
            doc.detach(anchor);
        } else if !self.replace_node(doc, block, pre) {
            return None;
        }

        if let Some(placeholder) = doc.first_child(code) {
            self.select_content(doc, placeholder);
        }
        Some(code)
    }

    /// Removes `item` from its list and returns the node the caret should
    /// move to.
    pub fn remove_list_item(&self, doc: &mut Document, item: NodeId) -> Option<NodeId> {
        let list = doc.parent(item)?;
        doc.detach(item);
        let outer_item = doc.parent_element(list).filter(|p| doc.is_tag(*p, &["li"]));

        if doc.element_children(list).is_empty() {
            let focus = match outer_item {
                Some(_) => None,
                None => self.insert_new_line(doc, list, true),
            };
            doc.detach(list);
            if let Some(outer) = outer_item {
                return self.append_list_item(doc, outer);
            }
            return focus;
        }

        match outer_item {
            Some(outer) => self.append_list_item(doc, outer),
            None => self.insert_new_line(doc, list, true),
        }
    }

    pub fn append_list_item(&self, doc: &mut Document, previous: NodeId) -> Option<NodeId> {
        let list = doc.parent(previous)?;
        if !doc.is_tag(list, &["ul", "ol"]) {
            return None;
        }
        let tag = doc.local_name(previous)?.to_string();
        let item = doc.create_element(&tag);
        self.insert_flanking(doc, list, item, previous, true)?;
        Some(item)
    }

    /// Splits a text node around `content`: `text_node` keeps `before`,
    /// `content` follows it, then `after` (or a non-breaking space when
    /// `after` is empty, so the caret has somewhere to land).
    pub fn replace_text_node_content(
        &self,
        doc: &mut Document,
        text_node: NodeId,
        before: &str,
        content: NodeId,
        after: &str,
    ) -> bool {
        let Some(parent) = doc.parent(text_node) else {
            return false;
        };
        if doc.set_text_content(text_node, before).is_err() {
            return false;
        }
        if doc.insert_after(parent, content, text_node).is_err() {
            return false;
        }
        let trailing = if after.is_empty() {
            doc.create_text(NBSP.to_string())
        } else {
            doc.create_text(after)
        };
        doc.insert_after(parent, trailing, content).is_ok()
    }

    /// `Range.surroundContents` for a range within one container.
    pub fn surround_contents(&self, doc: &mut Document, range: &Range, wrapper: NodeId) -> bool {
        if !range.single_container() {
            return false;
        }
        let container = range.start_container();
        let (start, end) = (range.start_offset(), range.end_offset());
        if start > end || end > doc.node_length(container) {
            return false;
        }

        if doc.is_text(container) {
            let Some(parent) = doc.parent(container) else {
                return false;
            };
            let middle = if start > 0 {
                match doc.split_text(container, start) {
                    Ok(node) => node,
                    Err(_) => return false,
                }
            } else {
                container
            };
            if end - start < doc.node_length(middle) && doc.split_text(middle, end - start).is_err()
            {
                return false;
            }
            if doc.insert_before(parent, wrapper, Some(middle)).is_err() {
                return false;
            }
            if doc.append_child(wrapper, middle).is_err() {
                return false;
            }
            self.select_around(doc, wrapper);
            return true;
        }

        let moved: Vec<NodeId> = doc.children(container)[start..end].to_vec();
        let reference = doc.child_at(container, end);
        if doc.insert_before(container, wrapper, reference).is_err() {
            return false;
        }
        for node in moved {
            if doc.append_child(wrapper, node).is_err() {
                return false;
            }
        }
        self.select_around(doc, wrapper);
        true
    }

    fn select_around(&self, doc: &mut Document, node: NodeId) {
        let (Some(parent), Some(ix)) = (doc.parent(node), doc.index_of(node)) else {
            return;
        };
        self.set_range(
            doc,
            Range::new(Boundary::new(parent, ix), Boundary::new(parent, ix + 1)),
        );
    }
}

/// The child of `ancestor` on the path down to `node`.
fn child_containing(doc: &Document, ancestor: NodeId, node: NodeId) -> Option<NodeId> {
    let mut current = node;
    loop {
        let parent = doc.parent(current)?;
        if parent == ancestor {
            return Some(current);
        }
        current = parent;
    }
}
