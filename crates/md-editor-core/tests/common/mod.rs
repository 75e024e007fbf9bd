#![allow(dead_code)]

use md_editor_core::{
    Boundary, Document, Fragment, KeyEvent, MarkdownEditor, NodeId, Range,
};

pub struct Fixture {
    pub doc: Document,
    pub root: NodeId,
    pub editor: MarkdownEditor,
}

impl Fixture {
    /// An editable root holding `children`, with the default plugins listening.
    pub fn new(children: Vec<Fragment>) -> Self {
        let mut doc = Document::new();
        let root = doc
            .append_fragment(doc.root(), &Fragment::editable(children))
            .unwrap();
        doc.focus(root);
        let mut editor = MarkdownEditor::new(root).with_default_plugins();
        editor.listen();
        Self { doc, root, editor }
    }

    pub fn press(&mut self, code: &str) -> KeyEvent {
        let mut event = KeyEvent::new(code);
        self.editor.handle_keydown(&mut self.doc, &mut event);
        event
    }

    pub fn press_shift(&mut self, code: &str) -> KeyEvent {
        let mut event = KeyEvent::new(code).shift(true);
        self.editor.handle_keydown(&mut self.doc, &mut event);
        event
    }

    pub fn html(&self) -> String {
        self.doc.inner_html(self.root)
    }

    pub fn range(&self) -> Range {
        self.editor.editor().get_range(&self.doc).unwrap()
    }

    /// First text node under the first `tag` element.
    pub fn text_in(&self, tag: &str) -> NodeId {
        let el = self.doc.find_first(self.root, tag).unwrap();
        self.editor.editor().find_first_text(&self.doc, el).unwrap()
    }
}

pub fn caret(doc: &mut Document, node: NodeId, offset: usize) {
    select(doc, node, offset, node, offset);
}

pub fn select(doc: &mut Document, start: NodeId, so: usize, end: NodeId, eo: usize) {
    let selection = doc.selection_mut();
    selection.remove_all_ranges();
    selection.add_range(Range::new(Boundary::new(start, so), Boundary::new(end, eo)));
}

pub fn item(text: &str) -> Fragment {
    Fragment::element("li", [Fragment::text(text)])
}

pub fn empty(tag: &str) -> Fragment {
    Fragment::element(tag, Vec::<Fragment>::new())
}
