mod backquote;
mod backspace;
mod delete;
mod enter;
mod space;

use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{Document, text_before};
use crate::plugin::EditorPlugin;
use crate::selection::Range;

pub use backquote::BackquotePlugin;
pub use backspace::BackspacePlugin;
pub use delete::DeletePlugin;
pub use enter::EnterPlugin;
pub use space::SpacePlugin;

/// The shorthand plugins in their default registration order.
pub fn default_plugins() -> Vec<Box<dyn EditorPlugin>> {
    vec![
        Box::new(BackquotePlugin),
        Box::new(EnterPlugin),
        Box::new(SpacePlugin),
        Box::new(BackspacePlugin),
        Box::new(DeletePlugin),
    ]
}

static CODE_FENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```(\S+)?$").expect("code fence pattern must compile"));

/// Triple backtick with an optional language word and nothing else.
pub fn is_code_fence(text: &str) -> bool {
    CODE_FENCE_RE.is_match(text)
}

/// The collapsed caret as a text position. A caret on an element (such as
/// the editable root holding bare text) resolves to the end of the text
/// node just before it; any other element caret has no marker to read.
pub(crate) fn text_caret(doc: &Document, range: &Range) -> Option<Range> {
    let node = range.start_container();
    if doc.is_text(node) {
        return Some(*range);
    }
    let offset = range.start_offset().checked_sub(1)?;
    let text = doc.child_at(node, offset).filter(|n| doc.is_text(*n))?;
    Some(Range::collapsed_at(text, doc.node_length(text)))
}

/// Text of the start container before the caret, trimmed.
pub(crate) fn pre_caret_text(doc: &Document, range: &Range) -> String {
    let content = doc.text_content(range.start_container());
    text_before(&content, range.start_offset()).trim().to_string()
}
