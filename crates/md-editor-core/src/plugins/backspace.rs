use crate::plugin::{EditorPlugin, ExecuteContext, action};

/// Backspace at list and empty-block boundaries: removes list items and
/// empty elements instead of merging lines.
#[derive(Debug, Default)]
pub struct BackspacePlugin;

impl EditorPlugin for BackspacePlugin {
    fn id(&self) -> &'static str {
        "backspace"
    }

    fn actions(&self) -> &'static [&'static str] {
        &[action::BACKSPACE]
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<()> {
        if self.backspace_from_range(ctx) {
            ctx.logger.debug("Prohibiting Backspace");
            ctx.prevent_default();
        }
        Ok(())
    }
}

impl BackspacePlugin {
    fn backspace_from_range(&self, ctx: &mut ExecuteContext<'_>) -> bool {
        let Some(range) = ctx.editor.get_range(ctx.document) else {
            return false;
        };
        if !range.collapsed() {
            return false;
        }
        let container = range.start_container();
        let doc = &mut *ctx.document;
        let editor = ctx.editor;

        if doc.is_tag(container, &["ul", "ol"]) {
            let Some(item) = range
                .start_offset()
                .checked_sub(1)
                .and_then(|ix| doc.child_at(container, ix))
                .filter(|n| doc.is_element(*n))
            else {
                return false;
            };
            let focus = doc
                .previous_element_sibling(item)
                .or_else(|| doc.next_element_sibling(item));
            match focus {
                Some(focus) => {
                    ctx.logger.debug("Removing a list item.");
                    doc.detach(item);
                    editor.select_collapsed(doc, focus);
                }
                None => {
                    ctx.logger.debug("Removing a list item and adding new line.");
                    let line = editor.insert_new_line(doc, container, true);
                    doc.detach(container);
                    if let Some(line) = line {
                        editor.select_collapsed(doc, line);
                    }
                }
            }
            return true;
        }

        let is_blank = doc.text_content(container).trim().is_empty();
        if doc.is_tag(container, &["li"]) && is_blank {
            ctx.logger.debug("Removing a list item.");
            if let Some(focus) = editor.remove_list_item(doc, container) {
                editor.select_collapsed(doc, focus);
            }
            return true;
        }
        if doc.is_element(container)
            && is_blank
            && !doc.is_content_editable(container)
            && doc.parent_element(container).is_some()
        {
            ctx.logger.debug("Removing an empty element.");
            doc.detach(container);
            return true;
        }
        false
    }
}
