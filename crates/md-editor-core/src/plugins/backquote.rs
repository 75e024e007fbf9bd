use crate::dom::{text_after, text_before};
use crate::plugin::{EditorPlugin, ExecuteContext, action};
use crate::selection::Range;

/// Wraps text in inline `code`: either the selected run, or the text typed
/// since an opening backquote when the closing one is typed.
#[derive(Debug, Default)]
pub struct BackquotePlugin;

impl EditorPlugin for BackquotePlugin {
    fn id(&self) -> &'static str {
        "backquote"
    }

    fn actions(&self) -> &'static [&'static str] {
        &[action::BACKQUOTE]
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<()> {
        let Some(range) = ctx.editor.get_range(ctx.document) else {
            return Ok(());
        };
        let handled = if range.collapsed() {
            self.code_for_caret(ctx, &range)
        } else {
            self.surround_code(ctx, &range)
        };
        if handled {
            ctx.logger.debug("Prohibiting Backquote");
            ctx.prevent_default();
        }
        Ok(())
    }
}

impl BackquotePlugin {
    fn code_for_caret(&self, ctx: &mut ExecuteContext<'_>, range: &Range) -> bool {
        let node = range.start_container();
        let content = ctx.document.text_content(node);
        let pre = text_before(&content, range.start_offset());
        // An even count means every backquote before the caret is closed.
        if pre.matches('`').count() % 2 == 0 {
            return false;
        }
        let Some(index) = pre.rfind('`') else {
            return false;
        };
        let code_content = &pre[index + 1..];
        // A trailing backquote may still grow into a fence.
        if code_content.is_empty() {
            return false;
        }
        if !ctx.document.is_text(node) {
            ctx.logger
                .debug("Unsupported action code surround for an element node.");
            return false;
        }

        let before = pre[..index].to_string();
        let after = text_after(&content, range.start_offset()).to_string();
        let doc = &mut *ctx.document;
        let code = doc.create_element("code");
        if doc.set_text_content(code, code_content).is_err() {
            return false;
        }
        if !ctx
            .editor
            .replace_text_node_content(doc, node, &before, code, &after)
        {
            return false;
        }
        if let Some(next) = doc.next_sibling(code) {
            ctx.editor.select_collapsed(doc, next);
        }
        true
    }

    fn surround_code(&self, ctx: &mut ExecuteContext<'_>, range: &Range) -> bool {
        if !range.single_container() {
            ctx.logger.debug(
                "Unable to surround a range with `code` as range spans over non text elements",
            );
            return false;
        }
        ctx.logger
            .debug("surrounding the selection with the code element");
        let code = ctx.document.create_element("code");
        ctx.editor.surround_contents(ctx.document, range, code)
    }
}
