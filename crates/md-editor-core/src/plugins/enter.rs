use anyhow::Context as _;

use super::{is_code_fence, pre_caret_text, text_caret};
use crate::plugin::{EditorPlugin, ExecuteContext, action};

/// Enter after a fence marker opens a code block; Enter inside `pre`
/// leaves the block for a fresh paragraph unless Shift is held.
#[derive(Debug, Default)]
pub struct EnterPlugin;

impl EditorPlugin for EnterPlugin {
    fn id(&self) -> &'static str {
        "enter"
    }

    fn actions(&self) -> &'static [&'static str] {
        &[action::ENTER]
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<()> {
        if self.enter_from_range(ctx)? {
            ctx.logger.debug("Prohibiting Enter");
            ctx.prevent_default();
        }
        Ok(())
    }
}

impl EnterPlugin {
    fn enter_from_range(&self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<bool> {
        let Some(range) = ctx.editor.get_range(ctx.document) else {
            return Ok(false);
        };
        if !range.single_container() {
            ctx.logger
                .debug("Unable to process Enter key when multiple containers are selected.");
            return Ok(false);
        }
        if range.collapsed()
            && let Some(caret) = text_caret(ctx.document, &range)
            && is_code_fence(&pre_caret_text(ctx.document, &caret))
        {
            ctx.editor
                .replace_code_block(ctx.document, &caret)
                .context("fenced code block could not be placed")?;
            return Ok(true);
        }

        let Some(block) = ctx
            .editor
            .find_parent_non_text_element(ctx.document, range.start_container())
        else {
            return Ok(false);
        };
        if !ctx.document.is_tag(block, &["pre"]) || ctx.shift_key() {
            return Ok(false);
        }
        let line = ctx
            .editor
            .insert_new_line(ctx.document, block, true)
            .context("no line could be added after the code block")?;
        ctx.editor.select_collapsed(ctx.document, line);
        Ok(true)
    }
}
