use anyhow::Context as _;

use super::{is_code_fence, pre_caret_text, text_caret};
use crate::dom::text_after;
use crate::plugin::{EditorPlugin, ExecuteContext, action};
use crate::selection::Range;

const HEADINGS: [&str; 6] = ["#", "##", "###", "####", "#####", "######"];

/// Space after a list, heading, or fence marker turns the line into that
/// block.
#[derive(Debug, Default)]
pub struct SpacePlugin;

impl EditorPlugin for SpacePlugin {
    fn id(&self) -> &'static str {
        "space"
    }

    fn actions(&self) -> &'static [&'static str] {
        &[action::SPACE]
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<()> {
        if self.space_from_range(ctx)? {
            ctx.logger.debug("Prohibiting Space");
            ctx.prevent_default();
        }
        Ok(())
    }
}

impl SpacePlugin {
    fn space_from_range(&self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<bool> {
        let Some(range) = ctx.editor.get_range(ctx.document) else {
            return Ok(false);
        };
        if !range.collapsed() {
            return Ok(false);
        }
        let Some(range) = text_caret(ctx.document, &range) else {
            return Ok(false);
        };
        let marker = pre_caret_text(ctx.document, &range);
        match marker.as_str() {
            "-" => {
                ctx.logger.debug("Creating an unordered list");
                self.create_list(ctx, &range, "ul")?;
            }
            "1." => {
                ctx.logger.debug("Creating an ordered list");
                self.create_list(ctx, &range, "ol")?;
            }
            m if HEADINGS.contains(&m) => {
                ctx.logger.debug(format!("Creating a header H{}", m.len()));
                self.create_heading(ctx, &range, m.len() as u8)?;
            }
            m if is_code_fence(m) => {
                ctx.logger.debug("Inserting a code block.");
                ctx.editor
                    .replace_code_block(ctx.document, &range)
                    .context("fenced code block could not be placed")?;
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Text typed after the caret, which moves into the new block.
    fn remainder(&self, ctx: &ExecuteContext<'_>, range: &Range) -> String {
        let content = ctx.document.text_content(range.start_container());
        text_after(&content, range.start_offset()).trim_start().to_string()
    }

    fn create_list(
        &self,
        ctx: &mut ExecuteContext<'_>,
        range: &Range,
        tag: &str,
    ) -> anyhow::Result<()> {
        let remainder = self.remainder(ctx, range);
        let doc = &mut *ctx.document;
        let list = doc.create_element(tag);
        let item = doc.create_element("li");
        doc.append_child(list, item)?;
        if !remainder.is_empty() {
            doc.set_text_content(item, &remainder)?;
        }
        anyhow::ensure!(
            ctx.editor.replace_node(doc, range.start_container(), list),
            "the list marker is not attached to the document"
        );
        ctx.editor.select_collapsed(doc, item);
        Ok(())
    }

    fn create_heading(
        &self,
        ctx: &mut ExecuteContext<'_>,
        range: &Range,
        weight: u8,
    ) -> anyhow::Result<()> {
        let typed = range.start_container();
        let remainder = self.remainder(ctx, range);
        let doc = &mut *ctx.document;
        let block = ctx.editor.find_parent_non_text_element(doc, typed);
        let header = ctx
            .editor
            .add_headline(doc, weight, typed, false)
            .context("no block to place the heading next to")?;
        if !remainder.is_empty() {
            doc.set_text_content(header, &remainder)?;
        }
        doc.detach(typed);
        // The marker was the only content of its line.
        if let Some(block) = block
            && !doc.is_content_editable(block)
            && !doc.has_child_nodes(block)
        {
            doc.detach(block);
        }
        ctx.editor.select_collapsed(doc, header);
        Ok(())
    }
}
