use crate::plugin::{EditorPlugin, ExecuteContext, action};

/// Delete over the whole content of one node removes the node itself.
#[derive(Debug, Default)]
pub struct DeletePlugin;

impl EditorPlugin for DeletePlugin {
    fn id(&self) -> &'static str {
        "delete"
    }

    fn actions(&self) -> &'static [&'static str] {
        &[action::DELETE]
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<()> {
        let Some(range) = ctx.editor.get_range(ctx.document) else {
            return Ok(());
        };
        if !range.single_container() {
            return Ok(());
        }
        let node = range.start_container();
        let length = ctx.document.text_content(node).chars().count();
        if range.start_offset() != 0 || range.end_offset() != length {
            return Ok(());
        }
        if ctx.document.is_content_editable(node) || ctx.document.parent(node).is_none() {
            return Ok(());
        }
        ctx.logger.debug(format!(
            "Removing a node. {}",
            ctx.document.node_name(node)
        ));
        ctx.document.detach(node);
        ctx.logger.debug("Prohibiting Delete");
        ctx.prevent_default();
        Ok(())
    }
}
