use crate::config::EditorConfig;
use crate::content_editable::ContentEditableEditor;
use crate::dom::{Document, NodeId};
use crate::plugin::{
    EditorPlugin, KeyEvent, PluginFault, PluginId, PluginRegistry, PluginTarget, action,
};
use crate::plugins::default_plugins;

pub const NUMPAD_ENTER: &str = "NumpadEnter";

/// Routes keyboard and selection events of one editable root to the
/// registered shorthand plugins.
///
/// The host owns the [`Document`] and hands it in with every event.
pub struct MarkdownEditor {
    root: NodeId,
    editor: ContentEditableEditor,
    registry: PluginRegistry,
    listening: bool,
}

impl MarkdownEditor {
    pub fn new(root: NodeId) -> Self {
        Self::with_config(root, EditorConfig::default())
    }

    pub fn with_config(root: NodeId, config: EditorConfig) -> Self {
        let registry = PluginRegistry::new();
        registry.set_debug(config.debug);
        Self {
            root,
            editor: ContentEditableEditor::new(config),
            registry,
            listening: false,
        }
    }

    pub fn with_default_plugins(mut self) -> Self {
        for plugin in default_plugins() {
            self.registry.register_plugin(plugin);
        }
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn editor(&self) -> &ContentEditableEditor {
        &self.editor
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn debug(&self) -> bool {
        self.registry.debug()
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.registry.set_debug(debug);
    }

    pub fn set_fault_hook(&mut self, hook: impl FnMut(&PluginFault) + 'static) {
        self.registry.set_fault_hook(hook);
    }

    pub fn listen(&mut self) {
        self.listening = true;
        self.registry.logger().debug("Listening for editor events");
    }

    pub fn unlisten(&mut self) {
        self.listening = false;
        self.registry.logger().debug("Stopped listening for editor events");
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn EditorPlugin>) -> PluginId {
        self.registry.register_plugin(plugin)
    }

    pub fn has_plugin(&self, action: &str, instance: Option<PluginId>) -> bool {
        self.registry.has_plugin(action, instance)
    }

    pub fn unregister_plugin<'a>(&mut self, target: impl Into<PluginTarget<'a>>) {
        self.registry.unregister_plugin(target);
    }

    pub fn unregister_all_plugins(&mut self) {
        self.registry.unregister_all_plugins();
    }

    pub fn execute_action(&mut self, doc: &mut Document, action: &str, args: Option<&mut KeyEvent>) {
        self.registry
            .execute_action(action, self.root, &self.editor, doc, args);
    }

    pub fn handle_keydown(&mut self, doc: &mut Document, event: &mut KeyEvent) {
        if !self.listening {
            return;
        }
        self.execute_action(doc, action::KEYDOWN, Some(&mut *event));
        let key_action = match event.code.as_str() {
            action::BACKQUOTE | action::ENTER | action::SPACE | action::BACKSPACE
            | action::DELETE => event.code.clone(),
            NUMPAD_ENTER => action::ENTER.to_string(),
            _ => return,
        };
        self.execute_action(doc, &key_action, Some(event));
    }

    pub fn handle_selection_change(&mut self, doc: &mut Document) {
        if !self.listening {
            return;
        }
        let Some(active) = doc.active_element() else {
            return;
        };
        if !doc.contains(self.root, active) {
            return;
        }
        self.execute_action(doc, action::SELECTION, None);
    }

    /// Tears down every plugin and stops listening.
    pub fn destroy(&mut self) {
        self.unlisten();
        self.unregister_all_plugins();
    }
}
