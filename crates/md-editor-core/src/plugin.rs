use std::collections::HashMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use slotmap::{SlotMap, new_key_type};

use crate::content_editable::ContentEditableEditor;
use crate::dom::{Document, NodeId};
use crate::logger::Logger;

pub mod action {
    pub const BACKQUOTE: &str = "Backquote";
    pub const ENTER: &str = "Enter";
    pub const SPACE: &str = "Space";
    pub const BACKSPACE: &str = "Backspace";
    pub const DELETE: &str = "Delete";
    pub const SELECTION: &str = "selection";
    pub const KEYDOWN: &str = "keydown";
}

new_key_type! { pub struct PluginId; }

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub code: String,
    pub shift_key: bool,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            shift_key: false,
            default_prevented: false,
        }
    }

    pub fn shift(mut self, shift_key: bool) -> Self {
        self.shift_key = shift_key;
        self
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

/// Everything a plugin gets for one dispatch. Built fresh for every
/// `execute_action` call.
pub struct ExecuteContext<'a> {
    pub container: NodeId,
    pub editor: &'a ContentEditableEditor,
    pub document: &'a mut Document,
    pub logger: &'a Logger,
    pub args: Option<&'a mut KeyEvent>,
}

impl ExecuteContext<'_> {
    pub fn prevent_default(&mut self) {
        if let Some(event) = self.args.as_deref_mut() {
            event.prevent_default();
        }
    }

    pub fn shift_key(&self) -> bool {
        self.args.as_deref().is_some_and(|e| e.shift_key)
    }
}

pub trait EditorPlugin {
    fn id(&self) -> &'static str;
    fn actions(&self) -> &'static [&'static str];
    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<()>;
    fn destroy(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginFault {
    pub action: String,
    pub plugin: &'static str,
    pub message: String,
}

pub enum PluginTarget<'a> {
    Action(&'a str),
    Instance(PluginId),
}

impl<'a> From<&'a str> for PluginTarget<'a> {
    fn from(value: &'a str) -> Self {
        PluginTarget::Action(value)
    }
}

impl From<PluginId> for PluginTarget<'_> {
    fn from(value: PluginId) -> Self {
        PluginTarget::Instance(value)
    }
}

type FaultHook = Box<dyn FnMut(&PluginFault)>;

/// Action name to ordered plugin list. A plugin runs once per action it
/// declares, in registration order.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: SlotMap<PluginId, Box<dyn EditorPlugin>>,
    actions: HashMap<String, Vec<PluginId>>,
    logger: Logger,
    fault_hook: Option<FaultHook>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn debug(&self) -> bool {
        self.logger.enabled()
    }

    pub fn set_debug(&self, debug: bool) {
        self.logger.set_enabled(debug);
    }

    pub fn set_fault_hook(&mut self, hook: impl FnMut(&PluginFault) + 'static) {
        self.fault_hook = Some(Box::new(hook));
    }

    pub fn clear_fault_hook(&mut self) {
        self.fault_hook = None;
    }

    pub fn register_plugin(&mut self, plugin: Box<dyn EditorPlugin>) -> PluginId {
        let actions = plugin.actions();
        let id = self.plugins.insert(plugin);
        for action in actions {
            self.actions.entry(action.to_string()).or_default().push(id);
        }
        id
    }

    pub fn has_plugin(&self, action: &str, instance: Option<PluginId>) -> bool {
        let Some(list) = self.actions.get(action) else {
            return false;
        };
        match instance {
            Some(id) => list.contains(&id),
            None => !list.is_empty(),
        }
    }

    pub fn plugin(&self, id: PluginId) -> Option<&dyn EditorPlugin> {
        self.plugins.get(id).map(|p| p.as_ref())
    }

    pub fn unregister_plugin<'a>(&mut self, target: impl Into<PluginTarget<'a>>) {
        match target.into() {
            PluginTarget::Action(action) => self.clear_action(action),
            PluginTarget::Instance(id) => self.unregister_instance(id),
        }
    }

    pub fn unregister_all_plugins(&mut self) {
        let actions: Vec<String> = self.actions.keys().cloned().collect();
        for action in actions {
            self.clear_action(&action);
        }
    }

    fn clear_action(&mut self, action: &str) {
        let Some(ids) = self.actions.remove(action) else {
            return;
        };
        for id in ids {
            if let Some(plugin) = self.plugins.get_mut(id) {
                plugin.destroy();
            }
            self.release_if_orphaned(id);
        }
    }

    fn unregister_instance(&mut self, id: PluginId) {
        let Some(plugin) = self.plugins.get_mut(id) else {
            return;
        };
        let mut found = false;
        for action in plugin.actions() {
            if let Some(list) = self.actions.get_mut(*action) {
                if let Some(ix) = list.iter().position(|p| *p == id) {
                    list.remove(ix);
                    found = true;
                }
            }
        }
        if found {
            plugin.destroy();
        }
        self.actions.retain(|_, list| !list.is_empty());
        self.release_if_orphaned(id);
    }

    fn release_if_orphaned(&mut self, id: PluginId) {
        if !self.actions.values().any(|list| list.contains(&id)) {
            self.plugins.remove(id);
        }
    }

    /// Runs every plugin registered for `action`. A plugin that fails or
    /// panics is reported to the fault hook and skipped.
    pub fn execute_action(
        &mut self,
        action: &str,
        container: NodeId,
        editor: &ContentEditableEditor,
        document: &mut Document,
        args: Option<&mut KeyEvent>,
    ) {
        let Some(ids) = self.actions.get(action).cloned() else {
            return;
        };
        if ids.is_empty() {
            return;
        }

        let Self {
            plugins,
            logger,
            fault_hook,
            ..
        } = self;
        let mut ctx = ExecuteContext {
            container,
            editor,
            document,
            logger,
            args,
        };

        for id in ids {
            let Some(plugin) = plugins.get_mut(id) else {
                continue;
            };
            let result = catch_unwind(AssertUnwindSafe(|| plugin.execute(&mut ctx)));
            let message = match result {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => format!("{err:#}"),
                Err(panic) => panic_message(panic.as_ref()),
            };
            if let Some(hook) = fault_hook.as_mut() {
                hook(&PluginFault {
                    action: action.to_string(),
                    plugin: plugin.id(),
                    message,
                });
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "plugin panicked".to_string()
    }
}
