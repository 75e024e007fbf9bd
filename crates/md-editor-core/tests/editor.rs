mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{Fixture, caret};
use md_editor_core::{
    Document, EditorConfig, EditorPlugin, ExecuteContext, Fragment, KeyEvent, MarkdownEditor,
    action,
};

type Log = Rc<RefCell<Vec<String>>>;

struct Recorder {
    actions: &'static [&'static str],
    log: Log,
}

impl EditorPlugin for Recorder {
    fn id(&self) -> &'static str {
        "recorder"
    }

    fn actions(&self) -> &'static [&'static str] {
        self.actions
    }

    fn execute(&mut self, ctx: &mut ExecuteContext<'_>) -> anyhow::Result<()> {
        let code = ctx.args.as_deref().map(|e| e.code.clone());
        self.log
            .borrow_mut()
            .push(format!("{}:{}", self.actions[0], code.unwrap_or_default()));
        Ok(())
    }
}

fn recording_editor(actions: &'static [&'static str]) -> (Document, MarkdownEditor, Log) {
    let mut doc = Document::new();
    let root = doc
        .append_fragment(doc.root(), &Fragment::editable([Fragment::paragraph("a")]))
        .unwrap();
    let log = Log::default();
    let mut editor = MarkdownEditor::new(root);
    for action in actions {
        editor.register_plugin(Box::new(Recorder {
            actions: std::slice::from_ref(action),
            log: log.clone(),
        }));
    }
    editor.listen();
    (doc, editor, log)
}

#[test]
fn keydown_runs_before_the_key_action() {
    let (mut doc, mut editor, log) = recording_editor(&[action::KEYDOWN, action::ENTER]);

    editor.handle_keydown(&mut doc, &mut KeyEvent::new("Enter"));

    assert_eq!(*log.borrow(), vec!["keydown:Enter", "Enter:Enter"]);
}

#[test]
fn numpad_enter_dispatches_enter() {
    let (mut doc, mut editor, log) = recording_editor(&[action::KEYDOWN, action::ENTER]);

    editor.handle_keydown(&mut doc, &mut KeyEvent::new("NumpadEnter"));

    assert_eq!(*log.borrow(), vec!["keydown:NumpadEnter", "Enter:NumpadEnter"]);
}

#[test]
fn other_keys_only_dispatch_keydown() {
    let (mut doc, mut editor, log) =
        recording_editor(&[action::KEYDOWN, action::SPACE, action::DELETE]);

    editor.handle_keydown(&mut doc, &mut KeyEvent::new("KeyA"));
    editor.handle_keydown(&mut doc, &mut KeyEvent::new("Delete"));

    assert_eq!(
        *log.borrow(),
        vec!["keydown:KeyA", "keydown:Delete", "Delete:Delete"]
    );
}

#[test]
fn events_are_ignored_when_not_listening() {
    let (mut doc, mut editor, log) = recording_editor(&[action::KEYDOWN, action::SELECTION]);
    editor.unlisten();
    assert!(!editor.is_listening());

    editor.handle_keydown(&mut doc, &mut KeyEvent::new("Space"));
    let root = editor.root();
    doc.focus(root);
    editor.handle_selection_change(&mut doc);

    assert!(log.borrow().is_empty());
}

#[test]
fn selection_change_is_scoped_to_the_root() {
    let (mut doc, mut editor, log) = recording_editor(&[action::SELECTION]);
    let outside = doc
        .append_fragment(doc.root(), &Fragment::paragraph("outside"))
        .unwrap();

    editor.handle_selection_change(&mut doc);
    doc.focus(outside);
    editor.handle_selection_change(&mut doc);
    assert!(log.borrow().is_empty());

    let inner = doc.first_child(editor.root()).unwrap();
    doc.focus(inner);
    editor.handle_selection_change(&mut doc);
    let root = editor.root();
    doc.focus(root);
    editor.handle_selection_change(&mut doc);

    assert_eq!(*log.borrow(), vec!["selection:", "selection:"]);
}

#[test]
fn default_plugins_register_in_order() {
    let fx = Fixture::new(Vec::new());
    for action in [
        action::BACKQUOTE,
        action::ENTER,
        action::SPACE,
        action::BACKSPACE,
        action::DELETE,
    ] {
        assert!(fx.editor.has_plugin(action, None), "{action}");
    }
    assert!(!fx.editor.has_plugin(action::SELECTION, None));
}

#[test]
fn destroy_unregisters_everything() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("-")]);
    let text = fx.text_in("p");
    caret(&mut fx.doc, text, 1);

    fx.editor.destroy();
    let event = fx.press("Space");

    assert!(!fx.editor.has_plugin(action::SPACE, None));
    assert!(!event.default_prevented());
    assert_eq!(fx.html(), "<p>-</p>");
}

#[test]
fn debug_follows_config_and_toggle() {
    let doc = Document::new();
    let mut editor = MarkdownEditor::with_config(doc.root(), EditorConfig::default().debug(true));
    assert!(editor.debug());
    editor.set_debug(false);
    assert!(!editor.debug());
    assert!(!editor.registry().logger().enabled());
}
