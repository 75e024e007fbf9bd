mod common;

use common::{Fixture, caret, empty, item, select};
use md_editor_core::Fragment;

#[test]
fn removing_only_item_drops_list_and_adds_line() {
    let mut fx = Fixture::new(vec![
        Fragment::paragraph("before"),
        Fragment::element("ul", [empty("li")]),
        Fragment::paragraph("after"),
    ]);
    let li = fx.doc.find_first(fx.root, "li").unwrap();
    caret(&mut fx.doc, li, 0);

    let event = fx.press("Backspace");

    assert!(event.default_prevented());
    assert!(fx.doc.find_first(fx.root, "ul").is_none());
    assert_eq!(fx.html(), "<p>before</p><p><br></p><p>after</p>");
    let range = fx.range();
    assert_eq!(fx.doc.index_of(range.start_container()), Some(1));
}

#[test]
fn removing_empty_item_keeps_other_items() {
    let mut fx = Fixture::new(vec![Fragment::element("ul", [item("a"), empty("li")])]);
    let li = fx.doc.last_child(fx.doc.find_first(fx.root, "ul").unwrap()).unwrap();
    caret(&mut fx.doc, li, 0);

    fx.press("Backspace");

    assert_eq!(fx.html(), "<ul><li>a</li></ul><p><br></p>");
}

#[test]
fn removing_empty_nested_item_continues_outer_list() {
    let mut fx = Fixture::new(vec![Fragment::element(
        "ul",
        [Fragment::element(
            "li",
            [Fragment::text("outer"), Fragment::element("ul", [empty("li")])],
        )],
    )]);
    let inner = fx.doc.find_all(fx.root, "li")[1];
    caret(&mut fx.doc, inner, 0);

    fx.press("Backspace");

    assert_eq!(fx.html(), "<ul><li>outer</li><li></li></ul>");
    assert_eq!(fx.doc.node_name(fx.range().start_container()), "LI");
}

#[test]
fn caret_after_item_in_list_container_removes_that_item() {
    let mut fx = Fixture::new(vec![Fragment::element("ul", [item("a"), item("b")])]);
    let ul = fx.doc.find_first(fx.root, "ul").unwrap();
    caret(&mut fx.doc, ul, 2);

    let event = fx.press("Backspace");

    assert!(event.default_prevented());
    assert_eq!(fx.html(), "<ul><li>a</li></ul>");
    let range = fx.range();
    assert_eq!(fx.doc.text_content(range.start_container()), "a");
}

#[test]
fn caret_after_last_remaining_item_replaces_list_with_line() {
    let mut fx = Fixture::new(vec![Fragment::element("ol", [item("a")])]);
    let ol = fx.doc.find_first(fx.root, "ol").unwrap();
    caret(&mut fx.doc, ol, 1);

    fx.press("Backspace");

    assert_eq!(fx.html(), "<p><br></p>");
}

#[test]
fn caret_at_start_of_list_container_declines() {
    let mut fx = Fixture::new(vec![Fragment::element("ul", [item("a")])]);
    let ul = fx.doc.find_first(fx.root, "ul").unwrap();
    caret(&mut fx.doc, ul, 0);

    let event = fx.press("Backspace");

    assert!(!event.default_prevented());
    assert_eq!(fx.html(), "<ul><li>a</li></ul>");
}

#[test]
fn empty_element_is_removed() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("x"), empty("p")]);
    let blank = fx.doc.last_child(fx.root).unwrap();
    caret(&mut fx.doc, blank, 0);

    let event = fx.press("Backspace");

    assert!(event.default_prevented());
    assert_eq!(fx.html(), "<p>x</p>");
}

#[test]
fn empty_editable_root_is_never_removed() {
    let mut fx = Fixture::new(Vec::new());
    let root = fx.root;
    caret(&mut fx.doc, root, 0);

    let event = fx.press("Backspace");

    assert!(!event.default_prevented());
    assert!(fx.doc.is_connected(root));
}

#[test]
fn text_and_ranges_decline() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("abc")]);
    let text = fx.text_in("p");
    caret(&mut fx.doc, text, 2);
    assert!(!fx.press("Backspace").default_prevented());

    select(&mut fx.doc, text, 0, text, 3);
    assert!(!fx.press("Backspace").default_prevented());
    assert_eq!(fx.html(), "<p>abc</p>");
}
