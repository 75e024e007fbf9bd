mod common;

use common::{Fixture, caret, select};
use md_editor_core::{Fragment, NBSP};

#[test]
fn closing_backquote_wraps_typed_text_in_code() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("a `code")]);
    let text = fx.text_in("p");
    caret(&mut fx.doc, text, 7);

    let event = fx.press("Backquote");

    assert!(event.default_prevented());
    assert_eq!(fx.html(), "<p>a <code>code</code>&nbsp;</p>");
    let range = fx.range();
    assert!(range.collapsed());
    assert_eq!(range.start_offset(), 0);
    assert_eq!(fx.doc.text_content(range.start_container()), NBSP.to_string());
}

#[test]
fn text_after_the_caret_follows_the_code() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("`x tail")]);
    let text = fx.text_in("p");
    caret(&mut fx.doc, text, 2);

    fx.press("Backquote");

    assert_eq!(fx.html(), "<p><code>x</code> tail</p>");
}

#[test]
fn fence_in_progress_is_not_hijacked() {
    for typed in ["", "`", "``", "plain"] {
        let mut fx = Fixture::new(vec![Fragment::paragraph(typed)]);
        let text = fx.text_in("p");
        caret(&mut fx.doc, text, typed.chars().count());

        let event = fx.press("Backquote");

        assert!(!event.default_prevented(), "{typed:?}");
        assert_eq!(fx.html(), format!("<p>{typed}</p>"));
    }
}

#[test]
fn selection_is_surrounded_with_code() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("hello world")]);
    let text = fx.text_in("p");
    select(&mut fx.doc, text, 6, text, 11);

    let event = fx.press("Backquote");

    assert!(event.default_prevented());
    assert_eq!(fx.html(), "<p>hello <code>world</code></p>");
    let range = fx.range();
    assert_eq!(fx.doc.node_name(range.start_container()), "P");
    assert_eq!((range.start_offset(), range.end_offset()), (1, 2));
}

#[test]
fn selection_across_containers_declines() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("a"), Fragment::paragraph("b")]);
    let first = fx.text_in("p");
    let second = fx
        .editor
        .editor()
        .find_first_text(&fx.doc, fx.doc.last_child(fx.root).unwrap())
        .unwrap();
    select(&mut fx.doc, first, 0, second, 1);

    let event = fx.press("Backquote");

    assert!(!event.default_prevented());
    assert_eq!(fx.html(), "<p>a</p><p>b</p>");
}

#[test]
fn only_the_unmatched_backquote_opens_the_span() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("a `x` b `y")]);
    let text = fx.text_in("p");
    caret(&mut fx.doc, text, 10);

    let event = fx.press("Backquote");

    assert!(event.default_prevented());
    assert_eq!(fx.html(), "<p>a `x` b <code>y</code>&nbsp;</p>");
}

#[test]
fn balanced_backquotes_decline() {
    let mut fx = Fixture::new(vec![Fragment::paragraph("a `x` b")]);
    let text = fx.text_in("p");
    caret(&mut fx.doc, text, 7);

    let event = fx.press("Backquote");

    assert!(!event.default_prevented());
    assert_eq!(fx.html(), "<p>a `x` b</p>");
}
