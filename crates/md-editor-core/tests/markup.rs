use md_editor_core::{
    ComrakRenderer, DefaultSanitizer, Document, Fragment, MarkdownRenderer, MarkdownSerializer,
    MarkupSerializer, RenderOptions, RenderPipeline, Sanitizer,
};

fn render(markdown: &str, options: &RenderOptions) -> String {
    ComrakRenderer.render(markdown, options).unwrap()
}

#[test]
fn renders_commonmark_blocks() {
    let html = render("# Title\n\n- a\n- b\n", &RenderOptions::default());
    assert!(html.contains("<h1>Title</h1>"));
    assert!(html.contains("<li>a</li>"));
}

#[test]
fn line_break_mode() {
    let soft = render("a\nb", &RenderOptions::default());
    let hard = render("a\nb", &RenderOptions::default().breaks(true));
    assert!(!soft.contains("<br"));
    assert!(hard.contains("<br"));
}

#[test]
fn pedantic_mode_drops_extensions() {
    let gfm = render("~~gone~~", &RenderOptions::default());
    let plain = render("~~gone~~", &RenderOptions::default().pedantic(true));
    assert!(gfm.contains("<del>gone</del>"));
    assert!(!plain.contains("<del>"));
}

#[test]
fn smart_punctuation() {
    let html = render("\"quoted\"", &RenderOptions::default().smartypants(true));
    assert!(html.contains('\u{201c}'));
    assert!(html.contains('\u{201d}'));
}

#[test]
fn highlight_callback_sees_code_and_language() {
    let options = RenderOptions::default()
        .highlight(|code, lang| format!("<span class=\"hl\">[{lang}]{}</span>", code.trim_end()));
    let html = render("```rust\nfn main() {}\n```\n\nuse `x`\n", &options);

    assert!(html.contains(
        "<pre><code class=\"language-rust\"><span class=\"hl\">[rust]fn main() {}</span></code></pre>"
    ));
    assert!(html.contains("<code><span class=\"hl\">[]x</span></code>"));
}

#[test]
fn tag_overrides_rename_output_tags() {
    let options = RenderOptions::default().override_tag("H1", "h2");
    let html = render("# Title", &options);
    assert!(html.contains("<h2>Title</h2>"));
    assert!(!html.contains("<h1>"));
}

#[test]
fn default_sanitizer_strips_scripts_and_handlers() {
    let dirty = "<p onclick=\"steal()\">a</p><script>alert(1)</script><a href=\"javascript:x()\">l</a>";
    assert_eq!(DefaultSanitizer.sanitize(dirty), "<p>a</p><a>l</a>");
}

#[test]
fn default_sanitizer_sees_through_encoding_and_odd_separators() {
    let encoded = DefaultSanitizer.sanitize("<a href=\"jav&#x61;script:alert(1)\">x</a>");
    assert_eq!(encoded, "<a>x</a>");

    let slashed = DefaultSanitizer.sanitize("<svg/onload=alert(1)>");
    assert!(!slashed.contains("onload"));

    let image = DefaultSanitizer.sanitize("<img src=\"x.png\"/onerror=alert(1)>");
    assert!(image.contains("<img"));
    assert!(!image.contains("onerror"));
}

#[test]
fn pipeline_with_highlighter_drops_encoded_script_urls() {
    let options = RenderOptions::default().highlight(|code, _| code.to_string());
    let html = RenderPipeline::new(ComrakRenderer)
        .options(options)
        .render("<a href=\"jav&#x61;script:alert(1)\">x</a>")
        .unwrap();

    assert!(html.contains("<a>x</a>"));
    assert!(!html.contains("script"));
}

#[test]
fn default_sanitizer_keeps_highlight_markup() {
    let html = "<pre><code class=\"language-rust\"><span class=\"kw\">fn</span></code></pre>";
    assert_eq!(DefaultSanitizer.sanitize(html), html);
}

#[test]
fn pipeline_sanitizes_unless_disabled_or_overridden() {
    let markdown = "<b onmouseover=\"x()\">hi</b>";
    let options = RenderOptions::default().highlight(|code, _| code.to_string());

    let sanitized = RenderPipeline::new(ComrakRenderer)
        .options(options.clone())
        .render(markdown)
        .unwrap();
    assert!(sanitized.contains("<b>hi</b>"));

    let raw = RenderPipeline::new(ComrakRenderer)
        .options(options.clone())
        .sanitize(false)
        .render(markdown)
        .unwrap();
    assert!(raw.contains("onmouseover"));

    let custom = RenderPipeline::new(ComrakRenderer)
        .sanitize(false)
        .sanitizer(|html: &str| html.to_uppercase())
        .render("plain")
        .unwrap();
    assert_eq!(custom.trim(), "<P>PLAIN</P>");
}

#[test]
fn serializer_walks_editor_tree() {
    let mut doc = Document::new();
    let root = doc
        .append_fragment(
            doc.root(),
            &Fragment::editable([
                Fragment::element("h2", [Fragment::text("Title")]),
                Fragment::element(
                    "p",
                    [
                        Fragment::text("a "),
                        Fragment::element("code", [Fragment::text("b")]),
                        Fragment::text(" "),
                        Fragment::element("strong", [Fragment::text("c")]),
                    ],
                ),
                Fragment::element(
                    "ul",
                    [
                        Fragment::element("li", [Fragment::text("x")]),
                        Fragment::element(
                            "li",
                            [
                                Fragment::text("y"),
                                Fragment::element(
                                    "ol",
                                    [Fragment::element("li", [Fragment::text("z")])],
                                ),
                            ],
                        ),
                    ],
                ),
                Fragment::element(
                    "pre",
                    [Fragment::element("code", [Fragment::text("fn main() {}")])
                        .attr("class", "language-rust")],
                ),
            ]),
        )
        .unwrap();

    assert_eq!(
        MarkdownSerializer.serialize(&doc, root),
        "## Title\n\na `b` **c**\n\n- x\n- y\n   1. z\n\n```rust\nfn main() {}\n```\n"
    );
}

#[test]
fn serializer_drops_placeholder_language() {
    let mut doc = Document::new();
    let root = doc
        .append_fragment(
            doc.root(),
            &Fragment::editable([Fragment::element(
                "pre",
                [Fragment::element("code", [Fragment::text(" ")]).attr("class", "language-none")],
            )]),
        )
        .unwrap();

    assert_eq!(MarkdownSerializer.serialize(&doc, root), "```\n \n```\n");
}
