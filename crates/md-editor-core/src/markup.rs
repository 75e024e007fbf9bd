use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};
use comrak::{Arena, Options, format_html, parse_document};
use regex::Regex;

use crate::dom::{Document, NBSP, NodeId, NodeKind};

pub type Highlighter = Arc<dyn Fn(&str, &str) -> String + Send + Sync>;

#[derive(Clone, Default)]
pub struct RenderOptions {
    /// Single newlines become `<br>`.
    pub breaks: bool,
    /// Plain CommonMark, no GFM extensions.
    pub pedantic: bool,
    pub smartypants: bool,
    /// Output tag renames, e.g. `h1 -> h2`.
    pub tag_overrides: BTreeMap<String, String>,
    /// Called with `(code, lang)` for every code block and code span.
    pub highlight: Option<Highlighter>,
}

impl fmt::Debug for RenderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderOptions")
            .field("breaks", &self.breaks)
            .field("pedantic", &self.pedantic)
            .field("smartypants", &self.smartypants)
            .field("tag_overrides", &self.tag_overrides)
            .field("highlight", &self.highlight.is_some())
            .finish()
    }
}

impl RenderOptions {
    pub fn breaks(mut self, breaks: bool) -> Self {
        self.breaks = breaks;
        self
    }

    pub fn pedantic(mut self, pedantic: bool) -> Self {
        self.pedantic = pedantic;
        self
    }

    pub fn smartypants(mut self, smartypants: bool) -> Self {
        self.smartypants = smartypants;
        self
    }

    pub fn override_tag(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.tag_overrides
            .insert(from.into().to_ascii_lowercase(), to.into());
        self
    }

    pub fn highlight(mut self, f: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        self.highlight = Some(Arc::new(f));
        self
    }
}

pub trait MarkdownRenderer {
    fn render(&self, markdown: &str, options: &RenderOptions) -> anyhow::Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ComrakRenderer;

impl ComrakRenderer {
    fn comrak_options(options: &RenderOptions) -> Options {
        let mut out = Options::default();
        if !options.pedantic {
            out.extension.strikethrough = true;
            out.extension.table = true;
            out.extension.autolink = true;
            out.extension.tasklist = true;
        }
        out.parse.smart = options.smartypants;
        out.render.hardbreaks = options.breaks;
        // Highlighted code is spliced in as raw HTML.
        out.render.unsafe_ = options.highlight.is_some();
        out
    }

    fn apply_highlighter<'a>(root: &'a AstNode<'a>, highlight: &Highlighter) {
        for node in root.descendants() {
            let mut ast = node.data.borrow_mut();
            let replacement = match &ast.value {
                NodeValue::CodeBlock(block) => {
                    let lang = block.info.split_whitespace().next().unwrap_or("");
                    let body = highlight(&block.literal, lang);
                    let html = if lang.is_empty() {
                        format!("<pre><code>{body}</code></pre>\n")
                    } else {
                        format!(
                            "<pre><code class=\"language-{}\">{body}</code></pre>\n",
                            escape_html(lang)
                        )
                    };
                    NodeValue::HtmlBlock(NodeHtmlBlock {
                        block_type: 0,
                        literal: html,
                    })
                }
                NodeValue::Code(code) => {
                    let body = highlight(&code.literal, "");
                    NodeValue::HtmlInline(format!("<code>{body}</code>"))
                }
                _ => continue,
            };
            ast.value = replacement;
        }
    }
}

impl MarkdownRenderer for ComrakRenderer {
    fn render(&self, markdown: &str, options: &RenderOptions) -> anyhow::Result<String> {
        let arena = Arena::new();
        let comrak_options = Self::comrak_options(options);
        let root = parse_document(&arena, markdown, &comrak_options);
        if let Some(highlight) = &options.highlight {
            Self::apply_highlighter(root, highlight);
        }
        let mut buf = Vec::new();
        format_html(root, &comrak_options, &mut buf)?;
        let html = String::from_utf8(buf)?;
        Ok(rename_tags(&html, &options.tag_overrides))
    }
}

fn rename_tags(html: &str, overrides: &BTreeMap<String, String>) -> String {
    let mut out = html.to_string();
    for (from, to) in overrides {
        let Ok(re) = Regex::new(&format!(r"(?i)<(/?){}\b", regex::escape(from))) else {
            continue;
        };
        out = re.replace_all(&out, format!("<${{1}}{to}")).into_owned();
    }
    out
}

pub trait Sanitizer {
    fn sanitize(&self, html: &str) -> String;
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> String,
{
    fn sanitize(&self, html: &str) -> String {
        self(html)
    }
}

/// Allow-list sanitizer over a parsed tree. Entities are decoded before
/// URL schemes are checked, and anything outside the list (script-capable
/// elements, `on*` handlers, `javascript:` URLs) is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSanitizer;

impl DefaultSanitizer {
    fn builder() -> ammonia::Builder<'static> {
        let mut builder = ammonia::Builder::default();
        builder
            .link_rel(None)
            // Highlighted code and `language-*` classes.
            .add_generic_attributes(&["class"])
            // Task list checkboxes.
            .add_tags(&["input"])
            .add_tag_attributes("input", &["type", "checked", "disabled"])
            .add_tag_attributes("th", &["align"])
            .add_tag_attributes("td", &["align"]);
        builder
    }
}

impl Sanitizer for DefaultSanitizer {
    fn sanitize(&self, html: &str) -> String {
        Self::builder().clean(html).to_string()
    }
}

/// Render, then sanitize before the markup reaches the live tree.
pub struct RenderPipeline<R = ComrakRenderer> {
    renderer: R,
    options: RenderOptions,
    sanitize: bool,
    sanitizer: Option<Box<dyn Sanitizer>>,
}

impl Default for RenderPipeline<ComrakRenderer> {
    fn default() -> Self {
        Self::new(ComrakRenderer)
    }
}

impl<R: MarkdownRenderer> RenderPipeline<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            options: RenderOptions::default(),
            sanitize: true,
            sanitizer: None,
        }
    }

    pub fn options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    pub fn sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        self.sanitizer = Some(Box::new(sanitizer));
        self
    }

    pub fn render(&self, markdown: &str) -> anyhow::Result<String> {
        let html = self.renderer.render(markdown, &self.options)?;
        if let Some(sanitizer) = &self.sanitizer {
            return Ok(sanitizer.sanitize(&html));
        }
        if !self.sanitize {
            return Ok(html);
        }
        Ok(DefaultSanitizer.sanitize(&html))
    }
}

pub trait MarkupSerializer {
    fn serialize(&self, doc: &Document, root: NodeId) -> String;
}

/// Walks an editor subtree back into Markdown text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownSerializer;

impl MarkupSerializer for MarkdownSerializer {
    fn serialize(&self, doc: &Document, root: NodeId) -> String {
        let mut blocks = Vec::new();
        for &child in doc.children(root) {
            self.block(doc, child, 0, &mut blocks);
        }
        let mut out = blocks.join("\n\n");
        if !out.is_empty() {
            out.push('\n');
        }
        out
    }
}

impl MarkdownSerializer {
    fn block(&self, doc: &Document, node: NodeId, depth: usize, out: &mut Vec<String>) {
        let Some(tag) = doc.local_name(node) else {
            if doc.is_text(node) {
                let text = self.inline(doc, node);
                if !text.trim().is_empty() {
                    out.push(text.trim().to_string());
                }
            }
            return;
        };
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                out.push(format!(
                    "{} {}",
                    "#".repeat(level),
                    self.inline_children(doc, node).trim()
                ));
            }
            "ul" | "ol" => out.push(self.list(doc, node, depth)),
            "pre" => out.push(self.code_block(doc, node)),
            "hr" => out.push("---".to_string()),
            "blockquote" => {
                let mut inner = Vec::new();
                for &child in doc.children(node) {
                    self.block(doc, child, depth, &mut inner);
                }
                let quoted = inner
                    .join("\n\n")
                    .lines()
                    .map(|l| if l.is_empty() { ">".to_string() } else { format!("> {l}") })
                    .collect::<Vec<_>>()
                    .join("\n");
                out.push(quoted);
            }
            "div" if doc.children(node).iter().any(|c| self.is_block(doc, *c)) => {
                for &child in doc.children(node) {
                    self.block(doc, child, depth, out);
                }
            }
            _ => {
                let text = self.inline_children(doc, node);
                if !text.trim().is_empty() {
                    out.push(text.trim().to_string());
                }
            }
        }
    }

    fn is_block(&self, doc: &Document, node: NodeId) -> bool {
        doc.is_tag(
            node,
            &[
                "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "ul", "ol", "pre", "hr",
                "blockquote",
            ],
        )
    }

    fn list(&self, doc: &Document, list: NodeId, depth: usize) -> String {
        let ordered = doc.is_tag(list, &["ol"]);
        let indent = "   ".repeat(depth);
        let mut lines = Vec::new();
        for (ix, item) in doc.element_children(list).into_iter().enumerate() {
            let marker = if ordered {
                format!("{}.", ix + 1)
            } else {
                "-".to_string()
            };
            let mut text = String::new();
            let mut nested = Vec::new();
            for &child in doc.children(item) {
                if doc.is_tag(child, &["ul", "ol"]) {
                    nested.push(self.list(doc, child, depth + 1));
                } else {
                    text.push_str(&self.inline(doc, child));
                }
            }
            lines.push(format!("{indent}{marker} {}", text.trim()).trim_end().to_string());
            lines.extend(nested);
        }
        lines.join("\n")
    }

    fn code_block(&self, doc: &Document, pre: NodeId) -> String {
        let code = doc.find_first(pre, "code");
        let lang = code
            .and_then(|c| doc.attr(c, "class"))
            .and_then(|class| {
                class
                    .split_whitespace()
                    .find_map(|c| c.strip_prefix("language-"))
            })
            .filter(|lang| *lang != "none")
            .unwrap_or("");
        let body = doc.text_content(code.unwrap_or(pre)).replace(NBSP, " ");
        let body = body.trim_end_matches('\n');
        format!("```{lang}\n{body}\n```")
    }

    fn inline_children(&self, doc: &Document, node: NodeId) -> String {
        doc.children(node)
            .iter()
            .map(|c| self.inline(doc, *c))
            .collect()
    }

    fn inline(&self, doc: &Document, node: NodeId) -> String {
        match doc.kind(node) {
            Some(NodeKind::Text(text)) => text.replace(NBSP, " "),
            Some(NodeKind::Element { tag, .. }) => {
                let inner = self.inline_children(doc, node);
                match tag.as_str() {
                    "br" => "\n".to_string(),
                    "code" => format!("`{inner}`"),
                    "b" | "strong" => format!("**{inner}**"),
                    "i" | "em" => format!("_{inner}_"),
                    "del" | "s" | "strike" => format!("~~{inner}~~"),
                    "a" => match doc.attr(node, "href") {
                        Some(href) => format!("[{inner}]({href})"),
                        None => inner,
                    },
                    _ => inner,
                }
            }
            _ => String::new(),
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
