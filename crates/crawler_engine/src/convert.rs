use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html};

use crate::types::RenderOptions;
use crate::wrap::wrap_markdown;

pub trait Converter: Send + Sync {
    fn to_markdown(&self, html: &str) -> String;
}

/// Full markdown conversion; hyperlinks and images are kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct Html2MdConverter;

impl Converter for Html2MdConverter {
    fn to_markdown(&self, html: &str) -> String {
        html2md::parse_html(html)
    }
}

/// Markdown conversion that keeps anchor text but drops link targets and images.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextOnlyConverter;

impl Converter for TextOnlyConverter {
    fn to_markdown(&self, html: &str) -> String {
        let document = Html::parse_fragment(html);
        let mut out = MarkdownBuilder::default();
        for child in document.root_element().children() {
            visit_node(child, &mut out);
        }
        out.finish()
    }
}

/// Convert extracted page HTML to wrapped markdown according to `options`.
pub fn render_markdown(html: &str, options: &RenderOptions) -> String {
    let markdown = if options.ignore_links {
        TextOnlyConverter.to_markdown(html)
    } else {
        Html2MdConverter.to_markdown(html)
    };
    wrap_markdown(markdown.trim_end().trim_start_matches('\n'), options.body_width)
}

fn visit_node(node: NodeRef<'_, Node>, out: &mut MarkdownBuilder) {
    match node.value() {
        Node::Text(text) => {
            if out.in_pre {
                out.push_raw(text);
            } else {
                out.push_text(text);
            }
        }
        Node::Element(_) => {
            if let Some(element) = ElementRef::wrap(node) {
                visit_element(element, out);
            }
        }
        _ => {
            for child in node.children() {
                visit_node(child, out);
            }
        }
    }
}

fn visit_element(element: ElementRef<'_>, out: &mut MarkdownBuilder) {
    let tag = element.value().name().to_ascii_lowercase();
    match tag.as_str() {
        "script" | "style" | "noscript" | "iframe" | "template" | "img" | "svg" | "head" => {}
        "br" => out.ensure_newline(),
        "hr" => {
            out.ensure_blank_line();
            out.push_raw("* * *");
            out.ensure_blank_line();
        }
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = usize::from(tag.as_bytes()[1] - b'0');
            out.ensure_blank_line();
            out.push_raw(&format!("{} ", "#".repeat(level)));
            visit_children(element, out);
            out.ensure_blank_line();
        }
        "li" => {
            out.ensure_newline();
            let marker = out.next_list_marker();
            out.push_raw(&marker);
            visit_children(element, out);
            out.ensure_newline();
        }
        "ul" | "ol" => {
            let nested = out.in_list();
            if nested {
                out.ensure_newline();
            } else {
                out.ensure_blank_line();
            }
            let start = element
                .value()
                .attr("start")
                .and_then(|value| value.trim().parse().ok())
                .unwrap_or(1);
            out.lists.push(ListFrame {
                ordered: tag == "ol",
                next: start,
            });
            visit_children(element, out);
            out.lists.pop();
            if nested {
                out.ensure_newline();
            } else {
                out.ensure_blank_line();
            }
        }
        "pre" => {
            out.ensure_blank_line();
            out.push_raw("```\n");
            out.in_pre = true;
            visit_children(element, out);
            out.in_pre = false;
            out.ensure_newline();
            out.push_raw("```");
            out.ensure_blank_line();
        }
        "strong" | "b" => wrap_inline(element, out, "**"),
        "em" | "i" => wrap_inline(element, out, "_"),
        "p" | "div" | "section" | "article" | "header" | "footer" | "nav" | "main" | "aside"
        | "figure" | "figcaption" | "table" | "tr" | "blockquote" | "address" | "dl" | "dt"
        | "dd" => {
            out.ensure_blank_line();
            visit_children(element, out);
            out.ensure_blank_line();
        }
        "td" | "th" => {
            visit_children(element, out);
            out.push_text(" ");
        }
        // Anchors fall through here: their text stays, the target is dropped.
        _ => visit_children(element, out),
    }
}

fn visit_children(element: ElementRef<'_>, out: &mut MarkdownBuilder) {
    for child in element.children() {
        visit_node(child, out);
    }
}

fn wrap_inline(element: ElementRef<'_>, out: &mut MarkdownBuilder, marker: &str) {
    let text = element.text().collect::<String>();
    if text.trim().is_empty() {
        return;
    }
    if out.in_pre {
        out.push_raw(&text);
        return;
    }
    if text.starts_with(char::is_whitespace) {
        out.push_text(" ");
    }
    out.push_raw(marker);
    out.push_text(text.trim());
    out.push_raw(marker);
    if text.ends_with(char::is_whitespace) {
        out.push_text(" ");
    }
}

struct ListFrame {
    ordered: bool,
    next: u32,
}

#[derive(Default)]
struct MarkdownBuilder {
    buf: String,
    in_pre: bool,
    lists: Vec<ListFrame>,
}

impl MarkdownBuilder {
    fn in_list(&self) -> bool {
        !self.lists.is_empty()
    }

    /// Indented `* ` or `N. ` for the innermost open list; a stray `<li>` counts as depth one.
    fn next_list_marker(&mut self) -> String {
        let indent = "  ".repeat(self.lists.len().max(1));
        match self.lists.last_mut() {
            Some(frame) if frame.ordered => {
                let number = frame.next;
                frame.next += 1;
                format!("{indent}{number}. ")
            }
            _ => format!("{indent}* "),
        }
    }

    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.buf.is_empty() || self.buf.ends_with([' ', '\n']) {
                    continue;
                }
                self.buf.push(' ');
            } else {
                self.buf.push(ch);
            }
        }
    }

    fn push_raw(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    fn ensure_newline(&mut self) {
        self.trim_trailing_spaces();
        if self.buf.is_empty() || self.buf.ends_with('\n') {
            return;
        }
        self.buf.push('\n');
    }

    fn ensure_blank_line(&mut self) {
        self.ensure_newline();
        if self.buf.is_empty() || self.buf.ends_with("\n\n") {
            return;
        }
        self.buf.push('\n');
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.buf.trim_end_matches(' ').len();
        self.buf.truncate(trimmed);
    }

    fn finish(self) -> String {
        self.buf.trim_end().trim_start_matches('\n').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Converter, TextOnlyConverter};

    #[test]
    fn anchors_keep_text_only() {
        let md = TextOnlyConverter
            .to_markdown(r#"<p>Read <a href="https://example.com/x">the docs</a> now.</p>"#);
        assert_eq!(md, "Read the docs now.");
    }

    #[test]
    fn images_and_scripts_are_dropped() {
        let md = TextOnlyConverter
            .to_markdown(r#"<p>Before<img src="/pic.png">After</p><script>var x = 1;</script>"#);
        assert_eq!(md, "BeforeAfter");
    }

    #[test]
    fn blocks_are_separated_by_blank_lines() {
        let md = TextOnlyConverter.to_markdown("<h2>Title</h2><p>one</p><ul><li>a</li><li>b</li></ul>");
        assert_eq!(md, "## Title\n\none\n\n  * a\n  * b");
    }

    #[test]
    fn ordered_lists_are_numbered() {
        let md = TextOnlyConverter
            .to_markdown(r#"<ol><li>first</li><li>second</li></ol><ol start="4"><li>fourth</li></ol>"#);
        assert_eq!(md, "  1. first\n  2. second\n\n  4. fourth");
    }

    #[test]
    fn nested_lists_are_indented_under_their_item() {
        let md = TextOnlyConverter.to_markdown(
            "<ul><li>a<ul><li>nested</li><li>also</li></ul></li><li>b</li></ul>\
             <ol><li>x<ul><li>y</li></ul></li><li>z</li></ol>",
        );
        assert_eq!(
            md,
            "  * a\n    * nested\n    * also\n  * b\n\n  1. x\n    * y\n  2. z"
        );
    }

    #[test]
    fn emphasis_markers_wrap_trimmed_text() {
        let md = TextOnlyConverter.to_markdown("<p>a <strong>bold </strong>word</p>");
        assert_eq!(md, "a **bold** word");
    }
}
