//! Event-stream HTML writer.

use std::fmt::Write;

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};

use crate::options::ConvertOptions;
use crate::renderer::Renderer;
use crate::state::{Capture, CodeBlockState, HeadingState, TableState, escape_html};

/// Signature of the code-block highlight callback.
///
/// Receives the code and the fence language; returns the content to place
/// inside the code block. Returning the input unchanged (or an empty string)
/// keeps the default escaped rendering; anything else is treated as
/// pre-rendered markup and written without escaping.
pub type HighlightFn<'f> = dyn FnMut(&str, Option<&str>) -> String + 'f;

/// Convert Markdown text to HTML.
///
/// Element-level output goes through `renderer`; code blocks additionally
/// pass through `highlight` when one is supplied.
pub fn convert(
    text: &str,
    options: ConvertOptions,
    renderer: &mut Renderer,
    highlight: Option<&mut HighlightFn<'_>>,
) -> String {
    let parser = Parser::new_ext(text, options.parser_options());
    HtmlWriter::new(renderer, highlight, options.breaks).run(parser)
}

/// Convert Markdown text to HTML with default element rendering and no
/// highlighting.
#[must_use]
pub fn to_html(text: &str, options: ConvertOptions) -> String {
    convert(text, options, &mut Renderer::new(), None)
}

/// Walks a parser event stream and serializes HTML.
struct HtmlWriter<'a, 'f> {
    renderer: &'a mut Renderer,
    highlight: Option<&'a mut HighlightFn<'f>>,
    /// Render soft breaks as hard breaks.
    breaks: bool,
    output: String,
    code: CodeBlockState,
    heading: HeadingState,
    table: TableState,
    /// Inner HTML of the currently open link.
    link: Capture,
    /// Alt text of the currently open image.
    image: Capture,
    pending_link: Option<(String, String)>,
    pending_image: Option<(String, String)>,
}

impl<'a, 'f> HtmlWriter<'a, 'f> {
    fn new(
        renderer: &'a mut Renderer,
        highlight: Option<&'a mut HighlightFn<'f>>,
        breaks: bool,
    ) -> Self {
        Self {
            renderer,
            highlight,
            breaks,
            output: String::with_capacity(4096),
            code: CodeBlockState::default(),
            heading: HeadingState::default(),
            table: TableState::default(),
            link: Capture::default(),
            image: Capture::default(),
            pending_link: None,
            pending_image: None,
        }
    }

    fn run<'input, I>(mut self, events: I) -> String
    where
        I: Iterator<Item = Event<'input>>,
    {
        for event in events {
            self.process_event(event);
        }
        self.output
    }

    fn process_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => self.inline_code(&code),
            Event::Html(html) | Event::InlineHtml(html) => self.push_inline(&html),
            Event::SoftBreak => self.soft_break(),
            Event::HardBreak => {
                let mut rendered = String::new();
                self.renderer.render_hard_break(&mut rendered);
                self.push_inline(&rendered);
            }
            Event::Rule => {
                let mut rendered = String::new();
                self.renderer.render_horizontal_rule(&mut rendered);
                self.output.push_str(&rendered);
            }
            Event::TaskListMarker(checked) => {
                let mut rendered = String::new();
                self.renderer.render_task_list_marker(checked, &mut rendered);
                self.output.push_str(&rendered);
            }
            Event::FootnoteReference(_) | Event::InlineMath(_) | Event::DisplayMath(_) => {
                // Not supported
            }
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("<p>");
                }
            }
            Tag::Heading { level, .. } => {
                self.heading.start(heading_level_to_num(level));
            }
            Tag::BlockQuote(_) => {
                self.output.push_str("<blockquote>");
            }
            Tag::CodeBlock(kind) => {
                let lang = match kind {
                    CodeBlockKind::Fenced(ref info) => info
                        .split_whitespace()
                        .next()
                        .filter(|s| !s.is_empty())
                        .map(str::to_owned),
                    CodeBlockKind::Indented => None,
                };
                self.code.start(lang);
            }
            Tag::List(start) => match start {
                Some(1) => self.output.push_str("<ol>"),
                Some(n) => write!(self.output, r#"<ol start="{n}">"#).unwrap(),
                None => self.output.push_str("<ul>"),
            },
            Tag::Item => {
                self.output.push_str("<li>");
            }
            Tag::Table(alignments) => {
                self.table.start(alignments);
                self.output.push_str("<table>");
            }
            Tag::TableHead => {
                self.table.start_head();
                self.output.push_str("<thead><tr>");
            }
            Tag::TableRow => {
                self.table.start_row();
                self.output.push_str("<tr>");
            }
            Tag::TableCell => {
                let align = self.table.alignment_style();
                let cell = if self.table.is_in_head() { "th" } else { "td" };
                write!(self.output, "<{cell}{align}>").unwrap();
            }
            Tag::Emphasis => self.push_inline("<em>"),
            Tag::Strong => self.push_inline("<strong>"),
            Tag::Strikethrough => self.push_inline("<s>"),
            Tag::Link {
                dest_url, title, ..
            } => {
                self.pending_link = Some((dest_url.to_string(), title.to_string()));
                self.link.start();
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                self.pending_image = Some((dest_url.to_string(), title.to_string()));
                self.image.start();
            }
            Tag::FootnoteDefinition(_)
            | Tag::HtmlBlock
            | Tag::MetadataBlock(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                if !self.code.is_active() {
                    self.output.push_str("</p>");
                }
            }
            TagEnd::Heading(_) => {
                if let Some((level, id, html)) = self.heading.end() {
                    let mut rendered = String::new();
                    self.renderer.render_heading(level, &id, &html, &mut rendered);
                    self.output.push_str(&rendered);
                }
            }
            TagEnd::BlockQuote(_) => {
                self.output.push_str("</blockquote>");
            }
            TagEnd::CodeBlock => {
                let (lang, content) = self.code.end();
                let (body, highlighted) = match self.highlight.as_mut() {
                    Some(hl) => {
                        let out = hl(&content, lang.as_deref());
                        if out.is_empty() || out == content {
                            (content, false)
                        } else {
                            (out, true)
                        }
                    }
                    None => (content, false),
                };
                let mut rendered = String::new();
                self.renderer
                    .render_code_block(lang.as_deref(), &body, highlighted, &mut rendered);
                self.output.push_str(&rendered);
            }
            TagEnd::List(ordered) => {
                self.output
                    .push_str(if ordered { "</ol>" } else { "</ul>" });
            }
            TagEnd::Item => {
                self.output.push_str("</li>");
            }
            TagEnd::Table => {
                self.output.push_str("</tbody></table>");
            }
            TagEnd::TableHead => {
                self.output.push_str("</tr></thead><tbody>");
                self.table.end_head();
            }
            TagEnd::TableRow => {
                self.output.push_str("</tr>");
            }
            TagEnd::TableCell => {
                self.output.push_str(if self.table.is_in_head() {
                    "</th>"
                } else {
                    "</td>"
                });
                self.table.next_cell();
            }
            TagEnd::Emphasis => self.push_inline("</em>"),
            TagEnd::Strong => self.push_inline("</strong>"),
            TagEnd::Strikethrough => self.push_inline("</s>"),
            TagEnd::Link => {
                let inner = self.link.end();
                let (href, title) = self.pending_link.take().unwrap_or_default();
                let mut rendered = String::new();
                self.renderer.render_link(&href, &title, &inner, &mut rendered);
                self.push_inline(&rendered);
            }
            TagEnd::Image => {
                let alt = self.image.end();
                if let Some((src, title)) = self.pending_image.take() {
                    let mut rendered = String::new();
                    self.renderer.render_image(&src, &alt, &title, &mut rendered);
                    self.push_inline(&rendered);
                }
            }
            TagEnd::FootnoteDefinition
            | TagEnd::HtmlBlock
            | TagEnd::MetadataBlock(_)
            | TagEnd::DefinitionList
            | TagEnd::DefinitionListTitle
            | TagEnd::DefinitionListDefinition
            | TagEnd::Superscript
            | TagEnd::Subscript => {}
        }
    }

    fn text(&mut self, text: &str) {
        // Priority: code > image alt > inline content
        if self.code.is_active() {
            self.code.push_str(text);
            return;
        }
        if self.image.is_active() {
            self.image.buf().push_str(text);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(text);
        }
        let escaped = escape_html(text);
        self.push_inline(&escaped);
    }

    fn inline_code(&mut self, code: &str) {
        if self.image.is_active() {
            self.image.buf().push_str(code);
            return;
        }
        if self.heading.is_active() {
            self.heading.push_text(code);
        }
        let html = format!("<code>{}</code>", escape_html(code));
        self.push_inline(&html);
    }

    fn soft_break(&mut self) {
        if self.code.is_active() {
            self.code.push_newline();
        } else if self.breaks {
            let mut rendered = String::new();
            self.renderer.render_hard_break(&mut rendered);
            self.push_inline(&rendered);
        } else {
            self.push_inline("\n");
        }
    }

    /// Push inline content into the innermost open capture: the current
    /// link, the current heading, or the document itself.
    fn push_inline(&mut self, content: &str) {
        if self.link.is_active() {
            self.link.buf().push_str(content);
        } else if self.heading.is_active() {
            self.heading.html_buf().push_str(content);
        } else {
            self.output.push_str(content);
        }
    }
}

/// Convert heading level enum to number.
fn heading_level_to_num(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn render(markdown: &str) -> String {
        to_html(markdown, ConvertOptions::default())
    }

    #[test]
    fn test_basic_paragraph() {
        assert_eq!(render("Hello, world!"), "<p>Hello, world!</p>");
    }

    #[test]
    fn test_heading_with_id() {
        assert_eq!(render("# Test"), r#"<h1 id="test">Test</h1>"#);
        assert_eq!(
            render("## Section Title"),
            r#"<h2 id="section-title">Section Title</h2>"#
        );
    }

    #[test]
    fn test_duplicate_heading_ids() {
        let html = render("## FAQ\n\n## FAQ\n\n## FAQ");
        assert!(html.contains(r#"id="faq""#));
        assert!(html.contains(r#"id="faq-1""#));
        assert!(html.contains(r#"id="faq-2""#));
    }

    #[test]
    fn test_heading_with_inline_code() {
        let html = render("## Install `cargo`");
        assert_eq!(
            html,
            r#"<h2 id="install-cargo">Install <code>cargo</code></h2>"#
        );
    }

    #[test]
    fn test_code_block_escapes_content() {
        let html = render("```html\n<div camelCase></div>\n```");
        assert_eq!(
            html,
            "<pre><code class=\"language-html\">&lt;div camelCase&gt;&lt;/div&gt;\n</code></pre>"
        );
    }

    #[test]
    fn test_code_block_without_language() {
        let html = render("```\nplain text\n```");
        assert_eq!(html, "<pre><code>plain text\n</code></pre>");
    }

    #[test]
    fn test_link_default() {
        assert_eq!(
            render("[Link](http://url.com)"),
            r#"<p><a href="http://url.com">Link</a></p>"#
        );
    }

    #[test]
    fn test_link_with_title() {
        assert_eq!(
            render(r#"[Link](http://url.com "the title")"#),
            r#"<p><a href="http://url.com" title="the title">Link</a></p>"#
        );
    }

    #[test]
    fn test_link_inside_heading() {
        assert_eq!(
            render("# [Home](/index)"),
            r#"<h1 id="home"><a href="/index">Home</a></h1>"#
        );
    }

    #[test]
    fn test_custom_link_renderer() {
        let mut renderer = Renderer::new();
        renderer.link = Some(Box::new(|href, _title, inner| {
            format!(r#"<a href="{href}" target="_blank">{inner}</a>"#)
        }));
        let html = convert(
            "[Link](http://url.com)",
            ConvertOptions::default(),
            &mut renderer,
            None,
        );
        assert_eq!(
            html,
            r#"<p><a href="http://url.com" target="_blank">Link</a></p>"#
        );
    }

    #[test]
    fn test_image() {
        assert_eq!(
            render("![Alt text](image.png)"),
            r#"<p><img src="image.png" alt="Alt text"></p>"#
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(render("> Note"), "<blockquote><p>Note</p></blockquote>");
    }

    #[test]
    fn test_lists() {
        assert_eq!(
            render("- Item 1\n- Item 2"),
            "<ul><li>Item 1</li><li>Item 2</li></ul>"
        );
        assert_eq!(
            render("1. First\n2. Second"),
            "<ol><li>First</li><li>Second</li></ol>"
        );
    }

    #[test]
    fn test_table() {
        let html = render("| A | B |\n|---|---|\n| 1 | 2 |");
        assert!(html.contains("<table><thead><tr><th>A</th><th>B</th></tr></thead>"));
        assert!(html.contains("<tbody><tr><td>1</td><td>2</td></tr></tbody></table>"));
    }

    #[test]
    fn test_task_list() {
        let html = render("- [ ] Open\n- [x] Done");
        assert!(html.contains(r#"<input type="checkbox" disabled> Open"#));
        assert!(html.contains(r#"<input type="checkbox" checked disabled> Done"#));
    }

    #[test]
    fn test_emphasis_and_strikethrough() {
        let html = render("*italic* **bold** ~~gone~~");
        assert!(html.contains("<em>italic</em>"));
        assert!(html.contains("<strong>bold</strong>"));
        assert!(html.contains("<s>gone</s>"));
    }

    #[test]
    fn test_raw_html_passthrough() {
        let html = render("before <span class=\"x\">kept</span> after");
        assert!(html.contains(r#"<span class="x">kept</span>"#));
    }

    #[test]
    fn test_soft_break_default() {
        assert_eq!(render("one\ntwo"), "<p>one\ntwo</p>");
    }

    #[test]
    fn test_breaks_option() {
        let options = ConvertOptions {
            breaks: true,
            ..ConvertOptions::default()
        };
        assert_eq!(to_html("one\ntwo", options), "<p>one<br>two</p>");
    }

    #[test]
    fn test_smartypants_option() {
        let options = ConvertOptions {
            smartypants: true,
            ..ConvertOptions::default()
        };
        let html = to_html("\"quoted\" text...", options);
        assert!(html.contains('\u{201c}'));
        assert!(html.contains('\u{2026}'));
    }

    #[test]
    fn test_pedantic_disables_tables() {
        let options = ConvertOptions {
            pedantic: true,
            ..ConvertOptions::default()
        };
        let html = to_html("| A | B |\n|---|---|\n| 1 | 2 |", options);
        assert!(!html.contains("<table>"));
    }

    #[test]
    fn test_highlight_callback_replaces_code() {
        let mut hl = |code: &str, lang: Option<&str>| {
            assert_eq!(lang, Some("rust"));
            format!("<span class=\"hl\">{}</span>", escape_html(code))
        };
        let html = convert(
            "```rust\nfn main() {}\n```",
            ConvertOptions::default(),
            &mut Renderer::new(),
            Some(&mut hl),
        );
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\"><span class=\"hl\">fn main() {}\n</span></code></pre>"
        );
    }

    #[test]
    fn test_highlight_callback_identity_keeps_escaping() {
        let mut hl = |code: &str, _lang: Option<&str>| code.to_owned();
        let html = convert(
            "```html\n<div>\n```",
            ConvertOptions::default(),
            &mut Renderer::new(),
            Some(&mut hl),
        );
        assert_eq!(
            html,
            "<pre><code class=\"language-html\">&lt;div&gt;\n</code></pre>"
        );
    }

    #[test]
    fn test_horizontal_rule() {
        assert_eq!(render("---"), "<hr>");
    }

    #[test]
    fn test_hard_break() {
        assert_eq!(render("one  \ntwo"), "<p>one<br>two</p>");
    }
}
