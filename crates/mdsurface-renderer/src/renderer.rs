//! Overridable per-element rendering method table.

use std::borrow::Cow;
use std::fmt::Write;

use crate::state::escape_html;

/// Hook producing HTML for a code block, given its language and content.
pub type CodeBlockFn = Box<dyn FnMut(Option<&str>, &str) -> String>;
/// Hook producing HTML for a heading, given its level, anchor id and inner HTML.
pub type HeadingFn = Box<dyn FnMut(u8, &str, &str) -> String>;
/// Hook producing HTML for a link, given its destination, title and inner HTML.
pub type LinkFn = Box<dyn FnMut(&str, &str, &str) -> String>;
/// Hook producing HTML for an image, given its source, alt text and title.
pub type ImageFn = Box<dyn FnMut(&str, &str, &str) -> String>;
/// Hook producing HTML for a task-list checkbox.
pub type TaskMarkerFn = Box<dyn FnMut(bool) -> String>;
/// Hook producing HTML for a contentless element (hard break, rule).
pub type PlainFn = Box<dyn FnMut() -> String>;

/// Per-element rendering method table.
///
/// A fresh table produces semantic HTML5. Callers override individual
/// elements by installing a hook in the matching slot; empty slots keep the
/// default markup. Conversion takes the table by mutable reference, so the
/// same customized table can serve repeated render passes.
#[derive(Default)]
pub struct Renderer {
    /// Code block override. Receives the highlighted content when a
    /// highlight callback transformed it; the hook owns all escaping.
    pub code_block: Option<CodeBlockFn>,
    /// Heading override.
    pub heading: Option<HeadingFn>,
    /// Link override.
    pub link: Option<LinkFn>,
    /// Image override.
    pub image: Option<ImageFn>,
    /// Hard break override.
    pub hard_break: Option<PlainFn>,
    /// Horizontal rule override.
    pub horizontal_rule: Option<PlainFn>,
    /// Task-list checkbox override.
    pub task_list_marker: Option<TaskMarkerFn>,
}

impl Renderer {
    /// Create a method table with all defaults in place.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a code block.
    ///
    /// `highlighted` marks content a highlight callback already turned into
    /// markup; it is written without escaping.
    pub(crate) fn render_code_block(
        &mut self,
        lang: Option<&str>,
        code: &str,
        highlighted: bool,
        out: &mut String,
    ) {
        if let Some(hook) = self.code_block.as_mut() {
            out.push_str(&hook(lang, code));
            return;
        }
        let body: Cow<'_, str> = if highlighted {
            Cow::Borrowed(code)
        } else {
            Cow::Owned(escape_html(code))
        };
        if let Some(lang) = lang {
            write!(
                out,
                r#"<pre><code class="language-{}">{body}</code></pre>"#,
                escape_html(lang)
            )
            .unwrap();
        } else {
            write!(out, "<pre><code>{body}</code></pre>").unwrap();
        }
    }

    pub(crate) fn render_heading(&mut self, level: u8, id: &str, inner: &str, out: &mut String) {
        if let Some(hook) = self.heading.as_mut() {
            out.push_str(&hook(level, id, inner));
            return;
        }
        write!(out, r#"<h{level} id="{id}">{}</h{level}>"#, inner.trim()).unwrap();
    }

    pub(crate) fn render_link(&mut self, href: &str, title: &str, inner: &str, out: &mut String) {
        if let Some(hook) = self.link.as_mut() {
            out.push_str(&hook(href, title, inner));
            return;
        }
        if title.is_empty() {
            write!(out, r#"<a href="{}">{inner}</a>"#, escape_html(href)).unwrap();
        } else {
            write!(
                out,
                r#"<a href="{}" title="{}">{inner}</a>"#,
                escape_html(href),
                escape_html(title)
            )
            .unwrap();
        }
    }

    pub(crate) fn render_image(&mut self, src: &str, alt: &str, title: &str, out: &mut String) {
        if let Some(hook) = self.image.as_mut() {
            out.push_str(&hook(src, alt, title));
            return;
        }
        let title_attr = if title.is_empty() {
            String::new()
        } else {
            format!(r#" title="{}""#, escape_html(title))
        };
        write!(
            out,
            r#"<img src="{}"{title_attr} alt="{}">"#,
            escape_html(src),
            escape_html(alt)
        )
        .unwrap();
    }

    pub(crate) fn render_hard_break(&mut self, out: &mut String) {
        match self.hard_break.as_mut() {
            Some(hook) => out.push_str(&hook()),
            None => out.push_str("<br>"),
        }
    }

    pub(crate) fn render_horizontal_rule(&mut self, out: &mut String) {
        match self.horizontal_rule.as_mut() {
            Some(hook) => out.push_str(&hook()),
            None => out.push_str("<hr>"),
        }
    }

    pub(crate) fn render_task_list_marker(&mut self, checked: bool, out: &mut String) {
        if let Some(hook) = self.task_list_marker.as_mut() {
            out.push_str(&hook(checked));
            return;
        }
        if checked {
            out.push_str(r#"<input type="checkbox" checked disabled> "#);
        } else {
            out.push_str(r#"<input type="checkbox" disabled> "#);
        }
    }
}
