//! Writer-internal capture state and small text helpers.

use std::collections::HashMap;

use pulldown_cmark::Alignment;

/// Buffer for content captured between a start and end event
/// (link inner HTML, image alt text).
#[derive(Default)]
pub(crate) struct Capture {
    active: bool,
    buf: String,
}

impl Capture {
    pub(crate) fn start(&mut self) {
        self.active = true;
        self.buf.clear();
    }

    pub(crate) fn end(&mut self) -> String {
        self.active = false;
        std::mem::take(&mut self.buf)
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn buf(&mut self) -> &mut String {
        &mut self.buf
    }
}

/// Code block capture: content plus the fence language.
#[derive(Default)]
pub(crate) struct CodeBlockState {
    active: bool,
    language: Option<String>,
    buffer: String,
}

impl CodeBlockState {
    pub(crate) fn start(&mut self, language: Option<String>) {
        self.active = true;
        self.language = language;
        self.buffer.clear();
    }

    /// End the block, returning `(language, content)`.
    pub(crate) fn end(&mut self) -> (Option<String>, String) {
        self.active = false;
        (self.language.take(), std::mem::take(&mut self.buffer))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub(crate) fn push_newline(&mut self) {
        self.buffer.push('\n');
    }
}

/// Heading capture: plain text for the anchor slug, HTML for the body,
/// and a counter map so repeated headings get unique ids.
#[derive(Default)]
pub(crate) struct HeadingState {
    current_level: Option<u8>,
    text: String,
    html: String,
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    pub(crate) fn start(&mut self, level: u8) {
        self.current_level = Some(level);
        self.text.clear();
        self.html.clear();
    }

    /// End the heading, returning `(level, id, inner_html)`.
    pub(crate) fn end(&mut self) -> Option<(u8, String, String)> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let html = std::mem::take(&mut self.html);
        Some((level, self.unique_id(&text), html))
    }

    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub(crate) fn html_buf(&mut self) -> &mut String {
        &mut self.html
    }

    /// Slugified id, suffixed with `-1`, `-2`, ... on repeats.
    fn unique_id(&mut self, text: &str) -> String {
        let base = slugify(text);
        let count = self.id_counts.entry(base.clone()).or_default();
        let id = match *count {
            0 => base,
            n => format!("{base}-{n}"),
        };
        *count += 1;
        id
    }
}

/// Table capture: header/body position and per-column alignments.
#[derive(Default)]
pub(crate) struct TableState {
    in_head: bool,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl TableState {
    pub(crate) fn start(&mut self, alignments: Vec<Alignment>) {
        self.alignments = alignments;
        self.in_head = false;
        self.cell_index = 0;
    }

    pub(crate) fn start_head(&mut self) {
        self.in_head = true;
        self.cell_index = 0;
    }

    pub(crate) fn end_head(&mut self) {
        self.in_head = false;
    }

    pub(crate) fn start_row(&mut self) {
        self.cell_index = 0;
    }

    pub(crate) fn next_cell(&mut self) {
        self.cell_index += 1;
    }

    pub(crate) fn is_in_head(&self) -> bool {
        self.in_head
    }

    pub(crate) fn alignment_style(&self) -> &'static str {
        match self.alignments.get(self.cell_index) {
            Some(Alignment::Left) => r#" style="text-align:left""#,
            Some(Alignment::Center) => r#" style="text-align:center""#,
            Some(Alignment::Right) => r#" style="text-align:right""#,
            Some(Alignment::None) | None => "",
        }
    }
}

/// Convert text to a URL-safe anchor slug.
///
/// Lowercases, collapses whitespace/dashes/underscores to single dashes and
/// drops every other non-alphanumeric character.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::new();
    let mut last_was_dash = true; // Prevents leading dash
    for c in text.trim().chars() {
        if c.is_ascii_alphanumeric() {
            result.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && (c.is_whitespace() || c == '-' || c == '_') {
            result.push('-');
            last_was_dash = true;
        }
    }
    if result.ends_with('-') {
        result.pop();
    }
    result
}

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#x27;"),
            _ => result.push(c),
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("What's New?"), "whats-new");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("snake_case"), "snake-case");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("it's"), "it&#x27;s");
    }

    #[test]
    fn test_heading_ids_deduplicate() {
        let mut state = HeadingState::default();
        for expected in ["faq", "faq-1", "faq-2"] {
            state.start(2);
            state.push_text("FAQ");
            let (_, id, _) = state.end().unwrap();
            assert_eq!(id, expected);
        }
    }

    #[test]
    fn test_code_block_state_round_trip() {
        let mut state = CodeBlockState::default();
        state.start(Some("rust".to_owned()));
        assert!(state.is_active());
        state.push_str("fn main() {}");
        let (lang, content) = state.end();
        assert_eq!(lang.as_deref(), Some("rust"));
        assert_eq!(content, "fn main() {}");
        assert!(!state.is_active());
    }

    #[test]
    fn test_capture_takes_buffer() {
        let mut capture = Capture::default();
        capture.start();
        capture.buf().push_str("inner");
        assert!(capture.is_active());
        assert_eq!(capture.end(), "inner");
        assert!(!capture.is_active());
    }

    #[test]
    fn test_table_alignment_styles() {
        let mut state = TableState::default();
        state.start(vec![Alignment::Left, Alignment::None, Alignment::Right]);
        state.start_head();
        assert_eq!(state.alignment_style(), r#" style="text-align:left""#);
        state.next_cell();
        assert_eq!(state.alignment_style(), "");
        state.next_cell();
        assert_eq!(state.alignment_style(), r#" style="text-align:right""#);
    }
}
