//! Conversion options and their mapping onto parser extensions.

use pulldown_cmark::Options;

/// Options controlling how Markdown text is parsed and serialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Render soft line breaks (single newlines) as hard breaks.
    pub breaks: bool,
    /// Restrict parsing to plain CommonMark: tables, strikethrough and
    /// task lists are treated as regular text.
    pub pedantic: bool,
    /// Smart typographic punctuation for quotes, dashes and ellipses.
    pub smartypants: bool,
}

impl ConvertOptions {
    /// Parser extension flags for these options.
    pub(crate) fn parser_options(self) -> Options {
        let mut opts = Options::empty();
        if !self.pedantic {
            opts |= Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS;
        }
        if self.smartypants {
            opts |= Options::ENABLE_SMART_PUNCTUATION;
        }
        opts
    }
}
