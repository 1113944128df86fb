//! Markdown to HTML conversion with caller-overridable element rendering.
//!
//! This crate wraps [`pulldown-cmark`](pulldown_cmark) event streams in an
//! HTML writer whose per-element output goes through a mutable [`Renderer`]
//! method table. Callers that need custom markup for a specific element
//! (links that open in a new tab, externally highlighted code blocks, ...)
//! replace the matching method before conversion and leave the rest on the
//! defaults.
//!
//! # Example
//!
//! ```
//! use mdsurface_renderer::{ConvertOptions, Renderer, convert};
//!
//! let mut renderer = Renderer::new();
//! renderer.link = Some(Box::new(|href, _title, inner| {
//!     format!(r#"<a href="{href}" target="_blank">{inner}</a>"#)
//! }));
//! let html = convert("[docs](https://example.com)", ConvertOptions::default(), &mut renderer, None);
//! assert!(html.contains(r#"target="_blank""#));
//! ```
//!
//! Code blocks additionally pass through an optional highlight callback; see
//! [`convert`].

mod options;
mod renderer;
mod state;
mod writer;

pub use options::ConvertOptions;
pub use renderer::{
    CodeBlockFn, HeadingFn, ImageFn, LinkFn, PlainFn, Renderer, TaskMarkerFn,
};
pub use state::{escape_html, slugify};
pub use writer::{HighlightFn, convert, to_html};
