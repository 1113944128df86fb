//! A reactive markdown display surface.
//!
//! [`MarkdownSurface`] accepts Markdown text through a property, an inline
//! content child, or a remote address fetched over HTTP, converts it with
//! [`mdsurface-renderer`](mdsurface_renderer), optionally sanitizes the
//! result, and writes the HTML into a host-visible [`OutputNode`].
//!
//! Property writes pass a change gate: writing the value a field already
//! holds does nothing, while a changed value re-renders synchronously.
//! Remote content is untrusted by default (a successful fetch switches
//! sanitization on unless the host opted out), and a failed fetch degrades
//! to a visible fallback message instead of an error. The surface never
//! panics at its host.
//!
//! # Example
//!
//! ```
//! use mdsurface_core::{MarkdownSurface, OutputNode, SurfaceHost};
//!
//! let output = OutputNode::new();
//! let mut surface = MarkdownSurface::new();
//! surface.connect(&SurfaceHost {
//!     children: Vec::new(),
//!     output_slot: Some(output.clone()),
//! });
//! surface.set_markdown(Some("`Markdown` is _nice_".to_owned()));
//! assert!(output.html().contains("<em>nice</em>"));
//! ```

mod events;
mod fetch;
mod reactive;
mod sanitize;
mod surface;
mod util;

pub use events::{
    HighlightRequest, LOAD_END, LOAD_END_COMPAT, LoadErrorDisposition, RENDER_COMPLETE,
    RENDER_COMPLETE_COMPAT,
};
pub use fetch::{FetchError, FetchResponse, HttpClient, RemoteClient};
pub use reactive::Tracked;
pub use sanitize::{SanitizeFn, clean_html};
pub use surface::{MarkdownSurface, OutputNode, RendererHook, SourceChild, SurfaceHost};
pub use util::unindent;

// Hook signatures reference these directly.
pub use mdsurface_renderer::{ConvertOptions, Renderer};
