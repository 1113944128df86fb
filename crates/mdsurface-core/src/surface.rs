//! The markdown render surface.

use std::sync::mpsc::{Receiver, Sender, channel};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use mdsurface_renderer::{ConvertOptions, Renderer, convert};

use crate::events::{self, HighlightRequest, Listeners, LoadErrorDisposition};
use crate::fetch::{self, FetchError, FetchOutcome, HttpClient, RemoteClient, is_success};
use crate::reactive::Tracked;
use crate::sanitize::{self, SanitizeFn};
use crate::util::unindent;

/// Media type marking a child as a markdown source.
const MARKDOWN_MEDIA_TYPE: &str = "text/markdown";

/// Content substituted when a remote source fails to load.
const LOAD_FAILURE_TEXT: &str = "Failed loading markdown source";

/// Hook mutating the element method table before each conversion.
pub type RendererHook = Box<dyn FnMut(&mut Renderer)>;

/// A content child the surface scans at attach time.
///
/// Only the first child carrying the markdown media type is consulted, and
/// only once: later edits to its text are never picked up. Its remote
/// address is the one thing kept under watch, via
/// [`MarkdownSurface::notify_src_changed`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceChild {
    /// Media type of the child.
    pub media_type: String,
    /// Inline text. With a remote address present this renders as loading
    /// content until the fetch lands.
    pub text: String,
    /// Remote address to fetch markdown from.
    pub src: Option<String>,
}

impl SourceChild {
    /// Markdown child with inline text only.
    #[must_use]
    pub fn inline(text: impl Into<String>) -> Self {
        Self {
            media_type: MARKDOWN_MEDIA_TYPE.to_owned(),
            text: text.into(),
            src: None,
        }
    }

    /// Markdown child pointing at a remote address.
    #[must_use]
    pub fn remote(src: impl Into<String>) -> Self {
        Self {
            media_type: MARKDOWN_MEDIA_TYPE.to_owned(),
            text: String::new(),
            src: Some(src.into()),
        }
    }

    /// Markdown child pointing at a remote address, with inline loading
    /// content shown until the fetch resolves.
    #[must_use]
    pub fn remote_with_loading(src: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            media_type: MARKDOWN_MEDIA_TYPE.to_owned(),
            text: text.into(),
            src: Some(src.into()),
        }
    }
}

/// Shared handle to the node receiving rendered HTML.
///
/// The host keeps a clone and reads [`html`](OutputNode::html) whenever it
/// repaints; the surface writes through its own clone.
#[derive(Clone, Debug, Default)]
pub struct OutputNode(Arc<Mutex<String>>);

impl OutputNode {
    /// Empty output node.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current HTML content.
    #[must_use]
    pub fn html(&self) -> String {
        self.0.lock().unwrap().clone()
    }

    fn set_html(&self, html: String) {
        *self.0.lock().unwrap() = html;
    }
}

/// Host-side bindings handed to [`MarkdownSurface::connect`].
#[derive(Clone, Debug, Default)]
pub struct SurfaceHost {
    /// Content children, scanned in order for a markdown source.
    pub children: Vec<SourceChild>,
    /// Host-assigned output node. When absent the surface renders into an
    /// internal fallback node.
    pub output_slot: Option<OutputNode>,
}

/// Binding to the source child resolved at first attach.
#[derive(Debug, Default)]
struct SourceBinding {
    src: Option<String>,
}

/// A reactive markdown display component.
///
/// Markdown arrives through [`set_markdown`](Self::set_markdown), through an
/// inline [`SourceChild`], or from a remote address; HTML leaves through the
/// resolved [`OutputNode`]. Every property write that actually changes a
/// value re-renders synchronously; rendering before [`connect`](Self::connect)
/// or after [`disconnect`](Self::disconnect) is a safe no-op.
///
/// Nothing in here panics on bad input or failed fetches: remote failures
/// degrade to a visible fallback message (suppressible via
/// [`on_load_error`](Self::on_load_error)) and missing wiring degrades to
/// skipped renders.
pub struct MarkdownSurface {
    markdown: Tracked<Option<String>>,
    breaks: Tracked<bool>,
    pedantic: Tracked<bool>,
    smartypants: Tracked<bool>,
    sanitize: Tracked<bool>,
    disable_remote_sanitization: Tracked<bool>,
    renderer_hook: Option<RendererHook>,
    renderer_hook_dirty: bool,
    sanitizer_hook: Option<SanitizeFn>,
    sanitizer_hook_dirty: bool,
    attached: bool,
    /// Output node for the current attach cycle.
    output: Option<OutputNode>,
    source: Option<SourceBinding>,
    source_resolved: bool,
    listeners: Listeners,
    client: Arc<dyn RemoteClient>,
    outcome_tx: Sender<FetchOutcome>,
    outcome_rx: Receiver<FetchOutcome>,
}

impl MarkdownSurface {
    /// Surface backed by the default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::with_client(Arc::new(HttpClient::new()))
    }

    /// Surface backed by a caller-supplied transport.
    #[must_use]
    pub fn with_client(client: Arc<dyn RemoteClient>) -> Self {
        let (outcome_tx, outcome_rx) = channel();
        Self {
            markdown: Tracked::new(None),
            breaks: Tracked::new(false),
            pedantic: Tracked::new(false),
            smartypants: Tracked::new(false),
            sanitize: Tracked::new(false),
            disable_remote_sanitization: Tracked::new(false),
            renderer_hook: None,
            renderer_hook_dirty: false,
            sanitizer_hook: None,
            sanitizer_hook_dirty: false,
            attached: false,
            output: None,
            source: None,
            source_resolved: false,
            listeners: Listeners::default(),
            client,
            outcome_tx,
            outcome_rx,
        }
    }

    // --- tracked properties -------------------------------------------------

    /// Current markdown source text.
    #[must_use]
    pub fn markdown(&self) -> Option<&str> {
        self.markdown.get().as_deref()
    }

    /// Set the markdown source text.
    pub fn set_markdown(&mut self, value: Option<String>) {
        if self.markdown.set(value) {
            self.render_markdown();
        }
    }

    /// Whether soft line breaks render as hard breaks.
    #[must_use]
    pub fn breaks(&self) -> bool {
        *self.breaks.get()
    }

    /// Set hard-break rendering for soft line breaks.
    pub fn set_breaks(&mut self, value: bool) {
        if self.breaks.set(value) {
            self.render_markdown();
        }
    }

    /// Whether parsing is restricted to plain CommonMark.
    #[must_use]
    pub fn pedantic(&self) -> bool {
        *self.pedantic.get()
    }

    /// Restrict parsing to plain CommonMark (no tables, strikethrough or
    /// task lists).
    pub fn set_pedantic(&mut self, value: bool) {
        if self.pedantic.set(value) {
            self.render_markdown();
        }
    }

    /// Whether smart typographic punctuation is applied.
    #[must_use]
    pub fn smartypants(&self) -> bool {
        *self.smartypants.get()
    }

    /// Apply smart typographic punctuation for quotes and dashes.
    pub fn set_smartypants(&mut self, value: bool) {
        if self.smartypants.set(value) {
            self.render_markdown();
        }
    }

    /// Whether output is sanitized before it reaches the output node.
    #[must_use]
    pub fn sanitize(&self) -> bool {
        *self.sanitize.get()
    }

    /// Sanitize the output, dropping any HTML that came through the input.
    ///
    /// Off by default: unsanitized HTML is written unless this is enabled by
    /// the caller or forced by a remote fetch.
    pub fn set_sanitize(&mut self, value: bool) {
        if self.sanitize.set(value) {
            self.render_markdown();
        }
    }

    /// Whether remote fetches are kept from forcing sanitization on.
    #[must_use]
    pub fn disable_remote_sanitization(&self) -> bool {
        *self.disable_remote_sanitization.get()
    }

    /// Allow fetched markdown to render unsanitized. Overrides the forced
    /// `sanitize` flip that a successful fetch performs otherwise.
    pub fn set_disable_remote_sanitization(&mut self, value: bool) {
        if self.disable_remote_sanitization.set(value) {
            self.render_markdown();
        }
    }

    /// Install or clear the hook customizing the element method table.
    ///
    /// Boxed hooks carry no identity to compare, so installing one always
    /// counts as a change; only clearing an already-absent hook is a no-op.
    pub fn set_renderer_hook(&mut self, hook: Option<RendererHook>) {
        if hook.is_none() && self.renderer_hook.is_none() {
            return;
        }
        self.renderer_hook = hook;
        self.renderer_hook_dirty = true;
        self.render_markdown();
    }

    /// Install or clear a custom sanitizer. Only consulted while
    /// [`sanitize`](Self::sanitize) is on; its output is used verbatim.
    pub fn set_sanitizer_hook(&mut self, hook: Option<SanitizeFn>) {
        if hook.is_none() && self.sanitizer_hook.is_none() {
            return;
        }
        self.sanitizer_hook = hook;
        self.sanitizer_hook_dirty = true;
        self.render_markdown();
    }

    /// Names of properties written since the last call.
    ///
    /// A host with a batched repaint step drains this after applying writes
    /// to decide what to schedule; the surface itself has already rendered
    /// by the time a name shows up here.
    pub fn take_changed(&mut self) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.markdown.take_dirty() {
            changed.push("markdown");
        }
        if self.breaks.take_dirty() {
            changed.push("breaks");
        }
        if self.pedantic.take_dirty() {
            changed.push("pedantic");
        }
        if self.smartypants.take_dirty() {
            changed.push("smartypants");
        }
        if self.sanitize.take_dirty() {
            changed.push("sanitize");
        }
        if self.disable_remote_sanitization.take_dirty() {
            changed.push("disable_remote_sanitization");
        }
        if std::mem::take(&mut self.renderer_hook_dirty) {
            changed.push("renderer_hook");
        }
        if std::mem::take(&mut self.sanitizer_hook_dirty) {
            changed.push("sanitizer_hook");
        }
        changed
    }

    // --- listeners ----------------------------------------------------------

    /// Register a listener for a named notification, e.g.
    /// [`RENDER_COMPLETE`](crate::RENDER_COMPLETE) or
    /// [`LOAD_END`](crate::LOAD_END).
    pub fn on(&mut self, event: &str, listener: impl FnMut() + 'static) {
        self.listeners.on(event, Box::new(listener));
    }

    /// Register a highlight listener. It may replace the payload's code
    /// with highlighted markup in place.
    pub fn on_highlight(&mut self, listener: impl FnMut(&mut HighlightRequest) + 'static) {
        self.listeners.on_highlight(Box::new(listener));
    }

    /// Register a load-error listener. Returning
    /// [`LoadErrorDisposition::Suppress`] keeps the failure message out of
    /// the output.
    pub fn on_load_error(
        &mut self,
        listener: impl FnMut(&FetchError) -> LoadErrorDisposition + 'static,
    ) {
        self.listeners.on_load_error(Box::new(listener));
    }

    // --- lifecycle ----------------------------------------------------------

    /// Attach the surface to its host.
    ///
    /// Resolves the output node for this attach cycle (the host slot, or an
    /// internal fallback), resolves the content source on the first attach
    /// only, and renders.
    pub fn connect(&mut self, host: &SurfaceHost) {
        self.attached = true;
        self.output = Some(host.output_slot.clone().unwrap_or_default());
        if !self.source_resolved {
            self.source_resolved = true;
            self.resolve_source(&host.children);
        }
        self.render_markdown();
    }

    /// Detach from the host. Renders become no-ops until the next
    /// [`connect`](Self::connect); the output node is re-resolved then, since
    /// slot assignment can change between attach cycles.
    pub fn disconnect(&mut self) {
        self.attached = false;
        self.output = None;
    }

    /// Whether the surface is currently attached.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Output node of the current attach cycle.
    #[must_use]
    pub fn output(&self) -> Option<&OutputNode> {
        self.output.as_ref()
    }

    /// Resolve where markdown comes from. Runs once, at first attach.
    fn resolve_source(&mut self, children: &[SourceChild]) {
        // Explicit content wins permanently; children are never consulted.
        if self.markdown.get().as_ref().is_some_and(|m| !m.is_empty()) {
            return;
        }
        let Some(child) = children
            .iter()
            .find(|c| c.media_type == MARKDOWN_MEDIA_TYPE)
        else {
            return;
        };
        self.source = Some(SourceBinding {
            src: child.src.clone(),
        });
        if let Some(src) = child.src.as_deref().filter(|s| !s.is_empty()) {
            self.request(src);
        }
        if !child.text.trim().is_empty() {
            // Loading content: rendered immediately, overwritten when the
            // fetch resolves.
            self.set_markdown(Some(unindent(&child.text)));
        }
    }

    /// Change-watch endpoint for the bound source child's remote address.
    ///
    /// Re-issues the fetch with the child's new address. Does nothing when
    /// no source child was bound at attach time; no other field of the
    /// child is watched.
    pub fn notify_src_changed(&mut self, src: Option<&str>) {
        let Some(binding) = self.source.as_mut() else {
            return;
        };
        binding.src = src.map(str::to_owned);
        if let Some(src) = src.filter(|s| !s.is_empty()) {
            let url = src.to_owned();
            self.request(&url);
        }
    }

    // --- remote fetch -------------------------------------------------------

    fn request(&self, url: &str) {
        tracing::debug!(url, "fetching remote markdown");
        fetch::spawn_request(
            Arc::clone(&self.client),
            url.to_owned(),
            self.outcome_tx.clone(),
        );
    }

    /// Apply every fetch outcome that has already arrived. Returns how many
    /// were applied. Outcomes of overlapping fetches are applied in arrival
    /// order; the last write wins.
    pub fn poll_remote(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
            applied += 1;
        }
        applied
    }

    /// Block up to `timeout` for one fetch outcome, then drain whatever else
    /// is ready. Returns how many outcomes were applied.
    pub fn wait_remote(&mut self, timeout: Duration) -> usize {
        match self.outcome_rx.recv_timeout(timeout) {
            Ok(outcome) => {
                self.apply_outcome(outcome);
                1 + self.poll_remote()
            }
            Err(_) => 0,
        }
    }

    fn apply_outcome(&mut self, outcome: FetchOutcome) {
        match outcome.result {
            Ok(response) if is_success(response.status) => {
                // Remote content is untrusted by default.
                if !self.disable_remote_sanitization() {
                    self.set_sanitize(true);
                }
                self.set_markdown(Some(response.body));
                self.listeners.emit(events::LOAD_END);
                self.listeners.emit(events::LOAD_END_COMPAT);
            }
            Ok(response) => {
                self.handle_load_error(&FetchError::Status {
                    status: response.status,
                    url: outcome.url,
                });
            }
            Err(error) => self.handle_load_error(&error),
        }
    }

    fn handle_load_error(&mut self, error: &FetchError) {
        tracing::warn!(error = %error, "remote markdown load failed");
        if self.listeners.dispatch_load_error(error) == LoadErrorDisposition::Suppress {
            return;
        }
        self.set_markdown(Some(LOAD_FAILURE_TEXT.to_owned()));
    }

    // --- rendering ----------------------------------------------------------

    /// Run the render pipeline against the current configuration.
    ///
    /// Called automatically on every accepted property write; callable any
    /// number of times. Detached surfaces no-op, empty markdown clears the
    /// output without firing events.
    pub fn render_markdown(&mut self) {
        if !self.attached {
            return;
        }
        let Some(output) = self.output.clone() else {
            return;
        };
        let Some(markdown) = self.markdown.get().clone().filter(|m| !m.is_empty()) else {
            output.set_html(String::new());
            return;
        };

        let options = ConvertOptions {
            breaks: *self.breaks.get(),
            pedantic: *self.pedantic.get(),
            smartypants: *self.smartypants.get(),
        };
        let mut renderer = Renderer::new();
        if let Some(hook) = self.renderer_hook.as_mut() {
            hook(&mut renderer);
        }
        let listeners = &mut self.listeners;
        let mut highlight =
            |code: &str, lang: Option<&str>| listeners.dispatch_highlight(code, lang);
        let mut html = convert(&markdown, options, &mut renderer, Some(&mut highlight));

        if *self.sanitize.get() {
            html = match self.sanitizer_hook.as_mut() {
                Some(hook) => hook(&html),
                None => sanitize::clean_html(&html),
            };
        }

        output.set_html(html);
        self.listeners.emit(events::RENDER_COMPLETE);
        self.listeners.emit(events::RENDER_COMPLETE_COMPAT);
    }
}

impl Default for MarkdownSurface {
    fn default() -> Self {
        Self::new()
    }
}
