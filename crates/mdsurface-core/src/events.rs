//! Event names and listener registries.

use std::collections::HashMap;

use crate::fetch::FetchError;

/// Fired after HTML is written to the output node.
pub const RENDER_COMPLETE: &str = "render-complete";
/// Collapsed spelling meant to replace [`RENDER_COMPLETE`] eventually; both
/// fire on every completed render.
pub const RENDER_COMPLETE_COMPAT: &str = "rendercomplete";
/// Fired after remote markdown loaded successfully.
pub const LOAD_END: &str = "load-end";
/// Collapsed spelling meant to replace [`LOAD_END`] eventually; both fire on
/// every successful load.
pub const LOAD_END_COMPAT: &str = "loadend";

/// Mutable payload handed to highlight listeners.
///
/// Listeners replace `code` with highlighted markup in place; a listener
/// that blanks it falls back to the original code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HighlightRequest {
    /// Code block content.
    pub code: String,
    /// Fence language, empty when the block declared none.
    pub lang: String,
}

/// What a load-error listener wants done about the failure.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadErrorDisposition {
    /// Substitute the failure message for the current content.
    #[default]
    Proceed,
    /// Leave current content untouched.
    Suppress,
}

type NotifyFn = Box<dyn FnMut()>;
type HighlightListener = Box<dyn FnMut(&mut HighlightRequest)>;
type LoadErrorListener = Box<dyn FnMut(&FetchError) -> LoadErrorDisposition>;

/// Listener registries for one surface.
#[derive(Default)]
pub(crate) struct Listeners {
    named: HashMap<String, Vec<NotifyFn>>,
    highlight: Vec<HighlightListener>,
    load_error: Vec<LoadErrorListener>,
}

impl Listeners {
    pub(crate) fn on(&mut self, event: &str, listener: NotifyFn) {
        self.named.entry(event.to_owned()).or_default().push(listener);
    }

    pub(crate) fn emit(&mut self, event: &str) {
        if let Some(listeners) = self.named.get_mut(event) {
            for listener in listeners {
                listener();
            }
        }
    }

    pub(crate) fn on_highlight(&mut self, listener: HighlightListener) {
        self.highlight.push(listener);
    }

    /// Run highlight listeners over `{code, lang}` and return the resulting
    /// code. The original code wins when no listener is installed or a
    /// listener blanked the payload.
    pub(crate) fn dispatch_highlight(&mut self, code: &str, lang: Option<&str>) -> String {
        if self.highlight.is_empty() {
            return code.to_owned();
        }
        let mut request = HighlightRequest {
            code: code.to_owned(),
            lang: lang.unwrap_or_default().to_owned(),
        };
        for listener in &mut self.highlight {
            listener(&mut request);
        }
        if request.code.is_empty() {
            code.to_owned()
        } else {
            request.code
        }
    }

    pub(crate) fn on_load_error(&mut self, listener: LoadErrorListener) {
        self.load_error.push(listener);
    }

    /// Run load-error listeners. Every listener sees the error; one
    /// `Suppress` is enough to cancel the fallback.
    pub(crate) fn dispatch_load_error(&mut self, error: &FetchError) -> LoadErrorDisposition {
        let mut disposition = LoadErrorDisposition::Proceed;
        for listener in &mut self.load_error {
            if listener(error) == LoadErrorDisposition::Suppress {
                disposition = LoadErrorDisposition::Suppress;
            }
        }
        disposition
    }
}
