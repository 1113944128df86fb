//! Default HTML sanitization.

use ammonia::Builder;

/// Signature of a caller-installed sanitizer hook.
///
/// Receives the converted HTML; its return value is written to the output
/// node verbatim. Callers handing untrusted input to a custom hook own the
/// responsibility of actually cleaning it.
pub type SanitizeFn = Box<dyn FnMut(&str) -> String>;

/// Sanitize HTML with the default policy.
///
/// Scripts, event-handler attributes and other active content are removed.
/// `id` and `class` survive so heading anchors and code-block language
/// markers keep working. The cleaned document is coerced to text.
#[must_use]
pub fn clean_html(html: &str) -> String {
    Builder::default()
        .add_generic_attributes(&["id", "class"])
        .clean(html)
        .to_string()
}
