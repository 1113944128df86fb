//! Small text utilities.

/// Remove the common leading indentation from every line.
///
/// Tabs are normalized to two spaces first. The common width is the minimum
/// leading-whitespace length across non-blank lines; blank lines do not
/// count toward it but still have up to that many characters removed. Empty
/// input is returned unchanged.
#[must_use]
pub fn unindent(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let normalized = text.replace('\t', "  ");
    let lines: Vec<&str> = normalized.split('\n').collect();

    let indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|line| line.chars().skip(indent).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}
