//! Re-render a local markdown file whenever it changes.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use mdsurface_core::{MarkdownSurface, OutputNode};
use notify::{RecursiveMode, Watcher};

use crate::error::CliError;
use crate::output::Output;

/// How long to wait for an editor's burst of events to settle.
const SETTLE: Duration = Duration::from_millis(100);

/// Create a watch error from a notify error.
fn watch_error(e: &notify::Error) -> CliError {
    CliError::Watch(e.to_string())
}

/// Watch `path` and push its content through `surface` on every change.
///
/// Blocks until the process is interrupted.
pub(crate) fn watch_and_render(
    path: &Path,
    surface: &mut MarkdownSurface,
    node: &OutputNode,
    out: Option<&Path>,
    ui: &Output,
) -> Result<(), CliError> {
    let (tx, rx) = mpsc::channel();

    let mut watcher = notify::recommended_watcher(
        move |res: Result<notify::Event, notify::Error>| {
            if let Ok(event) = res
                && matches!(
                    event.kind,
                    notify::EventKind::Create(_) | notify::EventKind::Modify(_)
                )
            {
                let _ = tx.send(());
            }
        },
    )
    .map_err(|e| watch_error(&e))?;

    watcher
        .watch(path, RecursiveMode::NonRecursive)
        .map_err(|e| watch_error(&e))?;

    ui.info(&format!("Watching {} (Ctrl-C to stop)", path.display()));

    while rx.recv().is_ok() {
        // Editors save in bursts; let the burst finish and coalesce it.
        std::thread::sleep(SETTLE);
        while rx.try_recv().is_ok() {}
        rerender_from_file(path, surface, node, out, ui)?;
    }

    Ok(())
}

/// Re-read `path` and render it. Read failures are reported and skipped, so
/// a mid-save read never kills the watch loop.
fn rerender_from_file(
    path: &Path,
    surface: &mut MarkdownSurface,
    node: &OutputNode,
    out: Option<&Path>,
    ui: &Output,
) -> Result<(), CliError> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            surface.set_markdown(Some(text));
            crate::write_rendered(out, &node.html())?;
            ui.success(&format!("Re-rendered {}", path.display()));
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to re-read watched file");
            ui.warning(&format!("Failed reading {}: {e}", path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use mdsurface_core::SurfaceHost;
    use pretty_assertions::assert_eq;

    use super::*;

    fn connected() -> (MarkdownSurface, OutputNode) {
        let node = OutputNode::new();
        let mut surface = MarkdownSurface::new();
        surface.connect(&SurfaceHost {
            children: Vec::new(),
            output_slot: Some(node.clone()),
        });
        (surface, node)
    }

    #[test]
    fn test_rerender_picks_up_file_content() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("doc.md");
        let rendered = dir.path().join("out.html");
        std::fs::write(&source, "# First").unwrap();

        let (mut surface, node) = connected();
        rerender_from_file(&source, &mut surface, &node, Some(&rendered), &Output::new()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&rendered).unwrap(),
            r#"<h1 id="first">First</h1>"#
        );

        std::fs::write(&source, "# Second").unwrap();
        rerender_from_file(&source, &mut surface, &node, Some(&rendered), &Output::new()).unwrap();
        assert_eq!(
            std::fs::read_to_string(&rendered).unwrap(),
            r#"<h1 id="second">Second</h1>"#
        );
    }

    #[test]
    fn test_rerender_survives_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let gone = dir.path().join("gone.md");

        let (mut surface, node) = connected();
        surface.set_markdown(Some("# Kept".to_owned()));
        rerender_from_file(&gone, &mut surface, &node, None, &Output::new()).unwrap();
        assert_eq!(node.html(), r#"<h1 id="kept">Kept</h1>"#);
    }
}
