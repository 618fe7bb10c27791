use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use notify::RecursiveMode;
use notify_debouncer_mini::{DebounceEventResult, new_debouncer};

/// Debounce window for file-change events. Editors fire bursts of writes;
/// one re-parse per burst is enough.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Watch a single file and invoke `emit` after every debounced change.
///
/// Emits once up front so the caller sees the initial graph immediately.
/// Runs until the watch channel closes.
pub fn watch_file(path: &Path, mut emit: impl FnMut(&Path)) -> Result<()> {
    emit(path);

    let (tx, rx) = std::sync::mpsc::channel::<DebounceEventResult>();
    let mut debouncer = new_debouncer(DEBOUNCE, move |result| {
        let _ = tx.send(result);
    })?;
    debouncer
        .watcher()
        .watch(path, RecursiveMode::NonRecursive)
        .with_context(|| format!("failed to watch {}", path.display()))?;

    while let Ok(result) = rx.recv() {
        match result {
            Ok(events) => {
                if !events.is_empty() {
                    emit(path);
                }
            }
            Err(err) => eprintln!("warning: watch error: {err}"),
        }
    }
    Ok(())
}
