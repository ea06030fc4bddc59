//! File watcher: renders on startup, then re-renders changed sources.

use std::collections::HashSet;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands;
use crate::config::Config;
use crate::error;
use crate::scanner;
use crate::workspace::Workspace;

/// Debounce delay between filesystem events and re-render.
const DEBOUNCE_MS: u64 = 100;

/// Directories to watch: each input directory itself, and the parent of
/// every discovered file.
fn collect_watch_dirs(inputs: &[PathBuf], files: &[PathBuf]) -> HashSet<PathBuf> {
    let mut dirs = HashSet::new();
    for input in inputs.iter().filter(|p| return p.is_dir()) {
        dirs.insert(input.clone());
    }
    for file in files {
        let parent = file.parent().filter(|p| return !p.as_os_str().is_empty());
        dirs.insert(parent.map_or_else(|| return PathBuf::from("."), std::path::Path::to_path_buf));
    }
    return dirs;
}

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns `Error::Watch` if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, error::Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return error::Error::Watch { reason: format!("watcher setup failed: {e}") };
    });
}

/// Entry point for the watch command.
///
/// Renders every input once, then watches their directories and re-renders
/// the files whose content changed. New files in watched input directories
/// are picked up on the next change.
///
/// # Errors
///
/// Returns errors from output directory creation or watcher setup.
pub fn run(inputs: &[PathBuf], config: &Config) -> Result<ExitCode, error::Error> {
    commands::prepare_output_dir(config)?;
    let mut workspace = Workspace::new(config.known_macros());

    eprintln!("watch: initial render");
    let files = track(&mut workspace, inputs, config);
    let changed = workspace.refresh();
    commands::render_files(&workspace, &changed, config);

    let watch_dirs = collect_watch_dirs(inputs, &files);
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    for dir in &watch_dirs {
        if let Err(e) = watcher.watch(dir, RecursiveMode::Recursive) {
            tracing::warn!("cannot watch {}: {e}", dir.display());
        }
    }

    let dir_count = watch_dirs.len();
    eprintln!("watch: monitoring {dir_count} directories, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}

        track(&mut workspace, inputs, config);
        let changed = workspace.refresh();
        if changed.is_empty() {
            continue;
        }
        eprintln!("watch: {} changed, re-rendering...", changed.len());
        commands::render_files(&workspace, &changed, config);
    }

    return Ok(ExitCode::SUCCESS);
}

/// Add every currently discovered input to the workspace and return them.
fn track(workspace: &mut Workspace, inputs: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    let files = scanner::discover(inputs, config);
    for file in &files {
        workspace.add_file(file);
    }
    return files;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watches_parents_of_files() {
        let files = [PathBuf::from("src/a.cpp"), PathBuf::from("src/b.h"), PathBuf::from("top.c")];
        let dirs = collect_watch_dirs(&[], &files);
        assert_eq!(dirs, HashSet::from([PathBuf::from("src"), PathBuf::from(".")]));
    }
}
