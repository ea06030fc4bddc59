//! Core CLI commands for ccmark: html, index.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::buffer::SourceBuffer;
use crate::config::Config;
use crate::error;
use crate::index::SymbolIndex;
use crate::render;
use crate::scanner;
use crate::workspace::Workspace;

/// Render every discovered input to HTML.
///
/// Files that cannot be read or written are reported and skipped; the rest
/// are still rendered. Exits with failure if any file was skipped.
///
/// # Errors
///
/// Returns `Error::FileWrite` if the output directory cannot be created.
pub fn html(inputs: &[PathBuf], config: &Config) -> Result<ExitCode, error::Error> {
    let files = scanner::discover(inputs, config);
    if files.is_empty() {
        eprintln!("no file to process");
        return Ok(ExitCode::SUCCESS);
    }
    prepare_output_dir(config)?;

    let mut workspace = Workspace::new(config.known_macros());
    for file in &files {
        workspace.add_file(file);
    }

    let mut failed = 0_usize;
    for file in &files {
        if let Err(e) = workspace.reparse_file(file) {
            eprintln!("error: {e}");
            failed = failed.saturating_add(1);
        }
    }
    failed = failed.saturating_add(render_files(&workspace, &files, config));

    let written = files.len().saturating_sub(failed);
    println!("Rendered {written} of {} files", files.len());
    if failed > 0 {
        return Ok(ExitCode::FAILURE);
    }
    return Ok(ExitCode::SUCCESS);
}

/// Parse one file and print its classification summary, or the whole index
/// as JSON.
///
/// # Errors
///
/// Returns `Error::FileRead` if the file cannot be read, or `Error::Json`
/// if serialisation fails.
pub fn index(path: &Path, json: bool, config: &Config) -> Result<ExitCode, error::Error> {
    let source = SourceBuffer::open(path)?;
    let index = SymbolIndex::build(&source, &config.known_macros());

    if json {
        println!("{}", serde_json::to_string_pretty(&index)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{}", path.display());
    for (category, count) in index.summary() {
        println!("  {category:<16} {count}");
    }
    for class in index.classes() {
        println!("  {:<16} {}", class.key.as_str(), class.entity.qualified_name());
    }
    for def in index.enums() {
        println!("  {:<16} {} ({} values)", "enum", def.entity.qualified_name(), def.values.len());
    }
    return Ok(ExitCode::SUCCESS);
}

/// Create the configured output directory if there is one.
///
/// # Errors
///
/// Returns `Error::FileWrite` if the directory cannot be created.
pub fn prepare_output_dir(config: &Config) -> Result<(), error::Error> {
    let Some(dir) = &config.output_dir else {
        return Ok(());
    };
    return std::fs::create_dir_all(dir).map_err(|source| {
        return error::Error::FileWrite { path: dir.clone(), source };
    });
}

/// Render each parsed file in `files` from the workspace. Files without a
/// parse result were already reported and are skipped silently. Returns the
/// number of files that could not be written.
pub fn render_files(workspace: &Workspace, files: &[PathBuf], config: &Config) -> usize {
    let mut failed = 0_usize;
    for file in files {
        let (Some(source), Some(index)) = (workspace.find_source(file), workspace.find_index(file)) else {
            continue;
        };
        match write_html(file, source, index, config) {
            Ok(out) => tracing::info!("wrote {}", out.display()),
            Err(e) => {
                eprintln!("error: {e}");
                failed = failed.saturating_add(1);
            },
        }
    }
    return failed;
}

/// Render one classified file and write it next to its source or into the
/// output directory.
///
/// # Errors
///
/// Returns `Error::FileWrite` if the output file cannot be written.
fn write_html(
    path: &Path,
    source: &SourceBuffer,
    index: &SymbolIndex,
    config: &Config,
) -> Result<PathBuf, error::Error> {
    let title = path.file_name().map(|n| return n.to_string_lossy().into_owned()).unwrap_or_default();
    let spans = render::style_spans(index);
    let html = render::render_html(source, &spans, &config.render_options(&title));

    let out = config.output_path(path);
    std::fs::write(&out, html).map_err(|source| {
        return error::Error::FileWrite { path: out.clone(), source };
    })?;
    return Ok(out);
}
