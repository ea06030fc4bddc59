use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;

/// Expand command-line inputs into the source files to process.
///
/// Files named explicitly are taken as given, whatever their extension;
/// directories are walked recursively for files with a configured source
/// extension. The result is sorted with duplicates removed.
pub fn discover(inputs: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    let mut found = BTreeSet::new();
    for input in inputs {
        if !input.is_dir() {
            found.insert(normalize_path(input));
            continue;
        }
        for entry in WalkDir::new(input)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| return !e.file_type().is_dir() && config.is_source(e.path()))
        {
            found.insert(normalize_path(entry.path()));
        }
    }
    return found.into_iter().collect();
}

/// Collapse `.` and `..` components in a path without touching the filesystem.
/// Preserves leading `..` when there is nothing left to pop.
fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                let can_pop = matches!(components.last(), Some(c) if !matches!(c, Component::ParentDir));
                if can_pop {
                    components.pop();
                } else {
                    components.push(component);
                }
            },
            other => components.push(other),
        }
    }
    return components.iter().collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_directories_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("lib");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("main.cpp"), "").unwrap();
        std::fs::write(nested.join("util.h"), "").unwrap();
        std::fs::write(nested.join("notes.txt"), "").unwrap();

        let found = discover(&[dir.path().to_path_buf()], &Config::default());
        let names: Vec<_> = found.iter().filter_map(|p| return p.file_name()?.to_str()).collect();
        assert_eq!(names, ["util.h", "main.cpp"]);
    }

    #[test]
    fn explicit_files_are_kept_and_deduplicated() {
        let inputs = [PathBuf::from("./a.txt"), PathBuf::from("a.txt"), PathBuf::from("src/../b.c")];
        let found = discover(&inputs, &Config::default());
        assert_eq!(found, [PathBuf::from("a.txt"), PathBuf::from("b.c")]);
    }

    #[test]
    fn normalize_keeps_leading_parent() {
        assert_eq!(normalize_path(Path::new("../x/./y/../z.h")), PathBuf::from("../x/z.h"));
    }
}
