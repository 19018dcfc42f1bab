use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Supported file extensions for directory discovery.
const SUPPORTED_EXTENSIONS: &[&str] = &["md", "txt"];

/// Expand import arguments into a flat list of files.
///
/// Files are kept as given, whatever their extension. Directories are
/// walked recursively for `.md` and `.txt` files, skipping hidden
/// entries; each directory's files come out sorted by path.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(discover_files(input)?);
        } else if input.exists() {
            files.push(input.clone());
        } else {
            return Err(Error::NotFound {
                kind: "path",
                name: input.display().to_string(),
            });
        }
    }
    Ok(files)
}

/// Recursively walk a directory and discover eligible document files.
pub fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut results = Vec::new();
    walk_dir(root, &mut results)?;
    results.sort();
    Ok(results)
}

fn walk_dir(current: &Path, results: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(current)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }

        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            walk_dir(&path, results)?;
        } else if path.is_file() && is_supported(&path) {
            // Covers regular files and symlinks to files; symlinked
            // directories are not followed.
            results.push(path);
        }
    }
    Ok(())
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext))
}

/// Display name for an imported file: its file name.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
