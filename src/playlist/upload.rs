use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::config::UploadSettings;

/// Display name for a freshly uploaded file: the file name minus its extension.
pub fn display_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "UNKNOWN".to_string())
}

fn has_listed_extension(path: &Path, settings: &UploadSettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    // An empty list disables the filter.
    if exts.is_empty() {
        return true;
    }

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn expand_dir(dir: &Path, settings: &UploadSettings, out: &mut Vec<PathBuf>) {
    let mut walker = WalkDir::new(dir)
        .follow_links(settings.follow_links)
        .sort_by_file_name();

    // Non-recursive = only the directory itself.
    let depth_cap = if settings.recursive {
        settings.max_depth
    } else {
        Some(1)
    };
    if let Some(d) = depth_cap {
        walker = walker.max_depth(d);
    }

    for entry in walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        if path.is_file() && has_listed_extension(path, settings) {
            out.push(path.to_path_buf());
        }
    }
}

/// Turn the user's selection into the list of files to add, in order.
///
/// Paths naming a file (or nothing at all) are passed through untouched: the
/// extension list is advisory and only narrows what a directory expands to.
pub fn collect_upload(paths: &[PathBuf], settings: &UploadSettings) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            expand_dir(path, settings, &mut files);
        } else {
            files.push(path.clone());
        }
    }
    files
}
