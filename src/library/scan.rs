use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::config::LibrarySettings;

/// Lowercase extensions without the leading dot; blank entries are dropped.
pub fn normalize_extensions(extensions: &[String]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

pub(super) fn is_audio_file(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            extensions.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|s| s.to_str())
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn scan_dir(dir: &Path, settings: &LibrarySettings, extensions: &[String]) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);

    // Non-recursive = only the root directory.
    if !settings.recursive {
        walker = walker.max_depth(1);
    }

    let mut found: Vec<PathBuf> = walker
        .into_iter()
        .filter_entry(|e| settings.include_hidden || e.depth() == 0 || !is_hidden(e.path()))
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                warn!("skipping unreadable entry under {}: {e}", dir.display());
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| is_audio_file(p, extensions))
        .collect();

    found.sort_by_key(|p| p.to_string_lossy().to_lowercase());
    found
}

/// Expand command-line arguments into an initial selection.
///
/// Files are taken as given (like picker results, they are not validated);
/// directories contribute the audio files found beneath them. `extensions`
/// must already be normalized (see [`normalize_extensions`]).
pub fn collect_paths(
    args: &[PathBuf],
    settings: &LibrarySettings,
    extensions: &[String],
) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    for arg in args {
        if arg.is_dir() {
            let found = scan_dir(arg, settings, extensions);
            debug!("found {} audio files under {}", found.len(), arg.display());
            paths.extend(found);
        } else {
            paths.push(arg.clone());
        }
    }

    paths
}
