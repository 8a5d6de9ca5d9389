use std::path::PathBuf;

use log::info;

use crate::app::App;
use crate::audio::PlaybackElement;
use crate::config;
use crate::library::collect_paths;
use crate::picker::PickerOptions;

/// Seed the playlist from command-line paths, as if they had been picked.
///
/// Directories are expanded to the audio files below them; plain files are
/// taken as given.
pub fn apply_initial_selection<E: PlaybackElement>(
    app: &mut App<E>,
    args: &[PathBuf],
    settings: &config::Settings,
) {
    if args.is_empty() {
        return;
    }

    let extensions = PickerOptions::from(&settings.picker).extensions;
    let paths = collect_paths(args, &settings.library, &extensions);
    info!(
        "initial selection: {} files from {} arguments",
        paths.len(),
        args.len()
    );
    app.add_tracks(paths);
}
